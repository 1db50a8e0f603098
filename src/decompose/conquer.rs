//! Conquer: reassembling slice trees into one decomposition tree.
//!
//! Decides whether the current vertex set is connected, labels the slice
//! leaves by their (co-)components, runs refinement, factorization, the pivot
//! permutation and the spine, splices the surviving subtrees into the spine
//! modules, glues a disconnected remainder back on under a parallel root, and
//! collapses same-kind degenerate chains.

use std::fmt;
use std::hash::Hash;

use super::Decomposer;
use crate::tree::{Connectivity, ModuleKind, NodeId};

impl<V> Decomposer<'_, V>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    pub(super) fn conquer(&mut self, trees: Vec<NodeId>) -> NodeId {
        debug_assert!(trees.len() >= 2, "conquer needs the pivot and one slice");
        let k = trees.len() - 1;

        // The last slice has no alpha edge into the earlier ones exactly when
        // the current vertex set is disconnected; all its leaves agree, so
        // probing one is enough.
        self.vmask.clear();
        for &tree in &trees[..k] {
            for leaf in self.forest.leaves(tree) {
                let v = self.leaf_vertex(leaf);
                self.vmask.insert(v.index());
            }
        }
        let probe = self.forest.leaves(trees[k])[0];
        let probe_vertex = self.leaf_vertex(probe);
        let connected = self.alpha[probe_vertex.index()]
            .iter()
            .any(|v| self.vmask.contains(v.index()));
        let last = if connected { k } else { k - 1 };
        let slices = &trees[..=last];

        // Label the leaves of each slice by their (co-)component within it:
        // co-components for the neighbor slice, components for the rest,
        // numbered consecutively across slices.
        let mut found = 0;
        for (index, &tree) in slices.iter().enumerate().skip(1) {
            if index == 1 {
                self.label_by_component(tree, Connectivity::CoComponent, 0);
            } else {
                found = self.label_by_component(tree, Connectivity::Component, found);
            }
        }

        self.refine_trees(slices);
        self.factorize_trees(slices);
        let sigma = self.pivot_permutation(slices);
        let (mut root, spine) = self.build_spine(&sigma);

        // Replace each (co-)component by the roots of the refactored subtrees
        // covering its leaves. A subtree may cover several groups; the
        // replaced mask keeps it from being inserted twice.
        self.vmask.clear();
        for module in spine.iter().rev() {
            for group in &module.components {
                for &member in group {
                    let vertex = self.leaf_vertex(member);
                    if self.vmask.contains(vertex.index()) {
                        continue;
                    }
                    let subtree = self.forest.get_root(member);
                    self.forest.insert(module.node, subtree);
                    for leaf in self.forest.leaves(subtree) {
                        let covered = self.leaf_vertex(leaf);
                        self.vmask.insert(covered.index());
                    }
                }
            }
        }

        // A disconnected remainder goes under a parallel root.
        if last == k - 1 {
            let rest = trees[k];
            if self.forest[rest].kind() == Some(ModuleKind::Parallel) {
                self.forest.insert(rest, root);
                root = rest;
            } else {
                let fresh = self.forest.new_module(ModuleKind::Parallel);
                self.forest.insert(fresh, root);
                self.forest.insert(fresh, rest);
                root = fresh;
            }
        }

        self.normalize(root);
        root
    }

    /// Labels every leaf under `root` with its (co-)component index. The
    /// components are read off the tree: a parallel root contributes one
    /// component per child (dually, a series root one co-component per
    /// child); any other root is a single (co-)component.
    fn label_by_component(
        &mut self,
        root: NodeId,
        connectivity: Connectivity,
        start: usize,
    ) -> usize {
        let split = matches!(
            (self.forest[root].kind(), connectivity),
            (Some(ModuleKind::Parallel), Connectivity::Component)
                | (Some(ModuleKind::Series), Connectivity::CoComponent)
        );
        let mut next = start;
        if split {
            let children = self.forest[root].children.clone();
            for child in children {
                for leaf in self.forest.leaves(child) {
                    self.forest[leaf].connectivity = Some((next, connectivity));
                }
                next += 1;
            }
        } else {
            for leaf in self.forest.leaves(root) {
                self.forest[leaf].connectivity = Some((next, connectivity));
            }
            next += 1;
        }
        next
    }

    /// Merges every degenerate node into a same-kind parent. Splitting can
    /// leave such chains behind when a (co-)component fragment keeps the kind
    /// of the spine module it lands in.
    fn normalize(&mut self, root: NodeId) {
        for u in self.forest.preorder(root) {
            let Some(parent) = self.forest[u].parent else {
                continue;
            };
            if !self.forest[u].is_degenerate() || self.forest[u].kind() != self.forest[parent].kind()
            {
                continue;
            }
            let children = std::mem::take(&mut self.forest[u].children);
            for &child in &children {
                self.forest[child].parent = Some(parent);
            }
            let position = self.forest[parent]
                .children
                .iter()
                .position(|&c| c == u)
                .expect("a non-root node is listed by its parent");
            self.forest[parent].children.splice(position..=position, children);
            self.forest[u].parent = None;
        }
    }
}
