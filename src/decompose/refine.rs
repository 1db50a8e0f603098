//! Tree refinement and factorization over a maximal-slice tree partition.
//!
//! Refinement marks, leaf by leaf, every node that fails the module property
//! against the leaf's active alpha edges, splits degenerate offenders into
//! their marked and unmarked halves and labels them `Dead`. Factorization
//! then pushes `Dead` upward as `Zombie`, regroups and reorders the children
//! of every labeled node so the leaf order becomes a factorizing permutation,
//! and finally cuts the children of all labeled nodes loose. After that,
//! walking up from any leaf ends at the root of a subtree that satisfies the
//! module property.

use std::fmt;
use std::hash::Hash;

use super::Decomposer;
use crate::graph::VertexId;
use crate::tree::{Label, NodeId};

impl<V> Decomposer<'_, V>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    pub(super) fn refine_trees(&mut self, trees: &[NodeId]) {
        // Tag every node with the index of its slice tree; the reorder rules
        // below depend on it.
        for (index, &tree) in trees.iter().enumerate() {
            for node in self.forest.preorder(tree) {
                self.forest[node].tree_index = index;
            }
        }

        // The leaf set of the whole partition; alpha edges into it are the
        // active ones at this level. The mask stays in place for every
        // per-leaf pass below.
        self.vmask.clear();
        for &tree in trees {
            for leaf in self.forest.leaves(tree) {
                let v = self.leaf_vertex(leaf);
                self.vmask.insert(v.index());
            }
        }

        for &tree in trees {
            for leaf in self.forest.leaves(tree) {
                let v = self.leaf_vertex(leaf);
                self.refine_against(v);
            }
        }
    }

    /// One marking/splitting pass driven by the active alpha edges of `y`.
    fn refine_against(&mut self, y: VertexId) {
        // α'(y) = α(y) ∩ L, removed from α(y) and consumed here.
        let alpha = std::mem::take(&mut self.alpha[y.index()]);
        let (active, rest): (Vec<VertexId>, Vec<VertexId>) = alpha
            .into_iter()
            .partition(|v| self.vmask.contains(v.index()));
        self.alpha[y.index()] = rest;
        self.active_alpha[y.index()] = active;

        let mut marked_leaves: Vec<NodeId> = Vec::new();
        let mut marked_nodes: Vec<NodeId> = Vec::new();
        // Unmarked nodes with a marked child, in insertion order; membership
        // lives in the node mask.
        let mut to_refine: Vec<NodeId> = Vec::new();
        self.nmask.clear();

        // Mark the leaf holding each active alpha neighbor and count the mark
        // at its parent. This walk is the only place mark counts grow.
        let active = self.active_alpha[y.index()].clone();
        for v in active {
            let leaf = self.container[v.index()].expect("alpha neighbors sit in leaves");
            self.forest[leaf].marked = true;
            marked_leaves.push(leaf);
            if let Some(parent) = self.forest[leaf].parent {
                self.forest[parent].mark_count += 1;
                self.enqueue_refine(&mut to_refine, parent);
            }
        }

        // Walk upward from every marked leaf, marking each ancestor whose
        // children are all marked and passing one mark on to its parent.
        for index in 0..marked_leaves.len() {
            let mut node = self.forest[marked_leaves[index]].parent;
            while let Some(parent) = node {
                if self.forest[parent].mark_count != self.forest[parent].children.len() {
                    let has_marked_child = self.forest[parent]
                        .children
                        .iter()
                        .any(|&c| self.forest[c].marked);
                    if has_marked_child {
                        self.enqueue_refine(&mut to_refine, parent);
                    }
                    break;
                }
                let was_marked = self.forest[parent].marked;
                if let Some(grandparent) = self.forest[parent].parent {
                    if !was_marked {
                        self.forest[grandparent].mark_count += 1;
                        if !self.forest[grandparent].marked {
                            self.enqueue_refine(&mut to_refine, grandparent);
                        }
                    }
                }
                self.forest[parent].marked = true;
                marked_nodes.push(parent);
                self.nmask.remove(parent.index());
                node = self.forest[parent].parent;
            }
        }

        // Split every node that ended up with both marked and unmarked
        // children: degenerate ones get their halves wrapped, the node dies,
        // and its children are ordered so that the pivot side stays adjacent
        // to the pivot in the eventual leaf order.
        let queue: Vec<NodeId> = to_refine
            .iter()
            .copied()
            .filter(|n| self.nmask.contains(n.index()))
            .collect();
        for &u in &queue {
            let (marked, unmarked) = self.forest.group_children(u, |n| n.marked);
            if marked.len() > 1 && self.forest[u].is_degenerate() {
                let fresh = self.forest.replace_children(u, &marked);
                self.forest[fresh].marked = true;
            }
            if unmarked.len() > 1 && self.forest[u].is_degenerate() {
                let fresh = self.forest.replace_children(u, &unmarked);
                self.forest[fresh].marked = false;
            }
            if self.forest[u].label != Some(Label::Dead) {
                self.forest[u].label = Some(Label::Dead);
                let (mut marked, mut unmarked) = self.forest.group_children(u, |n| n.marked);
                let order = if self.forest[u].tree_index == 1 {
                    marked.append(&mut unmarked);
                    marked
                } else {
                    unmarked.append(&mut marked);
                    unmarked
                };
                self.forest.set_children_order(u, order);
            }
        }

        // Clear the marks of everything this pass touched; labels persist
        // into factorization.
        for node in marked_leaves.iter().chain(&marked_nodes).chain(&queue) {
            self.forest[*node].marked = false;
            self.forest[*node].mark_count = 0;
        }
        self.active_alpha[y.index()].clear();
    }

    fn enqueue_refine(&mut self, queue: &mut Vec<NodeId>, node: NodeId) {
        if !self.nmask.contains(node.index()) {
            self.nmask.insert(node.index());
            queue.push(node);
        }
    }

    pub(super) fn factorize_trees(&mut self, trees: &[NodeId]) {
        for (index, &tree) in trees.iter().enumerate() {
            let order = self.forest.preorder(tree);

            // Every strict ancestor of a dead node cannot be a module either;
            // label it zombie, stopping at the first ancestor already done.
            for &u in &order {
                if self.forest[u].label != Some(Label::Dead) {
                    continue;
                }
                let mut node = self.forest[u].parent;
                while let Some(parent) = node {
                    match self.forest[parent].label {
                        Some(Label::Zombie) => break,
                        Some(Label::Dead) => {}
                        None => self.forest[parent].label = Some(Label::Zombie),
                    }
                    node = self.forest[parent].parent;
                }
            }

            // Regroup each zombie's children: the unlabeled ones stay
            // together (wrapped if a degenerate node has several), and the
            // labeled block goes next to the pivot side.
            let zombies: Vec<NodeId> = order
                .iter()
                .copied()
                .filter(|&u| self.forest[u].label == Some(Label::Zombie))
                .collect();
            for u in zombies {
                let (_, unlabeled) = self.forest.group_children(u, |n| n.label.is_some());
                if unlabeled.len() > 1 && self.forest[u].is_degenerate() {
                    self.forest.replace_children(u, &unlabeled);
                }
                let (mut labeled, mut unlabeled) =
                    self.forest.group_children(u, |n| n.label.is_some());
                let new_order = if index == 1 {
                    labeled.append(&mut unlabeled);
                    labeled
                } else {
                    unlabeled.append(&mut labeled);
                    unlabeled
                };
                self.forest.set_children_order(u, new_order);
            }

            // Cut the children of every labeled node loose. Their subtrees
            // stay reachable through the container links of their leaves, and
            // get_root from any leaf now ends at a valid module root.
            for u in self.forest.preorder(tree) {
                if self.forest[u].label.is_some() {
                    self.forest[u].label = None;
                    let children = self.forest[u].children.clone();
                    for child in children {
                        self.forest[child].parent = None;
                    }
                }
            }
        }
    }

    pub(super) fn leaf_vertex(&self, leaf: NodeId) -> VertexId {
        self.forest[leaf]
            .vertex()
            .expect("slice tree leaves hold vertices")
    }
}
