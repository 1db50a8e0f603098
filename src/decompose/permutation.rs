//! The pivot factorizing permutation.
//!
//! After factorization the slice trees spell out a factorizing permutation
//! around the pivot: σ = C'a, ..., C'1, x, C1, ..., Cb, where the C'i are the
//! co-components of the first slice and the Ci the components of the later
//! ones, each appearing consecutively in leaf order. The spine builder needs
//! the boundary functions μ and ρ on these groups to delimit the strong
//! modules containing the pivot; both are computed here and aggregated per
//! (co-)component.

use std::fmt;
use std::hash::Hash;

use super::Decomposer;
use crate::tree::NodeId;

pub(super) struct CoComponent {
    pub(super) leaves: Vec<NodeId>,
    pub(super) mu: usize,
}

pub(super) struct Component {
    pub(super) leaves: Vec<NodeId>,
    pub(super) mu: usize,
    pub(super) rho: usize,
}

pub(super) struct PivotPermutation {
    pub(super) pivot: NodeId,
    pub(super) co_components: Vec<CoComponent>,
    pub(super) components: Vec<Component>,
}

impl<V> Decomposer<'_, V>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    pub(super) fn pivot_permutation(&mut self, trees: &[NodeId]) -> PivotPermutation {
        // Read the (co-)components off the leaf order: the connectivity labels
        // assigned in conquer group consecutive leaves. Co-components are
        // numbered outward from the pivot but encountered innermost first,
        // hence the reversal.
        let mut co_groups: Vec<Vec<NodeId>> = Vec::new();
        let mut comp_groups: Vec<Vec<NodeId>> = Vec::new();
        for (index, &tree) in trees.iter().enumerate().skip(1) {
            let leaves = self.forest.leaves(tree);
            let target = if index == 1 {
                &mut co_groups
            } else {
                &mut comp_groups
            };
            self.group_runs(leaves, target);
        }
        co_groups.reverse();
        let (a, b) = (co_groups.len(), comp_groups.len());

        // μ(y) for a leaf left of the pivot: the smallest j with no neighbor
        // of y in any component beyond j. Right of the pivot: the smallest j
        // such that y is complete to every co-component beyond j.
        for (index, &tree) in trees.iter().enumerate().skip(1) {
            for y in self.forest.leaves(tree) {
                let mut j = if index == 1 { b } else { a };
                if index == 1 {
                    while j > 0 && !self.any_adjacent(y, &comp_groups[j - 1]) {
                        j -= 1;
                    }
                } else {
                    while j > 0 && self.all_adjacent(y, &co_groups[j - 1]) {
                        j -= 1;
                    }
                }
                self.forest[y].mu = j;
            }
        }

        // ρ(y) for y in component Ci: the largest j > i reached by an edge of
        // y, or 0 when none is.
        for i in 1..=b {
            for index in 0..comp_groups[i - 1].len() {
                let y = comp_groups[i - 1][index];
                self.forest[y].rho = 0;
                for j in (i + 1..=b).rev() {
                    if self.any_adjacent(y, &comp_groups[j - 1]) {
                        self.forest[y].rho = j;
                        break;
                    }
                }
            }
        }

        let co_components = co_groups
            .into_iter()
            .map(|leaves| {
                let mu = leaves
                    .iter()
                    .map(|&y| self.forest[y].mu)
                    .max()
                    .expect("(co-)components are nonempty");
                CoComponent { leaves, mu }
            })
            .collect();
        let components = comp_groups
            .into_iter()
            .map(|leaves| {
                let mu = leaves
                    .iter()
                    .map(|&y| self.forest[y].mu)
                    .max()
                    .expect("(co-)components are nonempty");
                let rho = leaves
                    .iter()
                    .map(|&y| self.forest[y].rho)
                    .max()
                    .expect("(co-)components are nonempty");
                Component { leaves, mu, rho }
            })
            .collect();

        PivotPermutation {
            pivot: trees[0],
            co_components,
            components,
        }
    }

    /// Appends maximal runs of leaves sharing a connectivity label.
    fn group_runs(&self, leaves: Vec<NodeId>, groups: &mut Vec<Vec<NodeId>>) {
        for leaf in leaves {
            let connectivity = self.forest[leaf].connectivity;
            let same_run = groups.last().is_some_and(|group| {
                self.forest[*group.last().expect("groups are nonempty")].connectivity
                    == connectivity
            });
            if same_run {
                groups.last_mut().expect("a run was just seen").push(leaf);
            } else {
                groups.push(vec![leaf]);
            }
        }
    }

    fn any_adjacent(&self, y: NodeId, group: &[NodeId]) -> bool {
        let yv = self.leaf_vertex(y);
        group
            .iter()
            .any(|&m| self.graph.has_edge(yv, self.leaf_vertex(m)))
    }

    fn all_adjacent(&self, y: NodeId, group: &[NodeId]) -> bool {
        let yv = self.leaf_vertex(y);
        group
            .iter()
            .all(|&m| self.graph.has_edge(yv, self.leaf_vertex(m)))
    }
}
