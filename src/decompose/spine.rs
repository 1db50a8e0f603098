//! Spine construction.
//!
//! Reads the pivot factorizing permutation and its μ/ρ bounds to recover, one
//! per iteration, the chain of strong modules containing the pivot. Each
//! iteration first tries to close a series module over co-components, then a
//! parallel module over components, and finally falls back to a prime module
//! whose bounds are expanded to a fixed point. The (co-)components absorbed
//! into a module are recorded next to the created node; conquer later splices
//! the corresponding subtrees in their place.

use std::fmt;
use std::hash::Hash;

use super::permutation::PivotPermutation;
use super::Decomposer;
use crate::tree::{ModuleKind, NodeId};

/// A spine node together with the leaf groups of the (co-)components that
/// make up its module.
pub(super) struct SpineModule {
    pub(super) node: NodeId,
    pub(super) components: Vec<Vec<NodeId>>,
}

impl<V> Decomposer<'_, V>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    pub(super) fn build_spine(&mut self, sigma: &PivotPermutation) -> (NodeId, Vec<SpineModule>) {
        let mut tree = sigma.pivot;
        let (a, b) = (sigma.co_components.len(), sigma.components.len());
        let (mut l, mut r) = (0usize, 0usize);
        let mut modules: Vec<SpineModule> = Vec::new();

        while l != a || r != b {
            let mut member_groups: Vec<Vec<NodeId>> = Vec::new();
            let mut has_co_component = false;
            let mut has_component = false;

            // Series: take co-components that reach no component beyond r.
            l += 1;
            while l <= a && sigma.co_components[l - 1].mu == r {
                member_groups.push(sigma.co_components[l - 1].leaves.clone());
                has_co_component = true;
                l += 1;
            }
            l -= 1;

            // Parallel: components reaching no co-component beyond l and with
            // no edge to a later component.
            if member_groups.is_empty() {
                r += 1;
                while r <= b
                    && sigma.components[r - 1].mu == l
                    && sigma.components[r - 1].rho == 0
                {
                    member_groups.push(sigma.components[r - 1].leaves.clone());
                    has_component = true;
                    r += 1;
                }
                r -= 1;
            }

            // Prime: grow both sides to the fixed point of the μ/ρ bounds.
            if member_groups.is_empty() {
                l += 1;
                r += 1;
                assert!(
                    l <= a && r <= b,
                    "prime module detection overran the permutation (l={l}, a={a}, r={r}, b={b})"
                );
                let (mut l_, mut r_) = (l, r);
                let mut t = sigma.components[r - 1].mu.max(l);
                let mut m = sigma.co_components[l - 1]
                    .mu
                    .max(sigma.components[r - 1].rho)
                    .max(r);
                loop {
                    let (t_prev, m_prev) = (t, m);
                    t = t.max(
                        (r_..=m)
                            .map(|i| sigma.components[i - 1].mu)
                            .max()
                            .expect("component bound range is nonempty"),
                    );
                    m = m
                        .max(
                            (l_..=t)
                                .map(|i| sigma.co_components[i - 1].mu)
                                .max()
                                .expect("co-component bound range is nonempty"),
                        )
                        .max(
                            (r_..=m)
                                .map(|i| sigma.components[i - 1].rho)
                                .max()
                                .expect("component bound range is nonempty"),
                        );
                    l_ = t_prev;
                    r_ = m_prev;
                    if t == t_prev && m == m_prev {
                        break;
                    }
                }
                for i in l..=t {
                    member_groups.push(sigma.co_components[i - 1].leaves.clone());
                    has_co_component = true;
                }
                for i in r..=m {
                    member_groups.push(sigma.components[i - 1].leaves.clone());
                    has_component = true;
                }
                l = t;
                r = m;
            }

            let kind = if !has_component {
                ModuleKind::Series
            } else if !has_co_component {
                ModuleKind::Parallel
            } else {
                ModuleKind::Prime
            };
            let node = self.forest.new_module(kind);
            self.forest.insert(node, tree);
            modules.push(SpineModule {
                node,
                components: member_groups,
            });
            tree = node;
        }

        (tree, modules)
    }
}
