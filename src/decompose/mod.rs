//! The divide-and-conquer decomposition driver.
//!
//! `divide` computes an ordered maximal-slice partition of the current vertex
//! set by lexicographic-BFS-style refinement from a pivot, recursing into each
//! slice; `conquer` then reassembles the slice trees into the decomposition
//! tree of the whole set. The recursion can reach depth proportional to the
//! vertex count, so the driver keeps an explicit frame stack instead of using
//! the call stack; conquer runs when a frame closes.
//!
//! All mutable algorithm state (the tree arena, the per-vertex alpha lists and
//! container links, the slice-membership stamps) lives in the [`Decomposer`]
//! and is allocated per run; the input graph is never touched.

mod conquer;
mod permutation;
mod refine;
mod spine;

use std::fmt;
use std::hash::Hash;

use crate::graph::{Graph, VertexId};
use crate::partition::Partition;
use crate::tree::{Forest, MdTree, NodeId};

/// Membership mask over dense indices with O(1) reset via stamping.
pub(crate) struct IndexMask {
    stamp: Vec<u64>,
    current: u64,
}

impl IndexMask {
    fn new(capacity: usize) -> Self {
        IndexMask {
            stamp: vec![0; capacity],
            current: 1,
        }
    }

    fn clear(&mut self) {
        self.current += 1;
    }

    fn insert(&mut self, index: usize) {
        if index >= self.stamp.len() {
            self.stamp.resize(index + 1, 0);
        }
        self.stamp[index] = self.current;
    }

    fn remove(&mut self, index: usize) {
        if index < self.stamp.len() {
            self.stamp[index] = 0;
        }
    }

    fn contains(&self, index: usize) -> bool {
        self.stamp.get(index).is_some_and(|&s| s == self.current)
    }
}

/// One open slice: the pivot leaf plus the trees of the sub-slices divided off
/// so far.
struct SliceFrame {
    trees: Vec<NodeId>,
}

enum SliceOutcome {
    /// The slice was a single vertex; its leaf is the finished tree.
    Leaf(NodeId),
    /// The slice was split around a pivot and descends into its sub-slices.
    Open(SliceFrame),
}

pub(crate) struct Decomposer<'g, V> {
    graph: &'g Graph<V>,
    forest: Forest,

    // Per-vertex algorithm state.
    alpha: Vec<Vec<VertexId>>,
    active_alpha: Vec<Vec<VertexId>>,
    container: Vec<Option<NodeId>>,
    slice_depth: Vec<u32>,

    // Reusable scratch masks, one over vertices and one over tree nodes.
    vmask: IndexMask,
    nmask: IndexMask,
}

impl<'g, V> Decomposer<'g, V>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    pub(crate) fn new(graph: &'g Graph<V>) -> Self {
        let n = graph.vertex_count();
        Decomposer {
            graph,
            forest: Forest::new(),
            alpha: vec![Vec::new(); n],
            active_alpha: vec![Vec::new(); n],
            container: vec![None; n],
            slice_depth: vec![0; n],
            vmask: IndexMask::new(n),
            nmask: IndexMask::new(n),
        }
    }

    pub(crate) fn run(mut self) -> MdTree {
        let vertices: Vec<VertexId> = self.graph.vertices().collect();
        let root = self.divide(vertices);
        MdTree::new(self.forest, root)
    }

    /// Iterative rendition of the recursive scheme: a frame per open slice,
    /// entering the next sub-slice while the partition head still lies inside
    /// the innermost slice, conquering when it no longer does.
    fn divide(&mut self, all: Vec<VertexId>) -> NodeId {
        let mut partition = Partition::new();
        let mut frames: Vec<SliceFrame> = Vec::new();
        let mut finished = match self.enter_slice(all, &mut partition, 1) {
            SliceOutcome::Leaf(leaf) => Some(leaf),
            SliceOutcome::Open(frame) => {
                frames.push(frame);
                None
            }
        };
        loop {
            if let Some(tree) = finished.take() {
                match frames.last_mut() {
                    Some(frame) => frame.trees.push(tree),
                    None => return tree,
                }
            }
            let depth = frames.len() as u32;
            if self.head_within_slice(&partition, depth) {
                let class = partition
                    .pop_first()
                    .expect("a head class inside the slice was just seen");
                match self.enter_slice(class, &mut partition, depth + 1) {
                    SliceOutcome::Leaf(leaf) => finished = Some(leaf),
                    SliceOutcome::Open(frame) => frames.push(frame),
                }
            } else {
                let frame = frames.pop().expect("an open slice frame remains");
                finished = Some(self.conquer(frame.trees));
            }
        }
    }

    /// Picks a pivot for `slice`, records its alpha edges, refines the outer
    /// partition by its neighborhood and prepends the slice remainder,
    /// neighbors first.
    fn enter_slice(
        &mut self,
        slice: Vec<VertexId>,
        partition: &mut Partition,
        depth: u32,
    ) -> SliceOutcome {
        let graph = self.graph;
        // Fixed pivot policy: the lowest vertex id in the slice.
        let pivot = slice
            .iter()
            .copied()
            .min()
            .expect("slices are never empty");
        for &v in &slice {
            self.slice_depth[v.index()] = depth;
        }

        // Log the pivot into alpha(y) for every neighbor y that is still
        // unprocessed, i.e. inside the slice or the outer partition.
        self.vmask.clear();
        for &v in &slice {
            self.vmask.insert(v.index());
        }
        for v in partition.flatten() {
            self.vmask.insert(v.index());
        }
        for y in graph.neighbors(pivot) {
            if self.vmask.contains(y.index()) {
                self.alpha[y.index()].push(pivot);
            }
        }

        // Refine every class by the pivot's neighborhood: a class meeting both
        // N(x) and its complement is replaced by the two sides, N(x) first.
        self.vmask.clear();
        for y in graph.neighbors(pivot) {
            self.vmask.insert(y.index());
        }
        for class_id in partition.class_ids() {
            let (hits, misses): (Vec<VertexId>, Vec<VertexId>) = partition
                .class(class_id)
                .iter()
                .copied()
                .partition(|v| self.vmask.contains(v.index()));
            if !hits.is_empty() && !misses.is_empty() {
                partition.replace(class_id, hits, misses);
            }
        }

        if slice.len() == 1 {
            let leaf = self.forest.new_leaf(pivot);
            self.container[pivot.index()] = Some(leaf);
            return SliceOutcome::Leaf(leaf);
        }

        // The vmask still holds N(x) here.
        let mut neighbors = Vec::new();
        let mut strangers = Vec::new();
        for &v in &slice {
            if v == pivot {
                continue;
            }
            if self.vmask.contains(v.index()) {
                neighbors.push(v);
            } else {
                strangers.push(v);
            }
        }
        if !strangers.is_empty() {
            partition.prepend(strangers);
        }
        if !neighbors.is_empty() {
            partition.prepend(neighbors);
        }

        let leaf = self.forest.new_leaf(pivot);
        self.container[pivot.index()] = Some(leaf);
        SliceOutcome::Open(SliceFrame { trees: vec![leaf] })
    }

    /// Whether the partition head lies inside the slice at `depth`. Classes
    /// never straddle a slice boundary, so probing one member suffices.
    fn head_within_slice(&self, partition: &Partition, depth: u32) -> bool {
        if partition.is_empty() {
            return false;
        }
        let head = partition.head().expect("a nonempty partition has a head");
        let class = partition.class(head);
        let inside = self.slice_depth[class[0].index()] == depth;
        debug_assert!(
            class
                .iter()
                .all(|v| (self.slice_depth[v.index()] == depth) == inside),
            "partition class straddles a slice boundary"
        );
        inside
    }
}
