//! Modular decomposition of simple undirected graphs.
//!
//! A module of a graph G is a vertex set M such that every vertex outside M is
//! adjacent either to all of M or to none of it. This crate computes the
//! modular decomposition tree: the rooted tree whose leaves are the vertices
//! of G and whose internal nodes are the strong modules of G, each labeled
//! series, parallel or prime.
//!
//! The algorithm is the divide-and-conquer scheme of Tedder, Corneil, Habib
//! and Paul, implemented after its presentation in Marc Tedder's thesis
//! "Applications of Lexicographic Breadth-First Search to Modular
//! Decomposition, Split Decomposition, and Circle Graphs" (2011, pp. 33-62):
//! an ordered maximal-slice partition is produced by LexBFS-style refinement
//! from a pivot, the slice trees are refined and factorized against the
//! crossing "alpha" edges, and the chain of strong modules containing the
//! pivot is recovered from the resulting factorizing permutation.
//!
//! The decomposition is deterministic: the pivot is always the lowest vertex
//! id in a slice and every iteration order is fixed.
//!
//! ```
//! use md_core::{md_tree, Graph, ModuleKind};
//!
//! // A triangle plus an isolated vertex.
//! let mut graph = Graph::new();
//! graph.add_edge(1u32, 2)?;
//! graph.add_edge(2, 3)?;
//! graph.add_edge(1, 3)?;
//! graph.add_vertex(4);
//!
//! let tree = md_tree(&graph)?;
//! assert_eq!(tree.module_kind(tree.root()), Some(ModuleKind::Parallel));
//! # Ok::<(), md_core::Error>(())
//! ```

mod decompose;
mod graph;
mod partition;
mod tree;

pub mod dot;
pub mod gen;

pub use graph::{Graph, VertexId};
pub use tree::{MdTree, ModuleKind, NodeId};

use std::fmt;
use std::hash::Hash;
use std::time::Instant;

use log::debug;

/// Failures reported for invalid input graphs.
///
/// Internal invariant violations are not recoverable errors; they indicate a
/// bug and abort with context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The graph has no vertices.
    #[error("the graph has no vertices")]
    EmptyGraph,
    /// A self-loop, parallel edge or otherwise malformed description.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
    /// The adjacency relation is not symmetric.
    #[error("adjacency invariant violated: {0}")]
    InvariantViolation(String),
}

/// Computes the modular decomposition tree of `graph`.
///
/// The graph must have at least one vertex. The graph itself is never
/// mutated; all algorithm state is allocated per run.
pub fn md_tree<V>(graph: &Graph<V>) -> Result<MdTree, Error>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    if graph.vertex_count() == 0 {
        return Err(Error::EmptyGraph);
    }
    let begin = Instant::now();
    let tree = decompose::Decomposer::new(graph).run();
    debug!(
        "decomposed {} vertices / {} edges in {:?}",
        graph.vertex_count(),
        graph.edge_count(),
        begin.elapsed()
    );
    Ok(tree)
}
