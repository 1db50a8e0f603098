//! Undirected simple graph model.
//!
//! Vertices carry an arbitrary caller-chosen label and are addressed internally
//! through dense [`VertexId`] indices. Adjacency is kept per vertex as an ordered
//! set, so neighbor iteration is deterministic across runs. The decomposition
//! never mutates a graph; all algorithm state lives in per-run side tables.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;

use crate::Error;

/// Dense index of a vertex inside a [`Graph`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct VertexId(pub(crate) u32);

impl VertexId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// An undirected graph without self-loops or parallel edges.
#[derive(Clone, Debug, Default)]
pub struct Graph<V> {
    labels: Vec<V>,
    ids: HashMap<V, VertexId>,
    adjacent: Vec<BTreeSet<VertexId>>,
    edge_count: usize,
}

impl<V> Graph<V>
where
    V: Eq + Hash + Clone + fmt::Debug,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Graph {
            labels: Vec::new(),
            ids: HashMap::new(),
            adjacent: Vec::new(),
            edge_count: 0,
        }
    }

    /// Adds a vertex and returns its id. Adding an existing label returns the
    /// id it already has.
    pub fn add_vertex(&mut self, label: V) -> VertexId {
        if let Some(&id) = self.ids.get(&label) {
            return id;
        }
        let id = VertexId(self.labels.len() as u32);
        self.ids.insert(label.clone(), id);
        self.labels.push(label);
        self.adjacent.push(BTreeSet::new());
        id
    }

    /// Adds an undirected edge, creating endpoints that are not yet present.
    ///
    /// Self-loops and repeated edges are rejected with [`Error::InvalidGraph`].
    pub fn add_edge(&mut self, u: V, v: V) -> Result<(), Error> {
        if u == v {
            return Err(Error::InvalidGraph(format!("self-loop at {u:?}")));
        }
        let u = self.add_vertex(u);
        let v = self.add_vertex(v);
        if self.adjacent[u.index()].contains(&v) {
            return Err(Error::InvalidGraph(format!(
                "parallel edge {:?} -- {:?}",
                self.labels[u.index()],
                self.labels[v.index()]
            )));
        }
        self.adjacent[u.index()].insert(v);
        self.adjacent[v.index()].insert(u);
        self.edge_count += 1;
        Ok(())
    }

    /// Builds a graph from an edge list.
    pub fn from_edges(edges: impl IntoIterator<Item = (V, V)>) -> Result<Self, Error> {
        let mut graph = Graph::new();
        for (u, v) in edges {
            graph.add_edge(u, v)?;
        }
        Ok(graph)
    }

    /// Builds a graph from explicit adjacency lists.
    ///
    /// Every listed neighbor must list the owning vertex back; an asymmetric
    /// pair is reported as [`Error::InvariantViolation`].
    pub fn from_adjacency(entries: impl IntoIterator<Item = (V, Vec<V>)>) -> Result<Self, Error> {
        let mut graph = Graph::new();
        let mut lists: Vec<(VertexId, Vec<VertexId>)> = Vec::new();
        for (label, neighbors) in entries {
            let u = graph.add_vertex(label);
            let ids = neighbors
                .into_iter()
                .map(|n| graph.add_vertex(n))
                .collect::<Vec<_>>();
            lists.push((u, ids));
        }
        for (u, neighbors) in lists {
            for v in neighbors {
                if u == v {
                    return Err(Error::InvalidGraph(format!(
                        "self-loop at {:?}",
                        graph.labels[u.index()]
                    )));
                }
                if !graph.adjacent[u.index()].insert(v) {
                    return Err(Error::InvalidGraph(format!(
                        "parallel edge {:?} -- {:?}",
                        graph.labels[u.index()],
                        graph.labels[v.index()]
                    )));
                }
            }
        }
        for u in 0..graph.labels.len() {
            for &v in &graph.adjacent[u] {
                if !graph.adjacent[v.index()].contains(&VertexId(u as u32)) {
                    return Err(Error::InvariantViolation(format!(
                        "{:?} lists {:?} as a neighbor but not vice versa",
                        graph.labels[u], graph.labels[v.index()]
                    )));
                }
            }
        }
        graph.edge_count = graph.adjacent.iter().map(BTreeSet::len).sum::<usize>() / 2;
        Ok(graph)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Iterates over all vertex ids in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.labels.len() as u32).map(VertexId)
    }

    /// Iterates over the neighbors of `v` in ascending id order.
    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.adjacent[v.index()].iter().copied()
    }

    /// Degree of `v`.
    pub fn degree(&self, v: VertexId) -> usize {
        self.adjacent[v.index()].len()
    }

    /// Whether `u` and `v` are adjacent.
    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        self.adjacent[u.index()].contains(&v)
    }

    /// The label of `v`.
    pub fn label(&self, v: VertexId) -> &V {
        &self.labels[v.index()]
    }

    /// Looks a vertex up by its label.
    pub fn vertex_id(&self, label: &V) -> Option<VertexId> {
        self.ids.get(label).copied()
    }
}
