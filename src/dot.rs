//! Minimal DOT import and export.
//!
//! Covers the plain subset of the DOT language the rest of the tooling
//! speaks: undirected graphs, statements terminated by semicolons, edges
//! written as `a -- b` chains, no attributes or subgraphs. Rendering is left
//! to an external `dot` binary.

use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;
use std::hash::Hash;

use crate::{Error, Graph, MdTree};

/// Serializes a graph as DOT text.
pub fn graph_to_dot<V>(graph: &Graph<V>) -> String
where
    V: Eq + Hash + Clone + fmt::Debug + fmt::Display,
{
    let mut out = String::from("graph {\n");
    for v in graph.vertices() {
        let _ = writeln!(out, "  {};", graph.label(v));
        for n in graph.neighbors(v) {
            if n > v {
                let _ = writeln!(out, "  {} -- {};", graph.label(v), graph.label(n));
            }
        }
    }
    out.push('}');
    out
}

/// Serializes a decomposition tree as DOT text, internal nodes labeled by
/// their module kind and leaves by their vertex label.
pub fn tree_to_dot<V>(tree: &MdTree, graph: &Graph<V>) -> String
where
    V: Eq + Hash + Clone + fmt::Debug + fmt::Display,
{
    let nodes = tree.nodes();
    let index: HashMap<_, _> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let mut out = String::from("graph {\n");
    for &node in &nodes {
        let text = match tree.module_kind(node) {
            Some(kind) => kind.to_string(),
            None => graph
                .label(tree.vertex(node).expect("tree leaves hold vertices"))
                .to_string(),
        };
        let _ = writeln!(out, "  n{} [label=\"{}\"];", index[&node], text);
    }
    for &node in &nodes {
        for &child in tree.children(node) {
            let _ = writeln!(out, "  n{} -- n{};", index[&node], index[&child]);
        }
    }
    out.push('}');
    out
}

/// Parses the plain DOT subset back into a graph.
///
/// Vertex names are kept as strings. Repeated edges are tolerated, self-loops
/// are not.
pub fn graph_from_dot(input: &str) -> Result<Graph<String>, Error> {
    let compact: String = input.split_whitespace().collect();
    let open = compact
        .find('{')
        .ok_or_else(|| Error::InvalidGraph("malformed dot input: no '{'".into()))?;
    let close = compact
        .rfind('}')
        .filter(|&c| c > open)
        .ok_or_else(|| Error::InvalidGraph("malformed dot input: no '}'".into()))?;

    let mut graph = Graph::new();
    for statement in compact[open + 1..close].split(';') {
        if statement.is_empty() {
            continue;
        }
        let names: Vec<&str> = statement.split("--").collect();
        for name in &names {
            if name.is_empty() {
                return Err(Error::InvalidGraph(format!(
                    "malformed dot statement {statement:?}"
                )));
            }
            graph.add_vertex(name.to_string());
        }
        for pair in names.windows(2) {
            let u = graph.vertex_id(&pair[0].to_string()).expect("just added");
            let v = graph.vertex_id(&pair[1].to_string()).expect("just added");
            if u != v && graph.has_edge(u, v) {
                continue;
            }
            graph.add_edge(pair[0].to_string(), pair[1].to_string())?;
        }
    }
    Ok(graph)
}
