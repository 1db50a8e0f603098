//! Random graph generators.
//!
//! Binomial and fixed-size random graphs, random cographs, random prime
//! graphs, and modular-width-bounded graphs assembled by module substitution.
//! These feed the demos and the test-suite; all randomness comes from a
//! caller-supplied generator, so runs are reproducible from a seed.

use rand::Rng;

use crate::{md_tree, Graph, ModuleKind};

/// How substituted parts are spread over the host graph during assembly.
///
/// `Wide` keeps the decomposition tree as flat as possible, `Deep` chains the
/// parts into each other, `Random` lands in between.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Wide,
    Deep,
    Random,
}

/// Binomial random graph: every pair becomes an edge with `edge_probability`.
/// Vertices are labeled 1 through `order`.
pub fn gnp<R: Rng>(rng: &mut R, order: u32, edge_probability: f64) -> Graph<u32> {
    let mut graph = Graph::new();
    for v in 1..=order {
        graph.add_vertex(v);
    }
    for u in 1..=order {
        for v in u + 1..=order {
            if rng.gen::<f64>() < edge_probability {
                graph.add_edge(u, v).expect("each pair is visited once");
            }
        }
    }
    graph
}

/// Uniform random graph with exactly `size` edges.
pub fn uniform<R: Rng>(rng: &mut R, order: u32, size: usize) -> Graph<u32> {
    assert!(order >= 1, "a graph needs at least one vertex");
    let possible = order as usize * (order as usize - 1) / 2;
    assert!(
        size <= possible,
        "a graph on {order} vertices has at most {possible} edges"
    );
    let mut graph = Graph::new();
    for v in 1..=order {
        graph.add_vertex(v);
    }
    let mut inserted = 0;
    while inserted < size {
        let u = rng.gen_range(1..=order);
        let v = rng.gen_range(1..=order);
        if u == v {
            continue;
        }
        let (u, v) = (u.min(v), u.max(v));
        let (ui, vi) = (
            graph.vertex_id(&u).expect("all labels are present"),
            graph.vertex_id(&v).expect("all labels are present"),
        );
        if graph.has_edge(ui, vi) {
            continue;
        }
        graph.add_edge(u, v).expect("the edge was just checked");
        inserted += 1;
    }
    graph
}

/// Whether the decomposition of `graph` is a single flat prime module.
pub fn is_prime(graph: &Graph<u32>) -> bool {
    let tree = md_tree(graph).expect("generated graphs are nonempty");
    tree.module_kind(tree.root()) == Some(ModuleKind::Prime)
        && tree.children(tree.root()).len() == graph.vertex_count()
}

/// Random prime graph on `order` vertices, by rejection sampling over
/// [`gnp`]. Orders below four cannot be prime and fall back to a cograph.
/// `edge_probability` should stay away from 0 and 1 or sampling will not
/// terminate in reasonable time.
pub fn random_prime_graph<R: Rng>(rng: &mut R, order: u32, edge_probability: f64) -> Graph<u32> {
    if order < 4 {
        return random_cograph(rng, order, edge_probability, Mode::Random);
    }
    loop {
        let graph = gnp(rng, order, edge_probability);
        if is_prime(&graph) {
            return graph;
        }
    }
}

/// Random cograph on `order` vertices: iterated substitution of two-vertex
/// graphs, each an edge with `edge_probability`.
pub fn random_cograph<R: Rng>(
    rng: &mut R,
    order: u32,
    edge_probability: f64,
    mode: Mode,
) -> Graph<u32> {
    assert!(order >= 1, "a graph needs at least one vertex");
    if order == 1 {
        let mut graph = Graph::new();
        graph.add_vertex(1);
        return graph;
    }
    let parts = (0..order - 1)
        .map(|i| {
            let mut part = Graph::new();
            let (u, v) = (2 * i + 1, 2 * i + 2);
            part.add_vertex(u);
            part.add_vertex(v);
            if rng.gen::<f64>() < edge_probability {
                part.add_edge(u, v).expect("the pair is fresh");
            }
            part
        })
        .collect();
    flatten_labels(&assemble(rng, parts, mode))
}

/// Random graph whose modular width lies in `lo_bound..=hi_bound`: prime
/// modules of random sizes in that range, assembled by substitution.
pub fn mw_bound_graph<R: Rng>(
    rng: &mut R,
    order: u32,
    lo_bound: u32,
    hi_bound: u32,
    edge_probability: f64,
    mode: Mode,
) -> Graph<u32> {
    assert!(
        2 <= lo_bound && lo_bound <= hi_bound,
        "module sizes below two cannot be assembled"
    );
    // Substituting a part of size s grows the graph by s - 1 vertices.
    let mut sizes: Vec<u32> = Vec::new();
    let mut total = 1;
    while total < order {
        let size = rng.gen_range(lo_bound..=hi_bound).min(order - total + 1);
        sizes.push(size);
        total += size - 1;
    }
    if sizes.is_empty() {
        sizes.push(1);
    }
    let mut parts = Vec::with_capacity(sizes.len());
    let mut offset = 0;
    for &size in &sizes {
        parts.push(offset_labels(&random_prime_graph(rng, size, edge_probability), offset));
        offset += size;
    }
    flatten_labels(&assemble(rng, parts, mode))
}

/// Iterated substitution of `parts` into one growing host graph. The label
/// sets of the parts must be pairwise disjoint.
fn assemble<R: Rng>(rng: &mut R, mut parts: Vec<Graph<u32>>, mode: Mode) -> Graph<u32> {
    let mut graph = parts.pop().expect("assembly needs at least one part");
    let mut recent: Vec<u32> = labels_of(&graph);
    while !parts.is_empty() {
        match mode {
            Mode::Wide => {
                for at in labels_of(&graph) {
                    let Some(part) = parts.pop() else {
                        break;
                    };
                    graph = substitute(&graph, at, &part);
                }
            }
            Mode::Random => {
                let candidates = labels_of(&graph);
                let at = candidates[rng.gen_range(0..candidates.len())];
                let part = parts.pop().expect("the loop guard saw a part");
                graph = substitute(&graph, at, &part);
            }
            Mode::Deep => {
                let at = recent[rng.gen_range(0..recent.len())];
                let part = parts.pop().expect("the loop guard saw a part");
                recent = labels_of(&part);
                graph = substitute(&graph, at, &part);
            }
        }
    }
    graph
}

/// Replaces the vertex labeled `at` with the whole of `part`: the part keeps
/// its internal edges and every part vertex inherits the target's
/// neighborhood, which makes the part's vertex set a module of the result.
fn substitute(host: &Graph<u32>, at: u32, part: &Graph<u32>) -> Graph<u32> {
    let at_id = host.vertex_id(&at).expect("substitution target is in the host");
    let mut out = Graph::new();
    for v in host.vertices() {
        if v != at_id {
            out.add_vertex(*host.label(v));
        }
    }
    for v in part.vertices() {
        out.add_vertex(*part.label(v));
    }
    for u in host.vertices() {
        if u == at_id {
            continue;
        }
        for v in host.neighbors(u) {
            if v > u && v != at_id {
                out.add_edge(*host.label(u), *host.label(v))
                    .expect("host edges are unique");
            }
        }
    }
    for u in part.vertices() {
        for v in part.neighbors(u) {
            if v > u {
                out.add_edge(*part.label(u), *part.label(v))
                    .expect("part edges are unique");
            }
        }
    }
    for n in host.neighbors(at_id) {
        for p in part.vertices() {
            out.add_edge(*host.label(n), *part.label(p))
                .expect("the label sets are disjoint");
        }
    }
    out
}

fn labels_of(graph: &Graph<u32>) -> Vec<u32> {
    graph.vertices().map(|v| *graph.label(v)).collect()
}

fn offset_labels(graph: &Graph<u32>, offset: u32) -> Graph<u32> {
    relabel(graph, |label| label + offset)
}

/// Renames the vertices 1 through n in internal order.
fn flatten_labels(graph: &Graph<u32>) -> Graph<u32> {
    let fresh: Vec<u32> = (1..=graph.vertex_count() as u32).collect();
    relabel(graph, |label| {
        let id = graph.vertex_id(&label).expect("label comes from the graph");
        fresh[id.index()]
    })
}

fn relabel(graph: &Graph<u32>, map: impl Fn(u32) -> u32) -> Graph<u32> {
    let mut out = Graph::new();
    for v in graph.vertices() {
        out.add_vertex(map(*graph.label(v)));
    }
    for u in graph.vertices() {
        for v in graph.neighbors(u) {
            if v > u {
                out.add_edge(map(*graph.label(u)), map(*graph.label(v)))
                    .expect("relabeling is injective");
            }
        }
    }
    out
}
