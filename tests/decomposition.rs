//! Decomposition correctness harness.
//!
//! Boundary graphs with known trees, a brute-force oracle over the module
//! properties, reconstruction of the input graph from its tree, and the
//! structural dualities (complement, relabeling) on seeded random graphs.

use std::collections::{BTreeSet, HashMap, HashSet};

use md_core::{gen, md_tree, Error, Graph, MdTree, ModuleKind, NodeId, VertexId};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn graph(order: u32, edges: &[(u32, u32)]) -> Graph<u32> {
    let mut g = Graph::new();
    for v in 1..=order {
        g.add_vertex(v);
    }
    for &(u, v) in edges {
        g.add_edge(u, v).unwrap();
    }
    g
}

fn complement(graph: &Graph<u32>) -> Graph<u32> {
    let mut out = Graph::new();
    for v in graph.vertices() {
        out.add_vertex(*graph.label(v));
    }
    for u in graph.vertices() {
        for v in graph.vertices() {
            if v > u && !graph.has_edge(u, v) {
                out.add_edge(*graph.label(u), *graph.label(v)).unwrap();
            }
        }
    }
    out
}

fn leaves_under(tree: &MdTree, node: NodeId) -> Vec<VertexId> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(id) = stack.pop() {
        match tree.vertex(id) {
            Some(v) => out.push(v),
            None => stack.extend(tree.children(id).iter().copied()),
        }
    }
    out
}

/// Canonical string form of a tree: children sorted, labels mapped, module
/// kinds optionally swapped for the complement duality.
fn canonical(
    tree: &MdTree,
    graph: &Graph<u32>,
    node: NodeId,
    map: &dyn Fn(u32) -> u32,
    swap: bool,
) -> String {
    if let Some(v) = tree.vertex(node) {
        return map(*graph.label(v)).to_string();
    }
    let mut parts: Vec<String> = tree
        .children(node)
        .iter()
        .map(|&child| canonical(tree, graph, child, map, swap))
        .collect();
    parts.sort();
    let kind = match (tree.module_kind(node).unwrap(), swap) {
        (ModuleKind::Series, true) => ModuleKind::Parallel,
        (ModuleKind::Parallel, true) => ModuleKind::Series,
        (kind, _) => kind,
    };
    format!("{kind:?}[{}]", parts.join(","))
}

fn canon(tree: &MdTree, graph: &Graph<u32>) -> String {
    canonical(tree, graph, tree.root(), &|v| v, false)
}

/// True when the quotient contains a module of size >= 2 other than the whole
/// vertex set: the smallest module containing some pair is grown by splitter
/// closure and compared against the full set.
fn quotient_has_nontrivial_module(adjacency: &[Vec<bool>]) -> bool {
    let k = adjacency.len();
    for i in 0..k {
        for j in i + 1..k {
            let mut in_set = vec![false; k];
            in_set[i] = true;
            in_set[j] = true;
            let mut size = 2;
            loop {
                let mut grew = false;
                for z in 0..k {
                    if in_set[z] {
                        continue;
                    }
                    let mut some = false;
                    let mut all = true;
                    for w in 0..k {
                        if in_set[w] {
                            if adjacency[z][w] {
                                some = true;
                            } else {
                                all = false;
                            }
                        }
                    }
                    if some && !all {
                        in_set[z] = true;
                        size += 1;
                        grew = true;
                    }
                }
                if !grew {
                    break;
                }
            }
            if size < k {
                return true;
            }
        }
    }
    false
}

/// The full oracle: leaf set, arity, same-kind nesting, the module property
/// of every internal node, contiguity of every module in the leaf order, and
/// kind correctness against the quotient on child representatives.
fn assert_valid_md_tree(graph: &Graph<u32>, tree: &MdTree) {
    let leaf_order = tree.leaf_vertices();
    let mut leaf_labels: Vec<u32> = leaf_order.iter().map(|&v| *graph.label(v)).collect();
    leaf_labels.sort_unstable();
    let mut expected: Vec<u32> = graph.vertices().map(|v| *graph.label(v)).collect();
    expected.sort_unstable();
    assert_eq!(leaf_labels, expected, "leaf set must equal the vertex set");

    let position: HashMap<VertexId, usize> =
        leaf_order.iter().enumerate().map(|(i, &v)| (v, i)).collect();

    for node in tree.nodes() {
        if tree.is_leaf(node) {
            continue;
        }
        let children = tree.children(node);
        assert!(
            children.len() >= 2,
            "internal node with {} children",
            children.len()
        );
        let kind = tree.module_kind(node).unwrap();
        if let Some(parent) = tree.parent(node) {
            if matches!(kind, ModuleKind::Series | ModuleKind::Parallel) {
                assert_ne!(
                    Some(kind),
                    tree.module_kind(parent),
                    "degenerate node nested under a same-kind parent"
                );
            }
        }

        // Module property: outside vertices see all of the module or none.
        let inside: HashSet<VertexId> = leaves_under(tree, node).into_iter().collect();
        for w in graph.vertices() {
            if inside.contains(&w) {
                continue;
            }
            let hits = inside.iter().filter(|&&m| graph.has_edge(w, m)).count();
            assert!(
                hits == 0 || hits == inside.len(),
                "vertex {} distinguishes the module of {} leaves",
                graph.label(w),
                inside.len()
            );
        }

        // Strong modules are contiguous in the factorizing permutation.
        let mut positions: Vec<usize> = inside.iter().map(|v| position[v]).collect();
        positions.sort_unstable();
        assert_eq!(
            positions[positions.len() - 1] - positions[0] + 1,
            positions.len(),
            "module is not contiguous in the leaf order"
        );

        // Kind correctness on child representatives; children are modules, so
        // one representative per child decides adjacency.
        let representatives: Vec<VertexId> = children
            .iter()
            .map(|&child| leaves_under(tree, child)[0])
            .collect();
        match kind {
            ModuleKind::Series => {
                for (i, &u) in representatives.iter().enumerate() {
                    for &v in &representatives[i + 1..] {
                        assert!(graph.has_edge(u, v), "series children must be joined");
                    }
                }
            }
            ModuleKind::Parallel => {
                for (i, &u) in representatives.iter().enumerate() {
                    for &v in &representatives[i + 1..] {
                        assert!(!graph.has_edge(u, v), "parallel children must be disjoint");
                    }
                }
            }
            ModuleKind::Prime => {
                let adjacency: Vec<Vec<bool>> = representatives
                    .iter()
                    .map(|&u| {
                        representatives
                            .iter()
                            .map(|&v| u != v && graph.has_edge(u, v))
                            .collect()
                    })
                    .collect();
                assert!(
                    !quotient_has_nontrivial_module(&adjacency),
                    "prime quotient on {} children has a nontrivial module",
                    representatives.len()
                );
            }
        }
    }
}

fn edge_set(graph: &Graph<u32>) -> BTreeSet<(u32, u32)> {
    let mut edges = BTreeSet::new();
    for u in graph.vertices() {
        for v in graph.neighbors(u) {
            if v > u {
                let (a, b) = (*graph.label(u), *graph.label(v));
                edges.insert((a.min(b), a.max(b)));
            }
        }
    }
    edges
}

/// Rebuilds the edge set encoded by the tree: for every internal node, two
/// children are joined completely iff their representatives are adjacent.
fn reconstructed_edges(graph: &Graph<u32>, tree: &MdTree) -> BTreeSet<(u32, u32)> {
    let mut edges = BTreeSet::new();
    for node in tree.nodes() {
        if tree.is_leaf(node) {
            continue;
        }
        let children = tree.children(node);
        let groups: Vec<Vec<VertexId>> = children
            .iter()
            .map(|&child| leaves_under(tree, child))
            .collect();
        for i in 0..groups.len() {
            for j in i + 1..groups.len() {
                if graph.has_edge(groups[i][0], groups[j][0]) {
                    for &u in &groups[i] {
                        for &v in &groups[j] {
                            let (a, b) = (*graph.label(u), *graph.label(v));
                            edges.insert((a.min(b), a.max(b)));
                        }
                    }
                }
            }
        }
    }
    edges
}

#[test]
fn empty_graph_is_rejected() {
    assert_eq!(md_tree(&Graph::<u32>::new()).unwrap_err(), Error::EmptyGraph);
}

#[test]
fn single_vertex_is_a_single_leaf() {
    let g = graph(1, &[]);
    let tree = md_tree(&g).unwrap();
    assert!(tree.is_leaf(tree.root()));
    assert_eq!(tree.node_count(), 1);
    assert_eq!(canon(&tree, &g), "1");
}

#[test]
fn two_isolated_vertices_are_parallel() {
    let g = graph(2, &[]);
    let tree = md_tree(&g).unwrap();
    assert_eq!(canon(&tree, &g), "Parallel[1,2]");
}

#[test]
fn a_single_edge_is_series() {
    let g = graph(2, &[(1, 2)]);
    let tree = md_tree(&g).unwrap();
    assert_eq!(canon(&tree, &g), "Series[1,2]");
}

#[test]
fn the_path_p4_is_prime() {
    let g = graph(4, &[(1, 2), (2, 3), (3, 4)]);
    let tree = md_tree(&g).unwrap();
    assert_eq!(tree.module_kind(tree.root()), Some(ModuleKind::Prime));
    assert_eq!(tree.children(tree.root()).len(), 4);
    assert!(tree.children(tree.root()).iter().all(|&c| tree.is_leaf(c)));
    assert_valid_md_tree(&g, &tree);
}

#[test]
fn complete_bipartite_k23_is_a_join_of_stable_sets() {
    let g = graph(5, &[(1, 3), (1, 4), (1, 5), (2, 3), (2, 4), (2, 5)]);
    let tree = md_tree(&g).unwrap();
    assert_eq!(canon(&tree, &g), "Series[Parallel[1,2],Parallel[3,4,5]]");
    assert_valid_md_tree(&g, &tree);
}

#[test]
fn the_cycle_c5_is_prime() {
    let g = graph(5, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 1)]);
    let tree = md_tree(&g).unwrap();
    assert_eq!(tree.module_kind(tree.root()), Some(ModuleKind::Prime));
    assert_eq!(tree.children(tree.root()).len(), 5);
    assert_valid_md_tree(&g, &tree);
}

#[test]
fn triangle_with_an_isolated_vertex() {
    let g = graph(4, &[(1, 2), (1, 3), (2, 3)]);
    let tree = md_tree(&g).unwrap();
    assert_eq!(canon(&tree, &g), "Parallel[4,Series[1,2,3]]");
    assert_valid_md_tree(&g, &tree);
}

#[test]
fn disconnected_graphs_get_one_parallel_child_per_component() {
    // Two triangles and one isolated vertex.
    let g = graph(7, &[(1, 2), (1, 3), (2, 3), (4, 5), (4, 6), (5, 6)]);
    let tree = md_tree(&g).unwrap();
    assert_eq!(
        canon(&tree, &g),
        "Parallel[7,Series[1,2,3],Series[4,5,6]]"
    );
    assert_valid_md_tree(&g, &tree);
}

#[test]
fn decomposition_is_deterministic() {
    let mut rng = SmallRng::seed_from_u64(99);
    let g = gen::gnp(&mut rng, 20, 0.4);
    let first = md_tree(&g).unwrap().to_text(&g);
    let second = md_tree(&g).unwrap().to_text(&g);
    assert_eq!(first, second);
}

#[test]
fn random_graphs_satisfy_the_module_properties() {
    let configurations = [
        (6u32, 0.3),
        (6, 0.7),
        (10, 0.2),
        (10, 0.5),
        (10, 0.8),
        (16, 0.3),
        (16, 0.5),
        (16, 0.7),
        (25, 0.5),
        (40, 0.1),
        (40, 0.5),
        (40, 0.9),
    ];
    for seed in 1..=8u64 {
        let mut rng = SmallRng::seed_from_u64(seed * 7919);
        for &(order, probability) in &configurations {
            let g = gen::gnp(&mut rng, order, probability);
            let tree = md_tree(&g).unwrap();
            assert_valid_md_tree(&g, &tree);
            assert_eq!(
                reconstructed_edges(&g, &tree),
                edge_set(&g),
                "tree must encode the graph (order={order}, p={probability}, seed={seed})"
            );
        }
    }
}

#[test]
fn sparse_and_dense_uniform_graphs_are_valid() {
    for seed in 1..=5u64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        for size in [0usize, 5, 20, 60, 105] {
            let g = gen::uniform(&mut rng, 15, size);
            let tree = md_tree(&g).unwrap();
            assert_valid_md_tree(&g, &tree);
        }
    }
}

#[test]
fn complementation_swaps_series_and_parallel() {
    for seed in 1..=10u64 {
        let mut rng = SmallRng::seed_from_u64(seed * 31);
        for &(order, probability) in &[(8u32, 0.3), (12, 0.5), (16, 0.7)] {
            let g = gen::gnp(&mut rng, order, probability);
            let co = complement(&g);
            let tree = md_tree(&g).unwrap();
            let co_tree = md_tree(&co).unwrap();
            let swapped = canonical(&tree, &g, tree.root(), &|v| v, true);
            let straight = canonical(&co_tree, &co, co_tree.root(), &|v| v, false);
            assert_eq!(swapped, straight, "complement duality (seed={seed})");
        }
    }
}

#[test]
fn relabeling_yields_an_isomorphic_tree() {
    for seed in 1..=10u64 {
        let mut rng = SmallRng::seed_from_u64(seed * 131);
        let g = gen::gnp(&mut rng, 14, 0.5);
        let mut images: Vec<u32> = (1..=14).collect();
        images.shuffle(&mut rng);
        let map = move |v: u32| images[(v - 1) as usize];

        let mut relabeled = Graph::new();
        for v in g.vertices() {
            relabeled.add_vertex(map(*g.label(v)));
        }
        for u in g.vertices() {
            for v in g.neighbors(u) {
                if v > u {
                    relabeled.add_edge(map(*g.label(u)), map(*g.label(v))).unwrap();
                }
            }
        }

        let tree = md_tree(&g).unwrap();
        let relabeled_tree = md_tree(&relabeled).unwrap();
        assert_eq!(
            canonical(&tree, &g, tree.root(), &map, false),
            canon(&relabeled_tree, &relabeled),
            "relabeling equivariance (seed={seed})"
        );
    }
}

#[test]
fn cographs_decompose_without_prime_nodes() {
    for seed in 1..=6u64 {
        let mut rng = SmallRng::seed_from_u64(seed * 17);
        for mode in [gen::Mode::Wide, gen::Mode::Deep, gen::Mode::Random] {
            let g = gen::random_cograph(&mut rng, 18, 0.5, mode);
            let tree = md_tree(&g).unwrap();
            assert_valid_md_tree(&g, &tree);
            assert!(
                tree.nodes()
                    .into_iter()
                    .all(|n| tree.module_kind(n) != Some(ModuleKind::Prime)),
                "a cograph has no prime module (seed={seed}, mode={mode:?})"
            );
        }
    }
}

#[test]
fn generated_prime_graphs_are_flat() {
    let mut rng = SmallRng::seed_from_u64(5);
    for order in [5u32, 6, 8] {
        let g = gen::random_prime_graph(&mut rng, order, 0.5);
        let tree = md_tree(&g).unwrap();
        assert_eq!(tree.module_kind(tree.root()), Some(ModuleKind::Prime));
        assert_eq!(tree.children(tree.root()).len(), order as usize);
        assert_valid_md_tree(&g, &tree);
    }
}

#[test]
fn bounded_modular_width_graphs_are_valid() {
    for seed in 1..=4u64 {
        let mut rng = SmallRng::seed_from_u64(seed * 41);
        for mode in [gen::Mode::Wide, gen::Mode::Deep, gen::Mode::Random] {
            let g = gen::mw_bound_graph(&mut rng, 26, 4, 6, 0.5, mode);
            let tree = md_tree(&g).unwrap();
            assert_valid_md_tree(&g, &tree);
        }
    }
}

#[test]
fn string_labeled_graphs_work_unchanged() {
    let mut g = Graph::new();
    g.add_edge("left".to_string(), "mid".to_string()).unwrap();
    g.add_edge("mid".to_string(), "right".to_string()).unwrap();
    // A path on three vertices: the endpoints form a parallel module under a
    // series root.
    let tree = md_tree(&g).unwrap();
    assert_eq!(tree.module_kind(tree.root()), Some(ModuleKind::Series));
    assert_eq!(tree.leaves().len(), 3);
    let text = tree.to_text(&g);
    assert!(text.contains("parallel("), "{text}");
}
