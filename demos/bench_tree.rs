//! Timing sweep over random and modular-width-bounded graphs.
//!
//! Writes one JSON record per run to `bench_md.json` and prints a short
//! summary line per configuration.

use std::fs::File;
use std::io::Write;
use std::time::Instant;

use md_core::{gen, md_tree, Graph};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn run_one(kind: &str, graph: &Graph<u32>, seed: u64) -> serde_json::Value {
    let begin = Instant::now();
    let tree = md_tree(graph).expect("generated graphs are nonempty");
    let ms = begin.elapsed().as_secs_f64() * 1000.0;
    println!(
        "{kind} order={} size={} seed={seed} ms={ms:.3} nodes={} depth={}",
        graph.vertex_count(),
        graph.edge_count(),
        tree.node_count(),
        tree.depth()
    );
    serde_json::json!({
        "kind": kind,
        "order": graph.vertex_count(),
        "size": graph.edge_count(),
        "seed": seed,
        "ms": ms,
        "nodes": tree.node_count(),
        "depth": tree.depth(),
    })
}

fn main() {
    let out_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "bench_md.json".to_string());
    let mut results = Vec::new();

    for order in [50u32, 100, 200, 400] {
        for edge_probability in [0.1, 0.5, 0.9] {
            for seed in 1..=3u64 {
                let mut rng = SmallRng::seed_from_u64(seed);
                let graph = gen::gnp(&mut rng, order, edge_probability);
                results.push(run_one("gnp", &graph, seed));
            }
        }
    }

    for width in [4u32, 8, 16] {
        for seed in 1..=3u64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let graph = gen::mw_bound_graph(&mut rng, 200, width, width, 0.5, gen::Mode::Random);
            results.push(run_one("mw_bound", &graph, seed));
        }
    }

    let json = serde_json::Value::Array(results);
    let mut file = File::create(&out_path).expect("create output file");
    file.write_all(serde_json::to_string_pretty(&json).unwrap().as_bytes())
        .unwrap();
    println!("wrote {out_path}");
}
