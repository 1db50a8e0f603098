//! Decomposes one seeded random graph and prints tree statistics.

use std::time::Instant;

use md_core::{dot, gen, md_tree, ModuleKind};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("usage: decompose_one <order> <edge-probability> <seed> [--dot]");
        std::process::exit(1);
    }
    let order: u32 = args[1].parse().expect("order");
    let edge_probability: f64 = args[2].parse().expect("edge-probability");
    let seed: u64 = args[3].parse().expect("seed");

    let mut rng = SmallRng::seed_from_u64(seed);
    let graph = gen::gnp(&mut rng, order, edge_probability);

    let begin = Instant::now();
    let tree = match md_tree(&graph) {
        Ok(tree) => tree,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };
    let elapsed = begin.elapsed();

    let (mut series, mut parallel, mut prime, mut leaves) = (0u32, 0u32, 0u32, 0u32);
    for node in tree.nodes() {
        match tree.module_kind(node) {
            Some(ModuleKind::Series) => series += 1,
            Some(ModuleKind::Parallel) => parallel += 1,
            Some(ModuleKind::Prime) => prime += 1,
            None => leaves += 1,
        }
    }
    println!(
        "order={} size={} elapsed_ms={:.3} nodes={} depth={} series={} parallel={} prime={} leaves={}",
        graph.vertex_count(),
        graph.edge_count(),
        elapsed.as_secs_f64() * 1000.0,
        tree.node_count(),
        tree.depth(),
        series,
        parallel,
        prime,
        leaves
    );

    if args.iter().any(|a| a == "--dot") {
        println!("{}", dot::tree_to_dot(&tree, &graph));
    } else if order <= 32 {
        println!("{}", tree.to_text(&graph));
    }
}
