//! Reads a graph from a .dot file and prints its decomposition tree.

use md_core::{dot, md_tree};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: decompose_dot <path/to/graph.dot> [--dot]");
        std::process::exit(1);
    }
    let input = match std::fs::read_to_string(&args[1]) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("cannot read {}: {error}", args[1]);
            std::process::exit(1);
        }
    };
    let graph = match dot::graph_from_dot(&input) {
        Ok(graph) => graph,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };
    let tree = match md_tree(&graph) {
        Ok(tree) => tree,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };
    if args.iter().any(|a| a == "--dot") {
        println!("{}", dot::tree_to_dot(&tree, &graph));
    } else {
        println!("{}", tree.to_text(&graph));
    }
}
