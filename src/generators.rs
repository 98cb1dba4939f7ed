//! Canonical small graphs.
//!
//! Node 0 is always the first node; for the star it is the hub. These exist
//! for demonstrations, tests and benchmarks; real inputs come from the caller.

use petgraph::graph::{NodeIndex, UnGraph};

fn with_nodes(n: usize) -> (UnGraph<(), ()>, Vec<NodeIndex>) {
    let mut graph = UnGraph::with_capacity(n, n);
    let nodes = (0..n).map(|_| graph.add_node(())).collect();
    (graph, nodes)
}

/// Hub node 0 joined to `leaves` leaf nodes (`leaves + 1` nodes total).
pub fn star_graph(leaves: usize) -> UnGraph<(), ()> {
    let (mut graph, nodes) = with_nodes(leaves + 1);
    for &leaf in &nodes[1..] {
        graph.add_edge(nodes[0], leaf, ());
    }
    graph
}

/// `0 - 1 - ... - (n-1)`.
pub fn path_graph(n: usize) -> UnGraph<(), ()> {
    let (mut graph, nodes) = with_nodes(n);
    for pair in nodes.windows(2) {
        graph.add_edge(pair[0], pair[1], ());
    }
    graph
}

/// Path closed back onto node 0. Below three nodes the closing edge would
/// be a self-loop or a duplicate, so those sizes are plain paths.
pub fn cycle_graph(n: usize) -> UnGraph<(), ()> {
    let mut graph = path_graph(n);
    if n >= 3 {
        graph.add_edge(NodeIndex::new(n - 1), NodeIndex::new(0), ());
    }
    graph
}

/// Every pair of distinct nodes joined once.
pub fn complete_graph(n: usize) -> UnGraph<(), ()> {
    let (mut graph, nodes) = with_nodes(n);
    for i in 0..n {
        for j in (i + 1)..n {
            graph.add_edge(nodes[i], nodes[j], ());
        }
    }
    graph
}
