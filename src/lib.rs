//! Second order centrality for small undirected graphs
//!
//! The second order centrality (SOC) of a node is the standard deviation of
//! the return times of a perpetual random walk to that node. Lower values
//! mean more central nodes. Values are computed analytically from the
//! walk's transition matrix, one pair of linear solves per node, so the
//! cost is cubic per node and only small graphs are practical.
//!
//! # Example
//!
//! ```
//! use soc_centrality::{compute_second_order_centrality, most_central};
//! use soc_centrality::generators::star_graph;
//!
//! let soc = compute_second_order_centrality(&star_graph(10)).unwrap();
//! let (node, _) = most_central(&soc).unwrap();
//! println!("Most central node id: {}", node.index());
//! ```
//!
//! Any graph can be fed in by implementing [`WalkGraph`]; adapters exist for
//! `petgraph::Graph` and [`EdgeListGraph`]. The dense solver sits behind
//! [`LinearSolver`], with [`LuSolver`] as the default.

pub mod config;
pub mod errors;
pub mod generators;
pub mod graph;
pub mod linalg;
pub mod soc;

pub use errors::{CentralityError, CentralityResult};
pub use graph::{adjacency_matrix, EdgeListGraph, WalkGraph, WalkWeight};
pub use linalg::{Factorization, LinearSolver, LuFactorization, LuSolver};
pub use soc::{
    compute_second_order_centrality, most_central, ranked, second_order_centrality_with,
    second_order_centrality_with_solver, transition_matrix, Readout, SocOptions,
};
