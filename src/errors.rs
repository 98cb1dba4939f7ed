// Error types for second order centrality.
//
// All validation happens before the first linear solve, so a caller that
// gets an error back knows no numerical work was wasted. The exception is
// SingularSystem, which can only be discovered while factoring.

use thiserror::Error;

/// Errors returned by the centrality engine and its graph/solver adapters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CentralityError {
    /// Directed graphs and multigraphs have no well-defined SOC here.
    #[error("unsupported graph kind: {0} (a simple undirected graph is required)")]
    UnsupportedGraphKind(String),

    #[error("empty graph")]
    EmptyGraph,

    #[error("graph is not connected")]
    DisconnectedGraph,

    /// `I - Q_j` could not be factored for target `j`. Cannot happen for a
    /// connected graph with positive weights; treat it as a defect upstream.
    #[error("linear system for target node {target} is singular")]
    SingularSystem { target: usize },

    #[error("node index {0} out of bounds (graph has {1} nodes)")]
    NodeOutOfBounds(u32, u32),

    #[error("invalid weight {weight} on edge ({from}, {to})")]
    InvalidWeight {
        from: usize,
        to: usize,
        weight: f64,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type CentralityResult<T> = Result<T, CentralityError>;
