// Second order centrality (analytical)
//
// What is second order centrality?
// Let a random walk run forever on an undirected graph, choosing each
// step with probability proportional to edge weight. Record the times
// between successive visits to a node. The standard deviation of those
// return times is the node's SOC. A node the walk comes back to at a
// steady rhythm is central; one it revisits erratically is peripheral.
// Lower SOC = more central.
//
// The analytical version never simulates a walk:
//   P   = row-normalised adjacency (transition matrix)
//   Q_j = P with column j zeroed (j becomes a trap for hitting times)
//
//   (I - Q_j) m = 1             m[i] = E[T(i -> j)]      first moment
//   (I - Q_j) h = (I + Q_j) m   h[i] = E[T(i -> j)^2]    second moment
//
// Column j of M and H holds m and h for target j. Then
//   SOC[k] = sqrt(H[0][k] - M[0][k]^2)
// i.e. the variance identity Var = E[X^2] - E[X]^2 read off the FIRST ROW.
// The first row is the established formulation (Kermarrec, Le Merrer,
// Sericola, Tredan 2011) and is the default readout. Readout::Diagonal
// reads (k, k) instead, the return time to k itself.
//
// Time complexity: O(n) targets, each one O(n^3) LU factorisation reused
// for both solves. Only usable for small graphs.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use indexmap::IndexMap;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::errors::{CentralityError, CentralityResult};
use crate::graph::{adjacency_matrix, WalkGraph};
use crate::linalg::{Factorization, LinearSolver, LuSolver, DEFAULT_PIVOT_TOLERANCE};

// ============================================================================
// OPTIONS
// ============================================================================

/// Which cell of M and H a node's value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Readout {
    /// `(0, k)`: moments of the hitting time from the first node to `k`.
    #[default]
    FirstRow,
    /// `(k, k)`: moments of the return time to `k`.
    Diagonal,
}

impl Readout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Readout::FirstRow => "first-row",
            Readout::Diagonal => "diagonal",
        }
    }

    fn row_for(&self, node: usize) -> usize {
        match self {
            Readout::FirstRow => 0,
            Readout::Diagonal => node,
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Readout {
    type Err = CentralityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "first-row" => Ok(Readout::FirstRow),
            "diagonal" => Ok(Readout::Diagonal),
            other => Err(CentralityError::InvalidParameter(format!(
                "unknown readout '{}' (expected first-row or diagonal)",
                other
            ))),
        }
    }
}

/// Engine options. Deserialises from the `[engine]` table of `soc.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocOptions {
    pub readout: Readout,
    /// Solve targets on the rayon pool.
    pub parallel: bool,
    /// Relative LU pivot threshold below which a system counts as singular.
    pub pivot_tolerance: f64,
}

impl Default for SocOptions {
    fn default() -> Self {
        Self {
            readout: Readout::FirstRow,
            parallel: false,
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
        }
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Compute second order centrality for every node of `graph` with default
/// options (first-row readout, sequential, LU solver).
///
/// # Returns
/// Map from node ID to SOC, in the graph's native node order. Lower values
/// indicate more central nodes.
///
/// # Errors
/// - `UnsupportedGraphKind` for directed graphs or multigraphs
/// - `EmptyGraph` if the graph has no nodes
/// - `DisconnectedGraph` if some pair of nodes has no path
/// - `NodeOutOfBounds` / `InvalidWeight` for malformed edges
/// - `SingularSystem` if `I - Q_j` cannot be factored for some target
///
/// # Example
/// ```
/// use soc_centrality::{compute_second_order_centrality, most_central};
/// use soc_centrality::generators::star_graph;
///
/// let graph = star_graph(10);
/// let soc = compute_second_order_centrality(&graph).unwrap();
/// let (hub, _) = most_central(&soc).unwrap();
/// assert_eq!(hub.index(), 0);
/// ```
pub fn compute_second_order_centrality<G>(graph: &G) -> CentralityResult<IndexMap<G::NodeId, f64>>
where
    G: WalkGraph + ?Sized,
{
    second_order_centrality_with(graph, &SocOptions::default())
}

/// Same as [`compute_second_order_centrality`] with explicit options.
///
/// # Errors
/// As [`compute_second_order_centrality`], plus `InvalidParameter` for a
/// bad `pivot_tolerance`.
pub fn second_order_centrality_with<G>(
    graph: &G,
    options: &SocOptions,
) -> CentralityResult<IndexMap<G::NodeId, f64>>
where
    G: WalkGraph + ?Sized,
{
    let solver = LuSolver::new(options.pivot_tolerance)?;
    second_order_centrality_with_solver(graph, options, &solver)
}

/// Compute SOC with a caller-supplied linear solver.
///
/// `options.pivot_tolerance` is ignored here; the solver owns its own
/// singularity policy.
pub fn second_order_centrality_with_solver<G, S>(
    graph: &G,
    options: &SocOptions,
    solver: &S,
) -> CentralityResult<IndexMap<G::NodeId, f64>>
where
    G: WalkGraph + ?Sized,
    S: LinearSolver,
{
    // All checks before any O(n^3) work
    validate_graph(graph)?;
    let adjacency = adjacency_matrix(graph)?;
    let transition = transition_matrix(&adjacency)?;
    let n = transition.nrows();

    debug!(
        "Computing second order centrality: {} nodes, readout={}, parallel={}",
        n, options.readout, options.parallel
    );
    let started = Instant::now();

    // Any failing target aborts the whole call, no partial results
    let columns: Vec<(DVector<f64>, DVector<f64>)> = if options.parallel {
        (0..n)
            .into_par_iter()
            .map(|target| solve_target(&transition, target, solver))
            .collect::<CentralityResult<_>>()?
    } else {
        (0..n)
            .map(|target| solve_target(&transition, target, solver))
            .collect::<CentralityResult<_>>()?
    };

    let mut first_moments = DMatrix::<f64>::zeros(n, n);
    let mut second_moments = DMatrix::<f64>::zeros(n, n);
    for (target, (m, h)) in columns.iter().enumerate() {
        first_moments.set_column(target, m);
        second_moments.set_column(target, h);
    }

    let values = read_out(&first_moments, &second_moments, options.readout);
    let scores: IndexMap<G::NodeId, f64> = graph.node_ids().into_iter().zip(values).collect();

    info!(
        "Second order centrality for {} nodes computed in {:.2?}",
        n,
        started.elapsed()
    );
    Ok(scores)
}

/// Node with the lowest SOC, i.e. the most central one. Ties go to the
/// node that comes first in the map.
pub fn most_central<K>(scores: &IndexMap<K, f64>) -> Option<(&K, f64)> {
    scores.iter().fold(None, |best, (node, &value)| match best {
        Some((_, best_value)) if best_value <= value => best,
        _ => Some((node, value)),
    })
}

/// All nodes sorted from most to least central. Stable for equal values.
pub fn ranked<K>(scores: &IndexMap<K, f64>) -> Vec<(&K, f64)> {
    let mut ranking: Vec<(&K, f64)> = scores.iter().map(|(node, &value)| (node, value)).collect();
    ranking.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranking
}

// ============================================================================
// ALGORITHM STEPS
// ============================================================================

fn validate_graph<G: WalkGraph + ?Sized>(graph: &G) -> CentralityResult<()> {
    if graph.is_directed() {
        return Err(CentralityError::UnsupportedGraphKind("directed".to_string()));
    }
    if graph.node_count() == 0 {
        return Err(CentralityError::EmptyGraph);
    }
    if !graph.is_connected() {
        return Err(CentralityError::DisconnectedGraph);
    }
    Ok(())
}

/// Row-normalise a weighted adjacency matrix into a transition matrix.
///
/// A lone node without a self-loop gets `P = [[1]]`. Every other row must
/// have positive weight, otherwise the walk could never leave that node.
///
/// # Errors
/// - `EmptyGraph` for a 0x0 matrix
/// - `InvalidParameter` for a non-square matrix
/// - `DisconnectedGraph` if a row sums to zero in a graph with n > 1
pub fn transition_matrix(adjacency: &DMatrix<f64>) -> CentralityResult<DMatrix<f64>> {
    let n = adjacency.nrows();
    if n == 0 {
        return Err(CentralityError::EmptyGraph);
    }
    if adjacency.ncols() != n {
        return Err(CentralityError::InvalidParameter(format!(
            "adjacency matrix must be square, got {}x{}",
            n,
            adjacency.ncols()
        )));
    }
    if n == 1 && adjacency[(0, 0)] == 0.0 {
        return Ok(DMatrix::from_element(1, 1, 1.0));
    }

    let mut transition = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        let total: f64 = adjacency.row(i).sum();
        if !(total > 0.0) {
            return Err(CentralityError::DisconnectedGraph);
        }
        for j in 0..n {
            transition[(i, j)] = adjacency[(i, j)] / total;
        }
    }
    Ok(transition)
}

/// Fresh copy of `P` with column `target` zeroed. Never aliases `P`.
fn absorbing_variant(transition: &DMatrix<f64>, target: usize) -> DMatrix<f64> {
    let mut absorbing = transition.clone();
    absorbing.column_mut(target).fill(0.0);
    absorbing
}

/// First and second moments of the hitting time to `target` from every
/// start node.
fn solve_target<S: LinearSolver>(
    transition: &DMatrix<f64>,
    target: usize,
    solver: &S,
) -> CentralityResult<(DVector<f64>, DVector<f64>)> {
    let n = transition.nrows();
    let absorbing = absorbing_variant(transition, target);
    let identity = DMatrix::<f64>::identity(n, n);
    let singular = || CentralityError::SingularSystem { target };

    // One factorisation, two right-hand sides
    let factor = solver
        .factorize(&identity - &absorbing)
        .ok_or_else(singular)?;

    // eq. 3
    let m = factor
        .solve(&DVector::from_element(n, 1.0))
        .ok_or_else(singular)?;

    // eq. 4
    let rhs = (&identity + &absorbing) * &m;
    let h = factor.solve(&rhs).ok_or_else(singular)?;

    trace!(node = target, "solved hitting-time moments");
    Ok((m, h))
}

fn read_out(first_moments: &DMatrix<f64>, second_moments: &DMatrix<f64>, readout: Readout) -> Vec<f64> {
    (0..first_moments.ncols())
        .map(|node| {
            let row = readout.row_for(node);
            standard_deviation(second_moments[(row, node)], first_moments[(row, node)])
        })
        .collect()
}

/// sqrt(E[X^2] - E[X]^2), clamped at zero.
///
/// When the true variance is 0 (e.g. the hub of a star always returns in
/// exactly two steps) cancellation can leave a tiny negative number.
/// Clamping happens here and nowhere else. NaN is passed through.
fn standard_deviation(second_moment: f64, first_moment: f64) -> f64 {
    let variance = second_moment - first_moment * first_moment;
    if variance < 0.0 {
        trace!(variance, "clamping negative variance to zero");
        return 0.0;
    }
    variance.sqrt()
}

// ============================================================================
// TESTS
// ============================================================================
//
// Reference values are closed forms:
// - star with k leaves: hub 0, leaves sqrt(4k(k-1)) (hitting time from the
//   hub is 2G - 1 with G geometric, p = 1/k)
// - complete graph K_n: sqrt((n-1)(n-2)) everywhere
// - cycle C_5: return time sd sqrt(20); hitting time sd from node 0 is
//   sqrt(20) at distance 1 and sqrt(22) at distance 2
// ============================================================================
