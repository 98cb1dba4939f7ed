// Graph capability for the centrality engine
//
// The engine never touches a concrete graph type. It asks for four things:
// - node enumeration (native order, used to key the result)
// - weighted edge iteration (positions into that enumeration)
// - whether the graph is directed
// - whether the graph is connected
//
// Two adapters ship here:
// - petgraph::Graph<N, E, Ty, Ix> for any edge weight implementing WalkWeight
// - EdgeListGraph, a plain (src, dst, weight) list keyed by u32 node IDs
//
// The dense adjacency matrix is built once from these capabilities and is
// where weights, bounds and multi-edges get validated.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use nalgebra::DMatrix;
use petgraph::algo::connected_components;
use petgraph::graph::{Graph, IndexType, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;

use crate::errors::{CentralityError, CentralityResult};

/// Read-only view of a graph as the random walk sees it.
pub trait WalkGraph {
    /// Identifier used as the key of the result map.
    type NodeId: Clone + Eq + Hash;

    fn is_directed(&self) -> bool;

    fn node_count(&self) -> usize;

    /// Node identifiers in native order. Position `i` in this list is row
    /// and column `i` of the adjacency matrix.
    fn node_ids(&self) -> Vec<Self::NodeId>;

    /// Every edge once, as `(source position, target position, weight)`.
    fn weighted_edges(&self) -> Vec<(usize, usize, f64)>;

    fn is_connected(&self) -> bool;
}

/// Edge weights the walk can interpret as a transition weight.
///
/// Unit weights (`()`) count as 1.0, so an unweighted petgraph graph gives
/// a uniform walk over neighbours.
pub trait WalkWeight {
    fn walk_weight(&self) -> f64;
}

impl WalkWeight for () {
    fn walk_weight(&self) -> f64 {
        1.0
    }
}

macro_rules! impl_walk_weight {
    ($($t:ty),*) => {
        $(
            impl WalkWeight for $t {
                fn walk_weight(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

impl_walk_weight!(f64, f32, u8, u16, u32, u64, usize, i32, i64);

// ============================================================================
// PETGRAPH ADAPTER
// ============================================================================
//
// petgraph::Graph keeps node indices compact (0..n), so NodeIndex::index()
// is already the matrix position. StableGraph is not supported for that
// reason: removed nodes leave holes in the index space.

impl<N, E, Ty, Ix> WalkGraph for Graph<N, E, Ty, Ix>
where
    E: WalkWeight,
    Ty: EdgeType,
    Ix: IndexType,
{
    type NodeId = NodeIndex<Ix>;

    fn is_directed(&self) -> bool {
        Graph::is_directed(self)
    }

    fn node_count(&self) -> usize {
        Graph::node_count(self)
    }

    fn node_ids(&self) -> Vec<NodeIndex<Ix>> {
        self.node_indices().collect()
    }

    fn weighted_edges(&self) -> Vec<(usize, usize, f64)> {
        self.edge_references()
            .map(|edge| {
                (
                    edge.source().index(),
                    edge.target().index(),
                    edge.weight().walk_weight(),
                )
            })
            .collect()
    }

    fn is_connected(&self) -> bool {
        connected_components(self) <= 1
    }
}

// ============================================================================
// EDGE LIST ADAPTER
// ============================================================================

/// Validate that all edges reference valid node indices.
fn validate_edges(edges: &[(u32, u32, f64)], num_nodes: u32) -> CentralityResult<()> {
    for &(src, dst, _) in edges {
        if src >= num_nodes {
            return Err(CentralityError::NodeOutOfBounds(src, num_nodes));
        }
        if dst >= num_nodes {
            return Err(CentralityError::NodeOutOfBounds(dst, num_nodes));
        }
    }
    Ok(())
}

/// Undirected graph stored as an edge list over nodes `0..num_nodes`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeListGraph {
    num_nodes: usize,
    edges: Vec<(u32, u32, f64)>,
}

impl EdgeListGraph {
    /// Unweighted graph: every edge has weight 1.
    ///
    /// # Errors
    /// - `NodeOutOfBounds` if any edge references a node >= num_nodes
    pub fn new(edges: &[(u32, u32)], num_nodes: usize) -> CentralityResult<Self> {
        let weighted: Vec<(u32, u32, f64)> =
            edges.iter().map(|&(src, dst)| (src, dst, 1.0)).collect();
        Self::weighted(&weighted, num_nodes)
    }

    /// Weighted graph. Weights are checked later, when the adjacency
    /// matrix is built.
    ///
    /// # Errors
    /// - `NodeOutOfBounds` if any edge references a node >= num_nodes
    pub fn weighted(edges: &[(u32, u32, f64)], num_nodes: usize) -> CentralityResult<Self> {
        validate_edges(edges, num_nodes as u32)?;
        Ok(Self {
            num_nodes,
            edges: edges.to_vec(),
        })
    }

    pub fn edges(&self) -> &[(u32, u32, f64)] {
        &self.edges
    }
}

impl WalkGraph for EdgeListGraph {
    type NodeId = u32;

    fn is_directed(&self) -> bool {
        false
    }

    fn node_count(&self) -> usize {
        self.num_nodes
    }

    fn node_ids(&self) -> Vec<u32> {
        (0..self.num_nodes as u32).collect()
    }

    fn weighted_edges(&self) -> Vec<(usize, usize, f64)> {
        self.edges
            .iter()
            .map(|&(src, dst, weight)| (src as usize, dst as usize, weight))
            .collect()
    }

    fn is_connected(&self) -> bool {
        if self.num_nodes == 0 {
            return true;
        }

        let mut adj: Vec<Vec<usize>> = vec![vec![]; self.num_nodes];
        for &(src, dst, _) in &self.edges {
            adj[src as usize].push(dst as usize);
            adj[dst as usize].push(src as usize);
        }

        // BFS from node 0; connected iff every node gets visited
        let mut visited = vec![false; self.num_nodes];
        visited[0] = true;
        let mut reached = 1;
        let mut queue = VecDeque::from([0usize]);

        while let Some(v) = queue.pop_front() {
            for &w in &adj[v] {
                if !visited[w] {
                    visited[w] = true;
                    reached += 1;
                    queue.push_back(w);
                }
            }
        }

        reached == self.num_nodes
    }
}

// ============================================================================
// ADJACENCY MATRIX
// ============================================================================

/// Build the dense, symmetric, weighted adjacency matrix of an undirected
/// graph.
///
/// `A[i][j]` is the weight of the edge between positions `i` and `j`, 0 when
/// there is none. A self-loop of weight `w` puts `w` on the diagonal.
///
/// # Errors
/// - `NodeOutOfBounds` if an edge references a position >= node_count
/// - `InvalidWeight` for negative, NaN or infinite weights
/// - `UnsupportedGraphKind("multigraph")` if a node pair has two edges
pub fn adjacency_matrix<G: WalkGraph + ?Sized>(graph: &G) -> CentralityResult<DMatrix<f64>> {
    let n = graph.node_count();
    let mut adjacency = DMatrix::<f64>::zeros(n, n);
    let mut seen: HashSet<(usize, usize)> = HashSet::new();

    for (src, dst, weight) in graph.weighted_edges() {
        if src >= n || dst >= n {
            return Err(CentralityError::NodeOutOfBounds(src.max(dst) as u32, n as u32));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(CentralityError::InvalidWeight {
                from: src,
                to: dst,
                weight,
            });
        }
        if !seen.insert((src.min(dst), src.max(dst))) {
            return Err(CentralityError::UnsupportedGraphKind("multigraph".to_string()));
        }

        adjacency[(src, dst)] = weight;
        adjacency[(dst, src)] = weight;
    }

    Ok(adjacency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::{DiGraph, UnGraph};

    #[test]
    fn test_edge_list_node_out_of_bounds() {
        let result = EdgeListGraph::new(&[(0, 5)], 3);
        assert!(matches!(result, Err(CentralityError::NodeOutOfBounds(5, 3))));
    }

    #[test]
    fn test_edge_list_connectivity() {
        let path = EdgeListGraph::new(&[(0, 1), (1, 2)], 3).unwrap();
        assert!(path.is_connected());

        let split = EdgeListGraph::new(&[(0, 1), (2, 3)], 4).unwrap();
        assert!(!split.is_connected());

        let isolated = EdgeListGraph::new(&[(0, 1)], 3).unwrap();
        assert!(!isolated.is_connected());

        let single = EdgeListGraph::new(&[], 1).unwrap();
        assert!(single.is_connected());
    }

    #[test]
    fn test_petgraph_adapter() {
        let graph = UnGraph::<(), ()>::from_edges([(0, 1), (1, 2)]);
        assert!(!WalkGraph::is_directed(&graph));
        assert_eq!(WalkGraph::node_count(&graph), 3);
        assert_eq!(
            graph.node_ids(),
            vec![NodeIndex::new(0), NodeIndex::new(1), NodeIndex::new(2)]
        );
        assert_eq!(graph.weighted_edges(), vec![(0, 1, 1.0), (1, 2, 1.0)]);
        assert!(WalkGraph::is_connected(&graph));

        let directed = DiGraph::<(), ()>::from_edges([(0, 1)]);
        assert!(WalkGraph::is_directed(&directed));
    }

    #[test]
    fn test_petgraph_weights() {
        let graph = UnGraph::<(), u32>::from_edges([(0, 1, 3), (1, 2, 5)]);
        assert_eq!(graph.weighted_edges(), vec![(0, 1, 3.0), (1, 2, 5.0)]);
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let graph = EdgeListGraph::weighted(&[(0, 1, 2.0), (2, 1, 0.5)], 3).unwrap();
        let adjacency = adjacency_matrix(&graph).unwrap();

        assert_eq!(adjacency[(0, 1)], 2.0);
        assert_eq!(adjacency[(1, 0)], 2.0);
        assert_eq!(adjacency[(1, 2)], 0.5);
        assert_eq!(adjacency[(2, 1)], 0.5);
        assert_eq!(adjacency[(0, 2)], 0.0);
        assert_eq!(adjacency, adjacency.transpose());
    }

    #[test]
    fn test_adjacency_self_loop_on_diagonal() {
        let graph = EdgeListGraph::weighted(&[(0, 0, 1.5), (0, 1, 1.0)], 2).unwrap();
        let adjacency = adjacency_matrix(&graph).unwrap();
        assert_eq!(adjacency[(0, 0)], 1.5);
        assert_eq!(adjacency[(1, 1)], 0.0);
    }

    #[test]
    fn test_adjacency_rejects_negative_weight() {
        let graph = EdgeListGraph::weighted(&[(0, 1, -1.0)], 2).unwrap();
        let result = adjacency_matrix(&graph);
        assert!(matches!(
            result,
            Err(CentralityError::InvalidWeight { from: 0, to: 1, .. })
        ));
    }

    #[test]
    fn test_adjacency_rejects_nan_weight() {
        let graph = EdgeListGraph::weighted(&[(0, 1, f64::NAN)], 2).unwrap();
        assert!(matches!(
            adjacency_matrix(&graph),
            Err(CentralityError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_adjacency_rejects_parallel_edges() {
        // Same pair in either orientation counts as a duplicate
        let graph = EdgeListGraph::new(&[(0, 1), (1, 0)], 2).unwrap();
        assert!(matches!(
            adjacency_matrix(&graph),
            Err(CentralityError::UnsupportedGraphKind(kind)) if kind == "multigraph"
        ));
    }

    #[test]
    fn test_adjacency_empty_graph() {
        let graph = EdgeListGraph::new(&[], 0).unwrap();
        let adjacency = adjacency_matrix(&graph).unwrap();
        assert_eq!(adjacency.nrows(), 0);
    }
}
