pub mod csr;
pub mod graph;
pub mod solver;
pub mod traits;

pub use csr::GraphCSR;
pub use graph::{Edge, Graph, Vertex};
pub use solver::{BellmanFordSolver, NegativeLoopDetection};
pub use traits::ShortestPathSolver;

use common::{
    error::Error,
    types::{VertexId, VertexResult},
};

/// Runs Bellman-Ford over `graph` from `start` and returns one result per
/// vertex, in the graph's insertion order.
///
/// The graph is consumed: every request builds its own graph and discards it
/// afterwards.
pub fn compute_shortest_paths(
    mut graph: Graph,
    start: VertexId,
    detection: NegativeLoopDetection,
) -> Result<Vec<VertexResult>, Error> {
    BellmanFordSolver::new(detection).solve(&mut graph, start)?;
    Ok(collect_results(&graph))
}

/// Snapshot of the per-vertex solver state of `graph`.
pub fn collect_results(graph: &Graph) -> Vec<VertexResult> {
    graph
        .vertices()
        .iter()
        .map(|v| VertexResult {
            id: v.id(),
            distance: v.distance_from_start(),
            in_negative_loop: v.in_negative_loop(),
        })
        .collect()
}
