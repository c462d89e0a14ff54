use super::graph::Graph;
use common::{
    error::Error,
    types::{SolveSummary, VertexId},
};

/// Trait for single-source shortest-path solvers that write their results
/// back into the graph they are given.
pub trait ShortestPathSolver {
    /// Computes distances from `start` and stores them on the vertices of `graph`.
    ///
    /// Returns `Ok(summary)` on success or `Err(e)` when the graph or start
    /// vertex is invalid, in which case `graph` is left untouched.
    fn solve(&self, graph: &mut Graph, start: VertexId) -> Result<SolveSummary, Error>;
}
