use thiserror::Error;

use crate::types::VertexId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested start vertex is not part of the graph.
    #[error("Start vertex {0} is not present in the graph.")]
    InvalidStartVertex(VertexId),

    /// An edge points at a vertex id the graph does not contain.
    #[error("Edge {from} -> {to} references a vertex that is not present in the graph.")]
    DanglingEdge { from: VertexId, to: VertexId },

    /// A vertex id was inserted twice while building a graph.
    #[error("Vertex {0} is already present in the graph.")]
    DuplicateVertex(VertexId),

    /// Lookup of a vertex id that does not exist.
    #[error("Vertex {0} was not found in the graph.")]
    VertexNotFound(VertexId),
}
