/// Identifier of a vertex, unique within one graph.
pub type VertexId = i32;

/// Signed edge weight. Negative weights are allowed.
pub type Weight = i32;

/// Tracked distance from the start vertex.
pub type Distance = i32;

/// Distance accumulated while a solver runs.
///
/// Wider than [`Distance`] so a vertex on a reachable negative cycle keeps
/// improving well past `Distance::MIN`; it is narrowed when written back.
pub type WideDistance = i64;

/// Distance of a vertex no path has reached yet.
///
/// Serialized verbatim, so a client sees `2147483647` for unreached vertices.
pub const UNREACHABLE: Distance = Distance::MAX;

/// Final state of one vertex after a solver run.
///
/// Fields:
/// - `id`: The vertex identifier.
/// - `distance`: Shortest known distance from the start, or [`UNREACHABLE`].
/// - `in_negative_loop`: Set when the negative-loop detection flagged the vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexResult {
    pub id: VertexId,
    pub distance: Distance,
    pub in_negative_loop: bool,
}

impl VertexResult {
    /// Returns true if a path from the start reached this vertex.
    pub fn is_reachable(&self) -> bool {
        self.distance != UNREACHABLE
    }
}

/// Bookkeeping reported by a solver run.
///
/// Fields:
/// - `passes`: Number of full relaxation passes executed, detection pass included.
/// - `relaxations`: Number of successful distance updates across all passes.
/// - `flagged`: Number of vertices marked as being in a negative loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveSummary {
    pub passes: usize,
    pub relaxations: usize,
    pub flagged: usize,
}

impl SolveSummary {
    /// Returns true if the run found evidence of a reachable negative cycle.
    pub fn has_negative_loop(&self) -> bool {
        self.flagged > 0
    }
}
