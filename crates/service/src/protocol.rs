use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::Error;
use bellman_ford_core::{Graph, ShortestPathSolver, collect_results};
use common::types::{Distance, VertexId, VertexResult, Weight};

/// Prefix of every non-JSON reply line.
pub const FALLBACK_PREFIX: &str = "Invalid request";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub to: VertexId,
    pub weight: Weight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub id: VertexId,
    pub edges: Vec<EdgeRecord>,
}

/// `{ "start": <int>, "vertices": [ { "id": <int>, "edges": [ { "to": <int>, "weight": <int> } ] } ] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRequest {
    pub start: VertexId,
    pub vertices: Vec<VertexRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexReport {
    pub id: VertexId,
    pub distance: Distance,
    #[serde(rename = "isInNegativeLoop")]
    pub is_in_negative_loop: bool,
}

impl From<VertexResult> for VertexReport {
    fn from(result: VertexResult) -> Self {
        Self {
            id: result.id,
            distance: result.distance,
            is_in_negative_loop: result.in_negative_loop,
        }
    }
}

/// `{ "vertices": [ { "id": <int>, "distance": <int>, "isInNegativeLoop": <bool> } ] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphResponse {
    pub vertices: Vec<VertexReport>,
}

impl GraphResponse {
    pub fn from_results(results: Vec<VertexResult>) -> Self {
        Self {
            vertices: results.into_iter().map(VertexReport::from).collect(),
        }
    }
}

impl GraphRequest {
    /// Builds the graph described by the request.
    ///
    /// All vertices are added first, in request order, then all edges. The
    /// finished graph is validated so a dangling edge is reported here rather
    /// than by the solver.
    pub fn into_graph(self) -> Result<(Graph, VertexId), Error> {
        let mut graph = Graph::with_capacity(self.vertices.len());

        for vertex in &self.vertices {
            graph.add_vertex(vertex.id)?;
        }
        for vertex in self.vertices {
            for edge in vertex.edges {
                graph.add_edge(vertex.id, edge.weight, edge.to)?;
            }
        }
        graph.validate()?;

        Ok((graph, self.start))
    }
}

pub fn decode_request(line: &str) -> Result<GraphRequest, Error> {
    Ok(serde_json::from_str(line.trim())?)
}

pub fn encode_response(response: &GraphResponse) -> Result<String, Error> {
    Ok(serde_json::to_string(response)?)
}

/// Human-readable reply sent instead of a JSON response.
pub fn fallback_reply(error: &Error) -> String {
    format!("{}: {}", FALLBACK_PREFIX, error)
}

/// Decodes one request line, solves it and encodes the response.
///
/// The solver only ever sees a completely decoded and validated graph.
pub fn process_request<S: ShortestPathSolver>(line: &str, solver: &S) -> Result<String, Error> {
    let request = decode_request(line)?;
    let (mut graph, start) = request.into_graph()?;
    debug!(
        vertices = graph.num_vertices(),
        edges = graph.num_edges(),
        start,
        "Decoded graph request"
    );

    let summary = solver.solve(&mut graph, start)?;
    info!(
        passes = summary.passes,
        relaxations = summary.relaxations,
        flagged = summary.flagged,
        "Shortest paths computed"
    );

    encode_response(&GraphResponse::from_results(collect_results(&graph)))
}

/// Like [`process_request`], but never fails: errors become a fallback line.
pub fn handle_request<S: ShortestPathSolver>(line: &str, solver: &S) -> String {
    match process_request(line, solver) {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Rejecting request: {}", e);
            fallback_reply(&e)
        }
    }
}
