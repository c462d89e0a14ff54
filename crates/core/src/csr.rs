use std::ops::Range;

use common::error::Error;
use common::types::{VertexId, Weight};

use crate::graph::Graph;

/// Index-resolved view of a [`Graph`] in Compressed Sparse Row (CSR) format.
///
/// CSR format stores outgoing edges of each node contiguously in memory:
/// - `node_pointers[u]..node_pointers[u+1]` -> edges from node `u`
/// - `edge_targets[i]` -> target node index of edge `i`
/// - `edge_weights[i]` -> weight of edge `i`
/// - `vertex_ids[u]` -> graph vertex id of node `u`
///
/// Node `u` is the `u`-th vertex of the graph in insertion order and the edges
/// of each node keep their insertion order, so iterating the CSR visits edges
/// in exactly the order the graph holds them. Building the view resolves every
/// target id once, which is where dangling edges are caught.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphCSR {
    pub num_nodes: usize,
    pub node_pointers: Vec<usize>,
    pub edge_targets: Vec<usize>,
    pub edge_weights: Vec<Weight>,
    pub vertex_ids: Vec<VertexId>,
}

impl GraphCSR {
    /// Builds the CSR view of `graph`.
    ///
    /// # Errors
    /// Returns `Error::DanglingEdge` for the first edge (in insertion order)
    /// whose target id is not a vertex of `graph`.
    pub fn from_graph(graph: &Graph) -> Result<Self, Error> {
        let num_nodes = graph.num_vertices();
        let num_edges = graph.num_edges();

        let mut node_pointers = Vec::with_capacity(num_nodes + 1);
        let mut edge_targets = Vec::with_capacity(num_edges);
        let mut edge_weights = Vec::with_capacity(num_edges);
        let mut vertex_ids = Vec::with_capacity(num_nodes);

        node_pointers.push(0);
        for vertex in graph.vertices() {
            for edge in vertex.edges() {
                let target = graph.index_of(edge.target).ok_or(Error::DanglingEdge {
                    from: vertex.id(),
                    to: edge.target,
                })?;
                edge_targets.push(target);
                edge_weights.push(edge.weight);
            }
            node_pointers.push(edge_targets.len());
            vertex_ids.push(vertex.id());
        }

        Ok(Self {
            num_nodes,
            node_pointers,
            edge_targets,
            edge_weights,
            vertex_ids,
        })
    }

    pub fn num_edges(&self) -> usize {
        self.edge_targets.len()
    }

    /// CSR indices of the outgoing edges of node `u`.
    pub fn out_edges(&self, u: usize) -> Range<usize> {
        self.node_pointers[u]..self.node_pointers[u + 1]
    }
}
