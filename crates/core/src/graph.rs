use std::collections::HashMap;
use std::collections::hash_map::Entry;

use common::error::Error;
use common::types::{Distance, UNREACHABLE, VertexId, Weight};

/// Directed, weighted edge owned by its source vertex.
///
/// `target` is a lookup key into the same graph, not an ownership relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub weight: Weight,
    pub target: VertexId,
}

/// A vertex together with its outgoing edges and solver state.
///
/// `distance_from_start` and `in_negative_loop` are written only by the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    id: VertexId,
    distance_from_start: Distance,
    in_negative_loop: bool,
    edges: Vec<Edge>,
}

impl Vertex {
    fn new(id: VertexId) -> Self {
        Self {
            id,
            distance_from_start: UNREACHABLE,
            in_negative_loop: false,
            edges: Vec::new(),
        }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn distance_from_start(&self) -> Distance {
        self.distance_from_start
    }

    pub fn in_negative_loop(&self) -> bool {
        self.in_negative_loop
    }

    /// Outgoing edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn set_distance_from_start(&mut self, distance: Distance) {
        self.distance_from_start = distance;
    }

    /// The flag is sticky: once set it is never cleared.
    pub(crate) fn mark_in_negative_loop(&mut self) {
        self.in_negative_loop = true;
    }
}

/// Directed weighted graph keyed by vertex id.
///
/// Vertices are kept in insertion order, which is also the order the solver
/// relaxes them in and the order results are reported in. `index` maps a
/// vertex id to its position in `vertices`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    vertices: Vec<Vertex>,
    index: HashMap<VertexId, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(num_vertices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            index: HashMap::with_capacity(num_vertices),
        }
    }

    /// Inserts a vertex with no outgoing edges.
    ///
    /// # Errors
    /// Returns `Error::DuplicateVertex` if `id` is already present.
    pub fn add_vertex(&mut self, id: VertexId) -> Result<(), Error> {
        match self.index.entry(id) {
            Entry::Occupied(_) => Err(Error::DuplicateVertex(id)),
            Entry::Vacant(slot) => {
                slot.insert(self.vertices.len());
                self.vertices.push(Vertex::new(id));
                Ok(())
            }
        }
    }

    /// Appends the edge `from --weight--> to` to the outgoing list of `from`.
    ///
    /// The target is not checked here; see [`Graph::validate`].
    ///
    /// # Errors
    /// Returns `Error::VertexNotFound` if `from` is not present.
    pub fn add_edge(&mut self, from: VertexId, weight: Weight, to: VertexId) -> Result<(), Error> {
        let vertex = self.get_vertex_mut(from)?;
        vertex.edges.push(Edge { weight, target: to });
        Ok(())
    }

    /// # Errors
    /// Returns `Error::VertexNotFound` if `id` is not present.
    pub fn get_vertex(&self, id: VertexId) -> Result<&Vertex, Error> {
        self.index_of(id)
            .map(|idx| &self.vertices[idx])
            .ok_or(Error::VertexNotFound(id))
    }

    pub(crate) fn get_vertex_mut(&mut self, id: VertexId) -> Result<&mut Vertex, Error> {
        let idx = self.index_of(id).ok_or(Error::VertexNotFound(id))?;
        Ok(&mut self.vertices[idx])
    }

    /// Position of `id` in insertion order.
    pub fn index_of(&self, id: VertexId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.index.contains_key(&id)
    }

    /// All vertices, in insertion order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.vertices.iter().map(|v| v.edges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Checks that every edge targets a vertex of this graph.
    ///
    /// # Errors
    /// Returns `Error::DanglingEdge` for the first offending edge, scanning
    /// vertices and edges in insertion order.
    pub fn validate(&self) -> Result<(), Error> {
        for vertex in &self.vertices {
            for edge in &vertex.edges {
                if !self.contains_vertex(edge.target) {
                    return Err(Error::DanglingEdge {
                        from: vertex.id,
                        to: edge.target,
                    });
                }
            }
        }
        Ok(())
    }
}
