use csv::ReaderBuilder;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use tracing::{error, info};

use super::error::Error;
use bellman_ford_core::Graph;
use common::types::{VertexId, Weight};

// Helper struct for CSV parsing
#[derive(Debug, Deserialize, Default)]
pub struct CsvRecord {
    #[serde(rename = "from")]
    pub from_vertex: VertexId,

    #[serde(rename = "to")]
    pub to_vertex: VertexId,

    #[serde(rename = "weight")]
    pub weight: Weight,
}

/// Loads a graph from a `from,to,weight` edge list.
///
/// Vertices are created in order of first appearance (in `from`, then `to`
/// of each row), so every edge target exists by construction.
pub struct CsvGraphLoader {
    path: PathBuf,
}

impl CsvGraphLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvGraphLoader { path: path.into() }
    }

    pub fn load(&self) -> Result<Graph, Error> {
        let file = File::open(&self.path).map_err(|e| {
            error!("Failed to read file {}: {:?}", self.path.display(), e);
            Error::IoError(e)
        })?;

        let graph = parse_edge_list(file)?;
        info!(
            "CsvGraphLoader: Loaded {} vertices and {} edges from {}",
            graph.num_vertices(),
            graph.num_edges(),
            self.path.display()
        );
        Ok(graph)
    }
}

pub fn parse_edge_list<R: Read>(reader: R) -> Result<Graph, Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut graph = Graph::new();

    for result in rdr.deserialize() {
        let record: CsvRecord = result?;
        for id in [record.from_vertex, record.to_vertex] {
            if !graph.contains_vertex(id) {
                graph.add_vertex(id)?;
            }
        }
        graph.add_edge(record.from_vertex, record.weight, record.to_vertex)?;
    }
    Ok(graph)
}
