use thiserror::Error;

use common::error::Error as GraphModelError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigLoadError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed request: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Graph processing error: {0}")]
    GraphError(#[from] GraphModelError),

    #[error("Request line exceeds the {0} byte limit.")]
    LineTooLong(usize),

    #[error("Operation timed out after {0} ms.")]
    Timeout(u64),

    #[error("Solver task failed: {0}")]
    SolverTaskFailed(String),

    #[error("Peer closed the connection without replying.")]
    EmptyReply,
}
