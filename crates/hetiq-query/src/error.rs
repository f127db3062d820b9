//! Error types for the hetiq-query crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Graph error: {0}")]
    Graph(#[from] hetiq_graph::GraphError),

    #[error("Document store error: {0}")]
    Document(#[from] hetiq_docstore::DocumentError),

    #[error("{0}")]
    Core(#[from] hetiq_core::CoreError),

    #[error("No snapshot configured: pass --nodes and --edges or set [snapshot] in config")]
    MissingSnapshot,
}

pub type Result<T> = std::result::Result<T, QueryError>;
