//! hetiq-query: disease lookup and drug repurposing over HetioNet.
//!
//! Two engines answer the same two questions. [`GraphQueryEngine`] issues
//! one pattern query per call against a graph-native store;
//! [`DocumentQueryEngine`] reconstructs the same relationships from point
//! lookups and an application-side join. Their repurposing results are
//! allowed to differ, and [`compare`] reports how.

pub mod backend;
pub mod compare;
pub mod document_engine;
pub mod engine;
pub mod error;
pub mod graph_engine;
pub mod join;
pub mod output;

pub use backend::{EngineHandle, Source};
pub use compare::RepurposingComparison;
pub use document_engine::DocumentQueryEngine;
pub use engine::{DiseaseQueryEngine, EngineKind};
pub use error::QueryError;
pub use graph_engine::GraphQueryEngine;
pub use join::{JoinOutcome, JoinStats, OpposingRegulationJoin};
