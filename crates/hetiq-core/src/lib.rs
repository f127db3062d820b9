//! hetiq-core: Shared types, configuration, and error handling for hetiq.
//!
//! This crate provides the foundational types used by both query engines:
//! - Node kinds (Disease, Compound, Gene, Anatomy, ...) of the knowledge graph
//! - Metaedge codes (CtD, DlA, AdG, ...) for typed relations
//! - Result types returned by disease lookups
//! - Layered configuration
//! - TSV parsing of node and edge files

pub mod config;
pub mod error;
pub mod tsv;
pub mod types;

pub use error::CoreError;
pub use types::{DiseaseInfo, Edge, GraphSnapshot, Metaedge, Node, NodeKind};
