//! The contract shared by both query engines.

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use hetiq_core::DiseaseInfo;
use serde::Serialize;

use crate::error::Result;

/// Which engine produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Native multi-hop pattern matching.
    Graph,
    /// Point lookups and scans, joined in application code.
    Document,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graph => f.write_str("graph"),
            Self::Document => f.write_str("document"),
        }
    }
}

/// Disease lookup and repurposing search over one backend.
///
/// Both operations are read-only and idempotent. The two implementations
/// share this contract but not their strategy, and their repurposing
/// results are allowed to differ.
#[async_trait]
pub trait DiseaseQueryEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Name, treating compounds, causative genes, and anatomy of a disease.
    /// `Ok(None)` when the id is unknown.
    async fn disease_info(&self, disease_id: &str) -> Result<Option<DiseaseInfo>>;

    /// Names of compounds inferred to be repurposable for the disease.
    /// Empty, not an error, when nothing qualifies or the id is unknown.
    async fn repurposing_candidates(&self, disease_id: &str) -> Result<BTreeSet<String>>;
}
