//! Side-by-side repurposing results from both engines.
//!
//! The engines anchor repurposing differently (anatomy first versus disease
//! genes first), so disagreement is expected. This module only reports it.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::engine::DiseaseQueryEngine;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepurposingComparison {
    pub disease_id: String,
    pub shared: BTreeSet<String>,
    pub graph_only: BTreeSet<String>,
    pub document_only: BTreeSet<String>,
}

impl RepurposingComparison {
    pub fn between(
        disease_id: &str,
        graph: &BTreeSet<String>,
        document: &BTreeSet<String>,
    ) -> Self {
        Self {
            disease_id: disease_id.to_string(),
            shared: graph.intersection(document).cloned().collect(),
            graph_only: graph.difference(document).cloned().collect(),
            document_only: document.difference(graph).cloned().collect(),
        }
    }

    pub fn diverges(&self) -> bool {
        !self.graph_only.is_empty() || !self.document_only.is_empty()
    }
}

/// Run repurposing on both engines, graph first.
pub async fn compare_engines(
    graph: &dyn DiseaseQueryEngine,
    document: &dyn DiseaseQueryEngine,
    disease_id: &str,
) -> Result<RepurposingComparison> {
    let from_graph = graph.repurposing_candidates(disease_id).await?;
    let from_document = document.repurposing_candidates(disease_id).await?;

    let comparison = RepurposingComparison::between(disease_id, &from_graph, &from_document);
    tracing::info!(
        disease_id,
        shared = comparison.shared.len(),
        graph_only = comparison.graph_only.len(),
        document_only = comparison.document_only.len(),
        "Engines compared"
    );
    Ok(comparison)
}
