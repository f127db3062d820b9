//! Human-readable rendering of query results.

use std::collections::BTreeSet;

use hetiq_core::DiseaseInfo;

use crate::compare::RepurposingComparison;
use crate::join::JoinStats;

pub const NOT_FOUND: &str = "Disease ID not found.";

/// Names joined by ", ", or "None" for an empty set.
pub fn join_or_none(names: &BTreeSet<String>) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

pub fn render_disease_info(info: Option<&DiseaseInfo>) -> String {
    match info {
        None => NOT_FOUND.to_string(),
        Some(info) => [
            format!("Disease Name: {}", info.disease_name),
            format!("Drugs that can treat or palliate: {}", join_or_none(&info.drugs)),
            format!("Genes that cause this disease: {}", join_or_none(&info.genes)),
            format!("Where this disease occurs: {}", join_or_none(&info.anatomy)),
        ]
        .join("\n"),
    }
}

pub fn render_candidates(candidates: &BTreeSet<String>) -> String {
    format!("Potential drugs for the disease: {}", join_or_none(candidates))
}

pub fn render_join_stats(stats: &JoinStats) -> String {
    format!(
        "Join: {} compound edges, {} confirmed, {} point lookups \
         ({} anatomy, {} treatment, {} name)",
        stats.compound_edges,
        stats.confirmed,
        stats.total_probes(),
        stats.anatomy_probes,
        stats.treatment_probes,
        stats.name_lookups
    )
}

pub fn render_comparison(comparison: &RepurposingComparison) -> String {
    let mut lines = vec![
        format!("Found by both engines: {}", join_or_none(&comparison.shared)),
        format!("Graph engine only: {}", join_or_none(&comparison.graph_only)),
        format!("Document engine only: {}", join_or_none(&comparison.document_only)),
    ];
    if comparison.diverges() {
        lines.push("Engines disagree; repurposing is anchored differently in each.".to_string());
    }
    lines.join("\n")
}
