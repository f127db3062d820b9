//! Bulk load of a snapshot into Neo4j.
//!
//! Every node becomes `(:Node {id, name, kind})` and every edge a
//! `[:RELATES {metaedge}]` relationship. Rows are sent in batches through
//! `UNWIND`; node batches run inside a transaction each.

use std::collections::HashMap;

use hetiq_core::{Edge, GraphSnapshot, Node};
use neo4rs::query;

use crate::client::{GraphClient, GraphError};

/// Options for [`GraphClient::load_snapshot`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Delete every existing node and relationship first.
    pub clear_existing: bool,
    /// Rows per UNWIND statement.
    pub batch_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            clear_existing: true,
            batch_size: 1_000,
        }
    }
}

/// Counts reported by a load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub nodes_created: usize,
    pub edges_created: usize,
    /// Edges whose source or target id matched no node.
    pub edges_skipped: usize,
}

impl GraphClient {
    /// Load all nodes, then all edges, of a snapshot.
    pub async fn load_snapshot(
        &self,
        snapshot: &GraphSnapshot,
        options: &LoadOptions,
    ) -> Result<LoadReport, GraphError> {
        let batch_size = options.batch_size.max(1);

        if options.clear_existing {
            self.run(query("MATCH (n) DETACH DELETE n")).await?;
            tracing::info!("Existing graph cleared");
        }

        self.run(query(
            "CREATE INDEX node_id IF NOT EXISTS FOR (n:Node) ON (n.id)",
        ))
        .await?;

        let mut report = LoadReport::default();

        for chunk in snapshot.nodes.chunks(batch_size) {
            let mut txn = self.start_txn().await?;
            let q = query(
                "UNWIND $rows AS row
                 CREATE (:Node {id: row.id, name: row.name, kind: row.kind})",
            )
            .param("rows", node_rows(chunk));
            txn.run(q).await?;
            txn.commit().await?;
            report.nodes_created += chunk.len();
        }
        tracing::info!(nodes = report.nodes_created, "Nodes loaded into Neo4j");

        for chunk in snapshot.edges.chunks(batch_size) {
            let q = query(
                "UNWIND $rows AS row
                 MATCH (s:Node {id: row.source})
                 MATCH (t:Node {id: row.target})
                 CREATE (s)-[:RELATES {metaedge: row.metaedge}]->(t)
                 RETURN count(*) AS created",
            )
            .param("rows", edge_rows(chunk));

            let created = match self.query_one(q).await? {
                Some(row) => row.get::<i64>("created").unwrap_or(0) as usize,
                None => 0,
            };
            report.edges_created += created;
            report.edges_skipped += chunk.len().saturating_sub(created);
        }
        tracing::info!(
            edges = report.edges_created,
            skipped = report.edges_skipped,
            "Edges loaded into Neo4j"
        );

        Ok(report)
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn node_rows(nodes: &[Node]) -> Vec<HashMap<String, String>> {
    nodes
        .iter()
        .map(|n| {
            HashMap::from([
                ("id".to_string(), n.id.clone()),
                ("name".to_string(), n.name.clone()),
                ("kind".to_string(), n.kind.as_str().to_string()),
            ])
        })
        .collect()
}

fn edge_rows(edges: &[Edge]) -> Vec<HashMap<String, String>> {
    edges
        .iter()
        .map(|e| {
            HashMap::from([
                ("source".to_string(), e.source.clone()),
                ("target".to_string(), e.target.clone()),
                ("metaedge".to_string(), e.metaedge.code().to_string()),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hetiq_core::{Metaedge, NodeKind};

    #[test]
    fn test_node_rows_use_stored_property_names() {
        let rows = node_rows(&[Node::new("Gene::1", "TP53", NodeKind::Gene)]);
        assert_eq!(rows[0]["id"], "Gene::1");
        assert_eq!(rows[0]["name"], "TP53");
        assert_eq!(rows[0]["kind"], "Gene");
    }

    #[test]
    fn test_edge_rows_store_metaedge_code() {
        let rows = edge_rows(&[Edge::new("A", Metaedge::AnatomyUpregulatesGene, "G")]);
        assert_eq!(rows[0]["metaedge"], "AuG");
        assert_eq!(rows[0]["source"], "A");
        assert_eq!(rows[0]["target"], "G");
    }

    #[test]
    fn test_default_options() {
        let options = LoadOptions::default();
        assert!(options.clear_existing);
        assert_eq!(options.batch_size, 1_000);
    }
}
