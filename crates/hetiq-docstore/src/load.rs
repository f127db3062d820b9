//! Bulk load of a snapshot into MongoDB.

use hetiq_core::GraphSnapshot;
use mongodb::bson::{self, doc, Document};
use mongodb::IndexModel;

use crate::client::{DocumentError, MongoStore};
use crate::filter::Collection;

/// Options for [`MongoStore::load_snapshot`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Drop both collections first.
    pub clear_existing: bool,
    /// Documents per `insert_many` call.
    pub batch_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            clear_existing: true,
            batch_size: 10_000,
        }
    }
}

/// Counts reported by a load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub nodes_inserted: usize,
    pub edges_inserted: usize,
}

impl MongoStore {
    /// Insert every node and edge as a document, then build the indexes the
    /// document engine's lookups rely on.
    pub async fn load_snapshot(
        &self,
        snapshot: &GraphSnapshot,
        options: &LoadOptions,
    ) -> Result<LoadReport, DocumentError> {
        let batch_size = options.batch_size.max(1);

        if options.clear_existing {
            self.collection(Collection::Nodes).drop().await?;
            self.collection(Collection::Edges).drop().await?;
            tracing::info!("Existing collections dropped");
        }

        let mut report = LoadReport::default();

        for chunk in snapshot.nodes.chunks(batch_size) {
            let docs = to_documents(chunk)?;
            self.collection(Collection::Nodes).insert_many(docs).await?;
            report.nodes_inserted += chunk.len();
        }
        tracing::info!(nodes = report.nodes_inserted, "Nodes loaded into MongoDB");

        for chunk in snapshot.edges.chunks(batch_size) {
            let docs = to_documents(chunk)?;
            self.collection(Collection::Edges).insert_many(docs).await?;
            report.edges_inserted += chunk.len();
        }
        tracing::info!(edges = report.edges_inserted, "Edges loaded into MongoDB");

        for (collection, keys) in index_keys() {
            let model = IndexModel::builder().keys(keys).build();
            self.collection(collection).create_index(model).await?;
        }

        Ok(report)
    }
}

fn index_keys() -> Vec<(Collection, Document)> {
    vec![
        (Collection::Nodes, doc! { "id": 1 }),
        (Collection::Edges, doc! { "source": 1, "metaedge": 1 }),
        (Collection::Edges, doc! { "target": 1, "metaedge": 1 }),
    ]
}

fn to_documents<T: serde::Serialize>(items: &[T]) -> Result<Vec<Document>, DocumentError> {
    items
        .iter()
        .map(|item| {
            bson::to_document(item).map_err(|e| DocumentError::Serialization(e.to_string()))
        })
        .collect()
}
