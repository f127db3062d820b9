//! The document-store interface and typed decoding of its documents.

use async_trait::async_trait;
use hetiq_core::{Edge, Node};
use mongodb::bson::{self, Document};

use crate::client::DocumentError;
use crate::filter::{Collection, Filter};

/// Point lookups and filtered scans over the `nodes` and `edges` collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// First document matching `filter`, if any.
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, DocumentError>;

    /// Every document matching `filter`.
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, DocumentError>;
}

/// Decode a node document. Documents missing `id`, `name`, or `kind` decode
/// to `None` and are treated as absent.
pub fn decode_node(document: Document) -> Option<Node> {
    match bson::from_document::<Node>(document) {
        Ok(node) => Some(node),
        Err(e) => {
            tracing::debug!(error = %e, "Skipping malformed node document");
            None
        }
    }
}

/// Decode an edge document, `None` when malformed.
pub fn decode_edge(document: Document) -> Option<Edge> {
    match bson::from_document::<Edge>(document) {
        Ok(edge) => Some(edge),
        Err(e) => {
            tracing::debug!(error = %e, "Skipping malformed edge document");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hetiq_core::{Metaedge, NodeKind};
    use mongodb::bson::{doc, oid::ObjectId};

    #[test]
    fn test_decode_node_ignores_object_id() {
        let node = decode_node(doc! {
            "_id": ObjectId::new(),
            "id": "Gene::5243",
            "name": "ABCB1",
            "kind": "Gene",
        })
        .unwrap();
        assert_eq!(node.kind, NodeKind::Gene);
        assert_eq!(node.name, "ABCB1");
    }

    #[test]
    fn test_decode_edge() {
        let edge = decode_edge(doc! { "source": "C", "metaedge": "CdG", "target": "G" }).unwrap();
        assert_eq!(edge.metaedge, Metaedge::CompoundDownregulatesGene);
    }

    #[test]
    fn test_malformed_documents_decode_to_none() {
        assert!(decode_node(doc! { "id": "x", "kind": "Gene" }).is_none());
        assert!(decode_edge(doc! { "source": "C", "target": 7 }).is_none());
    }
}
