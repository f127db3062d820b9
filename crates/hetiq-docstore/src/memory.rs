//! In-memory document store with probe accounting.
//!
//! Holds BSON documents exactly as they would sit in MongoDB and evaluates
//! [`Filter`]s against them. Equality and membership conditions on `id`,
//! `source`, and `target` are answered from a hash index; everything else
//! is a scan. Every call is counted so callers can observe how many
//! round trips an algorithm would cost against a real server.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use hetiq_core::GraphSnapshot;
use mongodb::bson::{self, Document};

use crate::client::DocumentError;
use crate::filter::{Collection, Condition, Filter};
use crate::store::DocumentStore;

const INDEXED_FIELDS: [&str; 3] = ["id", "source", "target"];

/// Number of store calls issued, by operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeCounts {
    pub find_one: usize,
    pub find: usize,
}

impl ProbeCounts {
    pub fn total(&self) -> usize {
        self.find_one + self.find
    }
}

#[derive(Default)]
struct CollectionData {
    documents: Vec<Document>,
    /// (field, value) → positions in `documents`.
    index: HashMap<(&'static str, String), Vec<usize>>,
}

impl CollectionData {
    fn push(&mut self, document: Document) {
        let position = self.documents.len();
        for field in INDEXED_FIELDS {
            if let Ok(value) = document.get_str(field) {
                self.index
                    .entry((field, value.to_string()))
                    .or_default()
                    .push(position);
            }
        }
        self.documents.push(document);
    }

    /// Candidate positions narrowed by the first indexed clause, in
    /// insertion order.
    fn candidates(&self, filter: &Filter) -> Vec<usize> {
        let indexed = filter.clauses().iter().find_map(|(field, condition)| {
            INDEXED_FIELDS
                .iter()
                .find(|f| **f == field.as_str())
                .map(|f| (*f, condition))
        });

        match indexed {
            Some((field, condition)) => {
                let values: Vec<&String> = match condition {
                    Condition::Eq(v) => vec![v],
                    Condition::In(vs) => vs.iter().collect(),
                };
                let positions: BTreeSet<usize> = values
                    .into_iter()
                    .filter_map(|v| self.index.get(&(field, v.clone())))
                    .flatten()
                    .copied()
                    .collect();
                positions.into_iter().collect()
            }
            None => (0..self.documents.len()).collect(),
        }
    }

    fn matching<'a>(&'a self, filter: &'a Filter) -> impl Iterator<Item = &'a Document> + 'a {
        self.candidates(filter)
            .into_iter()
            .map(move |position| &self.documents[position])
            .filter(move |document| filter.matches(document))
    }
}

/// A document store held entirely in memory.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    nodes: CollectionData,
    edges: CollectionData,
    find_one_calls: AtomicUsize,
    find_calls: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store every node and edge of a snapshot as a document.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self, DocumentError> {
        let mut store = Self::new();
        for node in &snapshot.nodes {
            store.insert(Collection::Nodes, to_document(node)?);
        }
        for edge in &snapshot.edges {
            store.insert(Collection::Edges, to_document(edge)?);
        }
        tracing::debug!(
            nodes = store.len(Collection::Nodes),
            edges = store.len(Collection::Edges),
            "In-memory document store built"
        );
        Ok(store)
    }

    /// Insert a raw document. Nothing is validated.
    pub fn insert(&mut self, collection: Collection, document: Document) {
        self.data_mut(collection).push(document);
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.data(collection).documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.documents.is_empty() && self.edges.documents.is_empty()
    }

    /// Calls issued since construction or the last reset.
    pub fn probe_counts(&self) -> ProbeCounts {
        ProbeCounts {
            find_one: self.find_one_calls.load(Ordering::Relaxed),
            find: self.find_calls.load(Ordering::Relaxed),
        }
    }

    pub fn reset_probe_counts(&self) {
        self.find_one_calls.store(0, Ordering::Relaxed);
        self.find_calls.store(0, Ordering::Relaxed);
    }

    fn data(&self, collection: Collection) -> &CollectionData {
        match collection {
            Collection::Nodes => &self.nodes,
            Collection::Edges => &self.edges,
        }
    }

    fn data_mut(&mut self, collection: Collection) -> &mut CollectionData {
        match collection {
            Collection::Nodes => &mut self.nodes,
            Collection::Edges => &mut self.edges,
        }
    }
}

fn to_document<T: serde::Serialize>(value: &T) -> Result<Document, DocumentError> {
    bson::to_document(value).map_err(|e| DocumentError::Serialization(e.to_string()))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, DocumentError> {
        self.find_one_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.data(collection).matching(filter).next().cloned())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, DocumentError> {
        self.find_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.data(collection).matching(filter).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hetiq_core::{Edge, Metaedge, Node, NodeKind};
    use mongodb::bson::doc;

    fn store() -> InMemoryDocumentStore {
        InMemoryDocumentStore::from_snapshot(&GraphSnapshot {
            nodes: vec![
                Node::new("D1", "flu", NodeKind::Disease),
                Node::new("G1", "IFNG", NodeKind::Gene),
                Node::new("G2", "IL6", NodeKind::Gene),
            ],
            edges: vec![
                Edge::new("D1", Metaedge::DiseaseUpregulatesGene, "G1"),
                Edge::new("D1", Metaedge::DiseaseDownregulatesGene, "G2"),
                Edge::new("D1", Metaedge::DiseaseDownregulatesGene, "G2"),
                Edge::new("D1", Metaedge::DiseaseLocalizesAnatomy, "A1"),
            ],
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_one_by_id() {
        let store = store();
        let found = store
            .find_one(Collection::Nodes, &Filter::new().eq("id", "G2"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("name").unwrap(), "IL6");

        let missing = store
            .find_one(Collection::Nodes, &Filter::new().eq("id", "G9"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_keeps_duplicates_and_order() {
        let store = store();
        let filter = Filter::new()
            .eq("source", "D1")
            .any_of("metaedge", ["DdG", "DuG"]);
        let found = store.find(Collection::Edges, &filter).await.unwrap();
        let targets: Vec<&str> = found.iter().map(|d| d.get_str("target").unwrap()).collect();
        assert_eq!(targets, vec!["G1", "G2", "G2"]);
    }

    #[tokio::test]
    async fn test_membership_on_indexed_field() {
        let store = store();
        let filter = Filter::new().any_of("target", ["G1", "A1", "nope"]);
        let found = store.find(Collection::Edges, &filter).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_unindexed_filter_scans() {
        let store = store();
        let found = store
            .find(Collection::Edges, &Filter::new().eq("metaedge", "DlA"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_probe_counts() {
        let store = store();
        let filter = Filter::new().eq("id", "D1");
        store.find_one(Collection::Nodes, &filter).await.unwrap();
        store.find_one(Collection::Nodes, &filter).await.unwrap();
        store.find(Collection::Edges, &Filter::new()).await.unwrap();

        assert_eq!(
            store.probe_counts(),
            ProbeCounts {
                find_one: 2,
                find: 1
            }
        );
        assert_eq!(store.probe_counts().total(), 3);

        store.reset_probe_counts();
        assert_eq!(store.probe_counts().total(), 0);
    }

    #[test]
    fn test_raw_insert_is_not_validated() {
        let mut store = InMemoryDocumentStore::new();
        assert!(store.is_empty());
        store.insert(Collection::Nodes, doc! { "id": "X" });
        assert_eq!(store.len(Collection::Nodes), 1);
    }
}
