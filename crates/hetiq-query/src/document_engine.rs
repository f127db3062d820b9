//! Disease queries answered by point lookups against a document store.
//!
//! Nodes and edges live in two flat collections. Every relationship is an
//! edge scan keyed on the disease id followed by one name lookup per
//! distinct neighbour. Repurposing delegates the cross-entity reasoning to
//! [`OpposingRegulationJoin`].

use std::collections::BTreeSet;
use std::time::Instant;

use async_trait::async_trait;
use hetiq_core::{DiseaseInfo, Metaedge};
use hetiq_docstore::{
    decode_edge, decode_node, Collection, DocumentConfig, DocumentStore, Filter, MongoStore,
};

use crate::engine::{DiseaseQueryEngine, EngineKind};
use crate::error::Result;
use crate::join::{CompoundGeneEdge, JoinOutcome, OpposingRegulationJoin};

/// Which end of an edge the disease sits on.
#[derive(Debug, Clone, Copy)]
enum Side {
    Source,
    Target,
}

impl Side {
    fn field(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

/// Query engine over a document store.
pub struct DocumentQueryEngine<S> {
    store: S,
}

impl<S: DocumentStore> DocumentQueryEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Repurposing with the join's probe accounting attached.
    ///
    /// This is a brute-force nested-loop join issued as individual store
    /// calls. Expect it to be orders of magnitude slower than the graph
    /// engine on a full HetioNet load.
    pub async fn repurposing_with_stats(&self, disease_id: &str) -> Result<JoinOutcome> {
        let start = Instant::now();

        let genes = self
            .neighbour_ids(
                disease_id,
                Side::Source,
                &[
                    Metaedge::DiseaseUpregulatesGene,
                    Metaedge::DiseaseDownregulatesGene,
                ],
            )
            .await?;
        let anatomy: Vec<String> = self
            .neighbour_ids(disease_id, Side::Source, &[Metaedge::DiseaseLocalizesAnatomy])
            .await?
            .into_iter()
            .collect();

        if genes.is_empty() || anatomy.is_empty() {
            tracing::debug!(
                disease_id,
                genes = genes.len(),
                anatomy = anatomy.len(),
                "Nothing to join"
            );
            return Ok(JoinOutcome::default());
        }

        let filter = Filter::new().any_of("target", genes.iter().cloned()).any_of(
            "metaedge",
            [
                Metaedge::CompoundUpregulatesGene.code(),
                Metaedge::CompoundDownregulatesGene.code(),
            ],
        );
        let compound_edges: Vec<CompoundGeneEdge> = self
            .store
            .find(Collection::Edges, &filter)
            .await?
            .into_iter()
            .filter_map(decode_edge)
            .filter_map(|edge| CompoundGeneEdge::from_edge(&edge))
            .collect();

        tracing::warn!(
            disease_id,
            genes = genes.len(),
            anatomy = anatomy.len(),
            compound_edges = compound_edges.len(),
            "Running brute-force opposing-regulation join; this is slow on large graphs"
        );

        let outcome = OpposingRegulationJoin::new(&self.store, disease_id, &anatomy)
            .run(&compound_edges)
            .await?;

        tracing::debug!(
            disease_id,
            candidates = outcome.candidates.len(),
            probes = outcome.stats.total_probes(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Document repurposing computed"
        );
        Ok(outcome)
    }

    /// Distinct ids at the other end of `metaedges` edges touching the disease.
    async fn neighbour_ids(
        &self,
        disease_id: &str,
        side: Side,
        metaedges: &[Metaedge],
    ) -> Result<BTreeSet<String>> {
        let filter = Filter::new()
            .eq(side.field(), disease_id)
            .any_of("metaedge", metaedges.iter().map(|m| m.code().to_string()));

        let ids = self
            .store
            .find(Collection::Edges, &filter)
            .await?
            .into_iter()
            .filter_map(decode_edge)
            .map(|edge| match side {
                Side::Source => edge.target,
                Side::Target => edge.source,
            })
            .collect();
        Ok(ids)
    }

    /// Name of a node, `None` when absent or malformed.
    async fn node_name(&self, id: &str) -> Result<Option<String>> {
        let document = self
            .store
            .find_one(Collection::Nodes, &Filter::new().eq("id", id))
            .await?;
        Ok(document.and_then(decode_node).map(|node| node.name))
    }

    /// Names of the given ids, skipping ids with no node.
    async fn names_of(&self, ids: BTreeSet<String>) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for id in ids {
            match self.node_name(&id).await? {
                Some(name) => {
                    names.insert(name);
                }
                None => tracing::debug!(node_id = %id, "Dangling edge target skipped"),
            }
        }
        Ok(names)
    }
}

impl DocumentQueryEngine<MongoStore> {
    /// Connect to MongoDB. Fails fast when the server is unreachable.
    pub async fn connect(config: &DocumentConfig) -> Result<Self> {
        Ok(Self::new(MongoStore::connect(config).await?))
    }

    /// Close every pooled connection.
    pub async fn close(self) {
        self.store.shutdown().await;
    }
}

#[async_trait]
impl<S: DocumentStore> DiseaseQueryEngine for DocumentQueryEngine<S> {
    fn kind(&self) -> EngineKind {
        EngineKind::Document
    }

    async fn disease_info(&self, disease_id: &str) -> Result<Option<DiseaseInfo>> {
        let start = Instant::now();

        let Some(disease_name) = self.node_name(disease_id).await? else {
            tracing::debug!(disease_id, "Disease not found");
            return Ok(None);
        };

        let ctd = [Metaedge::CompoundTreatsDisease];
        let mut drug_ids = self.neighbour_ids(disease_id, Side::Source, &ctd).await?;
        drug_ids.extend(self.neighbour_ids(disease_id, Side::Target, &ctd).await?);

        let gene_ids = self
            .neighbour_ids(
                disease_id,
                Side::Source,
                &[Metaedge::DiseaseDownregulatesGene],
            )
            .await?;
        let anatomy_ids = self
            .neighbour_ids(
                disease_id,
                Side::Source,
                &[Metaedge::DiseaseLocalizesAnatomy],
            )
            .await?;

        let info = DiseaseInfo {
            disease_id: disease_id.to_string(),
            disease_name,
            drugs: self.names_of(drug_ids).await?,
            genes: self.names_of(gene_ids).await?,
            anatomy: self.names_of(anatomy_ids).await?,
        };

        tracing::debug!(
            disease_id,
            drugs = info.drugs.len(),
            genes = info.genes.len(),
            anatomy = info.anatomy.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Document disease info computed"
        );
        Ok(Some(info))
    }

    async fn repurposing_candidates(&self, disease_id: &str) -> Result<BTreeSet<String>> {
        Ok(self.repurposing_with_stats(disease_id).await?.candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hetiq_core::{Edge, GraphSnapshot, Node, NodeKind};
    use hetiq_docstore::InMemoryDocumentStore;

    fn engine(edges: Vec<Edge>) -> DocumentQueryEngine<InMemoryDocumentStore> {
        let snapshot = GraphSnapshot {
            nodes: vec![
                Node::new("D1", "asthma", NodeKind::Disease),
                Node::new("C1", "prednisone", NodeKind::Compound),
                Node::new("C2", "albuterol", NodeKind::Compound),
                Node::new("C3", "ibuprofen", NodeKind::Compound),
                Node::new("G1", "IL13", NodeKind::Gene),
                Node::new("G2", "IL4", NodeKind::Gene),
                Node::new("A1", "lung", NodeKind::Anatomy),
            ],
            edges,
        };
        DocumentQueryEngine::new(InMemoryDocumentStore::from_snapshot(&snapshot).unwrap())
    }

    #[tokio::test]
    async fn test_disease_info_lookups() {
        let engine = engine(vec![
            Edge::new("C1", Metaedge::CompoundTreatsDisease, "D1"),
            Edge::new("D1", Metaedge::CompoundTreatsDisease, "C2"),
            Edge::new("D1", Metaedge::DiseaseDownregulatesGene, "G1"),
            Edge::new("D1", Metaedge::DiseaseDownregulatesGene, "G1"),
            Edge::new("D1", Metaedge::DiseaseUpregulatesGene, "G2"),
            Edge::new("D1", Metaedge::DiseaseLocalizesAnatomy, "A1"),
            Edge::new("D1", Metaedge::DiseaseLocalizesAnatomy, "A9"),
        ]);

        let info = engine.disease_info("D1").await.unwrap().unwrap();
        assert_eq!(info.disease_name, "asthma");
        assert_eq!(
            info.drugs,
            BTreeSet::from(["albuterol".to_string(), "prednisone".to_string()])
        );
        assert_eq!(info.genes, BTreeSet::from(["IL13".to_string()]));
        assert_eq!(info.anatomy, BTreeSet::from(["lung".to_string()]));
    }

    #[tokio::test]
    async fn test_unknown_disease() {
        let engine = engine(vec![]);
        assert!(engine.disease_info("D9").await.unwrap().is_none());
        assert!(engine.repurposing_candidates("D9").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repurposing_uses_disease_genes_of_both_directions() {
        let engine = engine(vec![
            Edge::new("D1", Metaedge::DiseaseUpregulatesGene, "G2"),
            Edge::new("D1", Metaedge::DiseaseLocalizesAnatomy, "A1"),
            Edge::new("A1", Metaedge::AnatomyUpregulatesGene, "G2"),
            Edge::new("C3", Metaedge::CompoundDownregulatesGene, "G2"),
            Edge::new("C2", Metaedge::CompoundUpregulatesGene, "G2"),
        ]);

        let outcome = engine.repurposing_with_stats("D1").await.unwrap();
        assert_eq!(outcome.candidates, BTreeSet::from(["ibuprofen".to_string()]));
        assert_eq!(outcome.stats.compound_edges, 2);
        assert_eq!(outcome.stats.confirmed, 1);
        assert_eq!(engine.kind(), EngineKind::Document);
    }

    #[tokio::test]
    async fn test_repurposing_short_circuits_without_anatomy() {
        let engine = engine(vec![
            Edge::new("D1", Metaedge::DiseaseDownregulatesGene, "G1"),
            Edge::new("C3", Metaedge::CompoundUpregulatesGene, "G1"),
        ]);

        let outcome = engine.repurposing_with_stats("D1").await.unwrap();
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.stats.compound_edges, 0);
        assert_eq!(engine.store().probe_counts().find, 2);
    }
}
