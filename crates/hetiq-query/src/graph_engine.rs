//! Disease queries answered by native pattern matching.
//!
//! Each operation is a single [`PatternQuery`]: the disease is the anchor,
//! every relationship is an optional hop, and names are aggregated into
//! distinct sets by the executor. Against Neo4j that is one Cypher round
//! trip per call.

use std::collections::BTreeSet;
use std::time::Instant;

use async_trait::async_trait;
use hetiq_core::{DiseaseInfo, Metaedge, NodeKind};
use hetiq_graph::{
    Direction, Exclusion, GraphClient, GraphConfig, Hop, PatternExecutor, PatternQuery,
};

use crate::engine::{DiseaseQueryEngine, EngineKind};
use crate::error::Result;

/// The query behind [`DiseaseQueryEngine::disease_info`].
///
/// CtD is matched in either orientation; the drug, gene, and anatomy
/// hops are independent, so a disease with none of them still yields
/// its name with empty sets.
pub fn disease_info_pattern(disease_id: &str) -> PatternQuery {
    PatternQuery::anchored("d", NodeKind::Disease, disease_id)
        .optional(Hop::either(
            "d",
            Metaedge::CompoundTreatsDisease,
            "c",
            NodeKind::Compound,
        ))
        .optional(Hop::outgoing(
            "d",
            Metaedge::DiseaseDownregulatesGene,
            "g",
            NodeKind::Gene,
        ))
        .optional(Hop::outgoing(
            "d",
            Metaedge::DiseaseLocalizesAnatomy,
            "a",
            NodeKind::Anatomy,
        ))
        .return_name("d", "disease_name")
        .collect_names("c", "drugs")
        .collect_names("g", "genes")
        .collect_names("a", "anatomy")
}

/// The query behind [`DiseaseQueryEngine::repurposing_candidates`].
///
/// Disease → anatomy (DlA) → gene (AdG) ← compound (CuG), keeping only
/// compounds with no CtD edge to the disease. This is the pattern the
/// graph engine has always used; it does not check opposing regulation
/// against the disease's own genes the way the document engine does.
pub fn repurposing_pattern(disease_id: &str) -> PatternQuery {
    PatternQuery::anchored("d", NodeKind::Disease, disease_id)
        .optional(Hop::outgoing(
            "d",
            Metaedge::DiseaseLocalizesAnatomy,
            "a",
            NodeKind::Anatomy,
        ))
        .optional(Hop::outgoing(
            "a",
            Metaedge::AnatomyDownregulatesGene,
            "g",
            NodeKind::Gene,
        ))
        .optional(
            Hop::incoming("g", Metaedge::CompoundUpregulatesGene, "c", NodeKind::Compound).unless(
                Exclusion::new("c", Direction::Either, Metaedge::CompoundTreatsDisease, "d"),
            ),
        )
        .collect_names("c", "compounds")
}

/// Query engine over anything that executes pattern queries.
pub struct GraphQueryEngine<E> {
    executor: E,
}

impl<E: PatternExecutor> GraphQueryEngine<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl GraphQueryEngine<GraphClient> {
    /// Connect to Neo4j. Fails fast when the server is unreachable.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        Ok(Self::new(GraphClient::connect(config).await?))
    }

    /// Release the connection pool.
    pub fn close(self) {
        self.executor.close();
    }
}

#[async_trait]
impl<E: PatternExecutor> DiseaseQueryEngine for GraphQueryEngine<E> {
    fn kind(&self) -> EngineKind {
        EngineKind::Graph
    }

    async fn disease_info(&self, disease_id: &str) -> Result<Option<DiseaseInfo>> {
        let start = Instant::now();
        let mut rows = self
            .executor
            .execute(&disease_info_pattern(disease_id))
            .await?;

        let Some(mut row) = rows.pop() else {
            tracing::debug!(disease_id, "Disease not found");
            return Ok(None);
        };

        let info = DiseaseInfo {
            disease_id: disease_id.to_string(),
            disease_name: row.text("disease_name").unwrap_or_default().to_string(),
            drugs: row.take_names("drugs"),
            genes: row.take_names("genes"),
            anatomy: row.take_names("anatomy"),
        };

        tracing::debug!(
            disease_id,
            drugs = info.drugs.len(),
            genes = info.genes.len(),
            anatomy = info.anatomy.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Graph disease info computed"
        );
        Ok(Some(info))
    }

    async fn repurposing_candidates(&self, disease_id: &str) -> Result<BTreeSet<String>> {
        let start = Instant::now();
        let rows = self.executor.execute(&repurposing_pattern(disease_id)).await?;

        let candidates = rows
            .into_iter()
            .next()
            .map(|mut row| row.take_names("compounds"))
            .unwrap_or_default();

        tracing::debug!(
            disease_id,
            candidates = candidates.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Graph repurposing computed"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hetiq_core::{Edge, Node};
    use hetiq_graph::InMemoryGraph;

    fn engine() -> GraphQueryEngine<InMemoryGraph> {
        let nodes = vec![
            Node::new("D1", "asthma", NodeKind::Disease),
            Node::new("D2", "gout", NodeKind::Disease),
            Node::new("C1", "prednisone", NodeKind::Compound),
            Node::new("C2", "albuterol", NodeKind::Compound),
            Node::new("C3", "ibuprofen", NodeKind::Compound),
            Node::new("G1", "IL13", NodeKind::Gene),
            Node::new("A1", "lung", NodeKind::Anatomy),
        ];
        let edges = vec![
            Edge::new("C1", Metaedge::CompoundTreatsDisease, "D1"),
            Edge::new("D1", Metaedge::CompoundTreatsDisease, "C2"),
            Edge::new("D1", Metaedge::DiseaseDownregulatesGene, "G1"),
            Edge::new("D1", Metaedge::DiseaseLocalizesAnatomy, "A1"),
            Edge::new("A1", Metaedge::AnatomyDownregulatesGene, "G1"),
            Edge::new("C1", Metaedge::CompoundUpregulatesGene, "G1"),
            Edge::new("C3", Metaedge::CompoundUpregulatesGene, "G1"),
        ];
        GraphQueryEngine::new(InMemoryGraph::from_parts(nodes, edges))
    }

    #[test]
    fn test_info_pattern_shape() {
        let pattern = disease_info_pattern("D1");
        assert!(pattern.validate().is_ok());
        let cypher = pattern.to_cypher().unwrap();
        assert!(cypher.text.ends_with(
            "RETURN d.name AS disease_name, collect(DISTINCT c.name) AS drugs, \
             collect(DISTINCT g.name) AS genes, collect(DISTINCT a.name) AS anatomy"
        ));
        assert!(cypher.params.contains(&("anchor_id".to_string(), "D1".to_string())));
    }

    #[test]
    fn test_repurposing_pattern_excludes_treatments() {
        let cypher = repurposing_pattern("D1").to_cypher().unwrap();
        assert!(cypher.text.contains("NOT EXISTS"));
    }

    #[tokio::test]
    async fn test_disease_info_collects_both_ctd_orientations() {
        let info = engine().disease_info("D1").await.unwrap().unwrap();
        assert_eq!(info.disease_name, "asthma");
        assert_eq!(
            info.drugs,
            BTreeSet::from(["albuterol".to_string(), "prednisone".to_string()])
        );
        assert_eq!(info.genes, BTreeSet::from(["IL13".to_string()]));
        assert_eq!(info.anatomy, BTreeSet::from(["lung".to_string()]));
    }

    #[tokio::test]
    async fn test_disease_without_edges_has_empty_sets() {
        let info = engine().disease_info("D2").await.unwrap().unwrap();
        assert_eq!(info.disease_name, "gout");
        assert!(info.drugs.is_empty() && info.genes.is_empty() && info.anatomy.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_or_non_disease_id_is_not_found() {
        let engine = engine();
        assert!(engine.disease_info("D9").await.unwrap().is_none());
        assert!(engine.disease_info("C1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repurposing_excludes_existing_treatments() {
        let engine = engine();
        let candidates = engine.repurposing_candidates("D1").await.unwrap();
        assert_eq!(candidates, BTreeSet::from(["ibuprofen".to_string()]));
        assert_eq!(engine.kind(), EngineKind::Graph);
    }

    #[tokio::test]
    async fn test_repurposing_unknown_disease_is_empty() {
        let candidates = engine().repurposing_candidates("D9").await.unwrap();
        assert!(candidates.is_empty());
    }
}
