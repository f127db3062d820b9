//! The gene-mediated opposing-regulation join.
//!
//! A document store cannot traverse relationships, so repurposing is
//! reconstructed in application code. For every compound-to-gene edge
//! that touches one of the disease's genes:
//!
//! 1. the regulation is flipped and mapped to its anatomy metaedge
//!    (CuG needs an AdG edge, CdG needs an AuG edge);
//! 2. the disease's anatomies are probed one at a time for that edge
//!    into the same gene, stopping at the first hit;
//! 3. compounds that already treat the disease (CtD in either
//!    orientation) are dropped;
//! 4. the survivor's name is looked up and added to the result.
//!
//! Nothing is memoized: a compound reached through k edges costs k full
//! rounds. Worst case is `edges × (anatomies + 3)` point lookups.

use std::collections::BTreeSet;

use hetiq_core::types::Regulation;
use hetiq_core::{Edge, Metaedge};
use hetiq_docstore::{decode_node, Collection, DocumentError, DocumentStore, Filter};
use serde::Serialize;

/// One compound-regulates-gene edge entering the join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundGeneEdge {
    pub compound_id: String,
    pub gene_id: String,
    pub regulation: Regulation,
}

impl CompoundGeneEdge {
    /// `None` unless the edge is CuG or CdG.
    pub fn from_edge(edge: &Edge) -> Option<Self> {
        let regulation = edge.metaedge.compound_regulation()?;
        Some(Self {
            compound_id: edge.source.clone(),
            gene_id: edge.target.clone(),
            regulation,
        })
    }

    /// The anatomy-to-gene metaedge that confirms this edge.
    pub fn opposing_metaedge(&self) -> Metaedge {
        Metaedge::anatomy_regulates(self.regulation.opposite())
    }
}

/// Store calls issued by one join, by purpose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    pub compound_edges: usize,
    pub anatomy_probes: usize,
    pub treatment_probes: usize,
    pub name_lookups: usize,
    /// Edges whose opposing anatomy edge was found.
    pub confirmed: usize,
}

impl JoinStats {
    pub fn total_probes(&self) -> usize {
        self.anatomy_probes + self.treatment_probes + self.name_lookups
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOutcome {
    pub candidates: BTreeSet<String>,
    pub stats: JoinStats,
}

/// Nested-loop join over a document store. See the module docs.
pub struct OpposingRegulationJoin<'a, S: ?Sized> {
    store: &'a S,
    disease_id: &'a str,
    anatomy_ids: &'a [String],
}

impl<'a, S: DocumentStore + ?Sized> OpposingRegulationJoin<'a, S> {
    pub fn new(store: &'a S, disease_id: &'a str, anatomy_ids: &'a [String]) -> Self {
        Self {
            store,
            disease_id,
            anatomy_ids,
        }
    }

    pub async fn run(&self, edges: &[CompoundGeneEdge]) -> Result<JoinOutcome, DocumentError> {
        let mut outcome = JoinOutcome::default();
        outcome.stats.compound_edges = edges.len();

        for edge in edges {
            if !self.confirmed_by_anatomy(edge, &mut outcome.stats).await? {
                continue;
            }
            outcome.stats.confirmed += 1;

            if self
                .treats_disease(&edge.compound_id, &mut outcome.stats)
                .await?
            {
                continue;
            }

            outcome.stats.name_lookups += 1;
            let node = self
                .store
                .find_one(Collection::Nodes, &Filter::new().eq("id", edge.compound_id.as_str()))
                .await?
                .and_then(decode_node);
            match node {
                Some(node) => {
                    outcome.candidates.insert(node.name);
                }
                None => {
                    tracing::debug!(compound_id = %edge.compound_id, "Dangling compound skipped");
                }
            }
        }

        Ok(outcome)
    }

    async fn confirmed_by_anatomy(
        &self,
        edge: &CompoundGeneEdge,
        stats: &mut JoinStats,
    ) -> Result<bool, DocumentError> {
        let metaedge = edge.opposing_metaedge();
        for anatomy_id in self.anatomy_ids {
            stats.anatomy_probes += 1;
            let filter = Filter::new()
                .eq("source", anatomy_id.as_str())
                .eq("target", edge.gene_id.as_str())
                .eq("metaedge", metaedge.code());
            if self.store.find_one(Collection::Edges, &filter).await?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn treats_disease(
        &self,
        compound_id: &str,
        stats: &mut JoinStats,
    ) -> Result<bool, DocumentError> {
        let ctd = Metaedge::CompoundTreatsDisease;
        for (source, target) in [(compound_id, self.disease_id), (self.disease_id, compound_id)] {
            stats.treatment_probes += 1;
            let filter = Filter::new()
                .eq("source", source)
                .eq("target", target)
                .eq("metaedge", ctd.code());
            if self.store.find_one(Collection::Edges, &filter).await?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hetiq_core::{GraphSnapshot, Node, NodeKind};
    use hetiq_docstore::InMemoryDocumentStore;

    fn edge(compound: &str, gene: &str, regulation: Regulation) -> CompoundGeneEdge {
        CompoundGeneEdge {
            compound_id: compound.to_string(),
            gene_id: gene.to_string(),
            regulation,
        }
    }

    fn store(edges: Vec<Edge>) -> InMemoryDocumentStore {
        InMemoryDocumentStore::from_snapshot(&GraphSnapshot {
            nodes: vec![
                Node::new("D1", "asthma", NodeKind::Disease),
                Node::new("C1", "cortisol", NodeKind::Compound),
                Node::new("C2", "ibuprofen", NodeKind::Compound),
            ],
            edges,
        })
        .unwrap()
    }

    #[test]
    fn test_opposing_metaedge() {
        assert_eq!(
            edge("C", "G", Regulation::Up).opposing_metaedge(),
            Metaedge::AnatomyDownregulatesGene
        );
        assert_eq!(
            edge("C", "G", Regulation::Down).opposing_metaedge(),
            Metaedge::AnatomyUpregulatesGene
        );
    }

    #[test]
    fn test_from_edge_keeps_only_compound_regulation() {
        let cug = Edge::new("C1", Metaedge::CompoundUpregulatesGene, "G1");
        assert_eq!(
            CompoundGeneEdge::from_edge(&cug),
            Some(edge("C1", "G1", Regulation::Up))
        );
        let ctd = Edge::new("C1", Metaedge::CompoundTreatsDisease, "D1");
        assert!(CompoundGeneEdge::from_edge(&ctd).is_none());
    }

    #[tokio::test]
    async fn test_anatomy_probes_stop_at_first_hit() {
        let store = store(vec![Edge::new("A1", Metaedge::AnatomyDownregulatesGene, "G1")]);
        let anatomy = vec!["A1".to_string(), "A2".to_string(), "A3".to_string()];
        let join = OpposingRegulationJoin::new(&store, "D1", &anatomy);

        let outcome = join.run(&[edge("C1", "G1", Regulation::Up)]).await.unwrap();

        assert_eq!(outcome.candidates, BTreeSet::from(["cortisol".to_string()]));
        assert_eq!(
            outcome.stats,
            JoinStats {
                compound_edges: 1,
                anatomy_probes: 1,
                treatment_probes: 2,
                name_lookups: 1,
                confirmed: 1,
            }
        );
        assert_eq!(store.probe_counts().find_one, outcome.stats.total_probes());
    }

    #[tokio::test]
    async fn test_same_direction_is_not_confirmed() {
        let store = store(vec![Edge::new("A1", Metaedge::AnatomyUpregulatesGene, "G1")]);
        let anatomy = vec!["A1".to_string(), "A2".to_string()];
        let join = OpposingRegulationJoin::new(&store, "D1", &anatomy);

        let outcome = join.run(&[edge("C1", "G1", Regulation::Up)]).await.unwrap();

        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.stats.anatomy_probes, 2);
        assert_eq!(outcome.stats.treatment_probes, 0);
    }

    #[tokio::test]
    async fn test_existing_treatment_excluded_in_either_orientation() {
        let store = store(vec![
            Edge::new("A1", Metaedge::AnatomyUpregulatesGene, "G1"),
            Edge::new("D1", Metaedge::CompoundTreatsDisease, "C2"),
        ]);
        let anatomy = vec!["A1".to_string()];
        let join = OpposingRegulationJoin::new(&store, "D1", &anatomy);

        let outcome = join
            .run(&[edge("C2", "G1", Regulation::Down)])
            .await
            .unwrap();

        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.stats.confirmed, 1);
        assert_eq!(outcome.stats.treatment_probes, 2);
        assert_eq!(outcome.stats.name_lookups, 0);
    }

    #[tokio::test]
    async fn test_repeated_compound_is_rejoined_and_deduplicated() {
        let store = store(vec![
            Edge::new("A1", Metaedge::AnatomyDownregulatesGene, "G1"),
            Edge::new("A1", Metaedge::AnatomyDownregulatesGene, "G2"),
        ]);
        let anatomy = vec!["A1".to_string()];
        let join = OpposingRegulationJoin::new(&store, "D1", &anatomy);

        let outcome = join
            .run(&[
                edge("C1", "G1", Regulation::Up),
                edge("C1", "G2", Regulation::Up),
            ])
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.stats.name_lookups, 2);
    }

    #[tokio::test]
    async fn test_dangling_compound_is_skipped() {
        let store = store(vec![Edge::new("A1", Metaedge::AnatomyDownregulatesGene, "G1")]);
        let anatomy = vec!["A1".to_string()];
        let join = OpposingRegulationJoin::new(&store, "D1", &anatomy);

        let outcome = join.run(&[edge("C9", "G1", Regulation::Up)]).await.unwrap();

        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.stats.name_lookups, 1);
    }

    #[tokio::test]
    async fn test_no_anatomy_confirms_nothing() {
        let store = store(vec![]);
        let join = OpposingRegulationJoin::new(&store, "D1", &[]);
        let outcome = join.run(&[edge("C1", "G1", Regulation::Up)]).await.unwrap();
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.stats.total_probes(), 0);
    }
}
