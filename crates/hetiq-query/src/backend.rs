//! Where engines get their data, and the owned handles that wrap them.
//!
//! A [`Source`] is either the live databases named in [`Settings`] or a
//! TSV snapshot held in memory. [`EngineHandle::open`] acquires one engine
//! from a source and [`EngineHandle::close`] releases it.

use hetiq_core::config::Settings;
use hetiq_core::GraphSnapshot;
use hetiq_docstore::{DocumentConfig, InMemoryDocumentStore, MongoStore};
use hetiq_graph::{GraphClient, GraphConfig, InMemoryGraph};

use crate::document_engine::DocumentQueryEngine;
use crate::engine::{DiseaseQueryEngine, EngineKind};
use crate::error::{QueryError, Result};
use crate::graph_engine::GraphQueryEngine;
use crate::join::JoinOutcome;

/// The data behind the engines.
pub enum Source {
    /// Neo4j and MongoDB, as configured.
    Live(Settings),
    /// A snapshot both engines query in memory.
    Offline(GraphSnapshot),
}

impl Source {
    /// Read the snapshot named by `settings.snapshot`.
    pub fn offline_from_settings(settings: &Settings) -> Result<Self> {
        match (&settings.snapshot.nodes, &settings.snapshot.edges) {
            (Some(nodes), Some(edges)) => Ok(Self::Offline(hetiq_core::tsv::read_snapshot(
                nodes, edges,
            )?)),
            _ => Err(QueryError::MissingSnapshot),
        }
    }
}

/// One open engine together with the backend it owns.
pub enum EngineHandle {
    Neo4j(GraphQueryEngine<GraphClient>),
    Mongo(DocumentQueryEngine<MongoStore>),
    MemoryGraph(GraphQueryEngine<InMemoryGraph>),
    MemoryDocument(DocumentQueryEngine<InMemoryDocumentStore>),
}

impl EngineHandle {
    pub async fn open(kind: EngineKind, source: &Source) -> Result<Self> {
        let handle = match (kind, source) {
            (EngineKind::Graph, Source::Live(settings)) => Self::Neo4j(
                GraphQueryEngine::connect(&GraphConfig::from(&settings.neo4j)).await?,
            ),
            (EngineKind::Document, Source::Live(settings)) => Self::Mongo(
                DocumentQueryEngine::connect(&DocumentConfig::from(&settings.mongo)).await?,
            ),
            (EngineKind::Graph, Source::Offline(snapshot)) => {
                let graph = InMemoryGraph::from(snapshot.clone());
                if graph.dangling_edge_count() > 0 {
                    tracing::debug!(
                        dangling = graph.dangling_edge_count(),
                        "Snapshot edges with unknown endpoints dropped"
                    );
                }
                Self::MemoryGraph(GraphQueryEngine::new(graph))
            }
            (EngineKind::Document, Source::Offline(snapshot)) => Self::MemoryDocument(
                DocumentQueryEngine::new(InMemoryDocumentStore::from_snapshot(snapshot)?),
            ),
        };
        tracing::debug!(engine = %kind, "Engine opened");
        Ok(handle)
    }

    pub fn engine(&self) -> &dyn DiseaseQueryEngine {
        match self {
            Self::Neo4j(engine) => engine,
            Self::Mongo(engine) => engine,
            Self::MemoryGraph(engine) => engine,
            Self::MemoryDocument(engine) => engine,
        }
    }

    /// Document-engine repurposing with join statistics; `None` for graph
    /// engines, which have no join to report on.
    pub async fn repurposing_with_stats(&self, disease_id: &str) -> Result<Option<JoinOutcome>> {
        match self {
            Self::Mongo(engine) => Ok(Some(engine.repurposing_with_stats(disease_id).await?)),
            Self::MemoryDocument(engine) => {
                Ok(Some(engine.repurposing_with_stats(disease_id).await?))
            }
            Self::Neo4j(_) | Self::MemoryGraph(_) => Ok(None),
        }
    }

    /// Release the backend's connections.
    pub async fn close(self) {
        let kind = self.engine().kind();
        match self {
            Self::Neo4j(engine) => engine.close(),
            Self::Mongo(engine) => engine.close().await,
            Self::MemoryGraph(_) | Self::MemoryDocument(_) => {}
        }
        tracing::debug!(engine = %kind, "Engine closed");
    }
}
