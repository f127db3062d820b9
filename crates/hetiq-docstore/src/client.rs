//! MongoDB connection management and the MongoDB-backed store.

use async_trait::async_trait;
use futures::TryStreamExt;
use hetiq_core::config::MongoSettings;
use mongodb::bson::{doc, Document};
use mongodb::Client;

use crate::filter::{Collection, Filter};
use crate::store::DocumentStore;

/// Errors from document-store operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("MongoDB connection error: {0}")]
    Connection(String),

    #[error("MongoDB query error: {0}")]
    Query(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration for connecting to MongoDB.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub uri: String,
    pub database: String,
    pub nodes_collection: String,
    pub edges_collection: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self::from(&MongoSettings::default())
    }
}

impl From<&MongoSettings> for DocumentConfig {
    fn from(settings: &MongoSettings) -> Self {
        Self {
            uri: settings.uri.clone(),
            database: settings.database.clone(),
            nodes_collection: settings.nodes_collection.clone(),
            edges_collection: settings.edges_collection.clone(),
        }
    }
}

/// Owned MongoDB handle over the `nodes` and `edges` collections.
///
/// Pooling and timeouts are whatever the connection string configures.
pub struct MongoStore {
    client: Client,
    nodes: mongodb::Collection<Document>,
    edges: mongodb::Collection<Document>,
}

impl MongoStore {
    /// Connect and ping, so an unreachable server fails here.
    pub async fn connect(config: &DocumentConfig) -> Result<Self, DocumentError> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|e| DocumentError::Connection(e.to_string()))?;

        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DocumentError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, database = %config.database, "Connected to MongoDB");

        Ok(Self {
            nodes: database.collection(&config.nodes_collection),
            edges: database.collection(&config.edges_collection),
            client,
        })
    }

    pub(crate) fn collection(&self, collection: Collection) -> &mongodb::Collection<Document> {
        match collection {
            Collection::Nodes => &self.nodes,
            Collection::Edges => &self.edges,
        }
    }

    /// Close every pooled connection.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        tracing::debug!("MongoDB client closed");
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, DocumentError> {
        Ok(self
            .collection(collection)
            .find_one(filter.to_document())
            .await?)
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, DocumentError> {
        let cursor = self.collection(collection).find(filter.to_document()).await?;
        Ok(cursor.try_collect().await?)
    }
}
