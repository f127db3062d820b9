//! Configuration management for hetiq.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`HETIQ__` prefix, `__` between sections)
//! 2. Config file (`hetiq.toml`, or the prefix given on the command line)
//! 3. Defaults

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::CoreError;

/// Top-level settings for both stores and the offline snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub mongo: MongoSettings,

    #[serde(default)]
    pub snapshot: SnapshotSettings,
}

/// Connection settings for the graph-native store.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_neo4j_uri")]
    pub uri: String,

    #[serde(default = "default_neo4j_user")]
    pub user: String,

    /// Passed through to the driver as-is.
    #[serde(default = "default_neo4j_password")]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// Connection settings for the document store.
#[derive(Debug, Clone, Deserialize)]
pub struct MongoSettings {
    #[serde(default = "default_mongo_uri")]
    pub uri: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_nodes_collection")]
    pub nodes_collection: String,

    #[serde(default = "default_edges_collection")]
    pub edges_collection: String,
}

/// TSV files backing the offline source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotSettings {
    pub nodes: Option<PathBuf>,
    pub edges: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `<file_prefix>.toml` (optional) and `HETIQ__*`
    /// environment variables.
    pub fn load(file_prefix: &str) -> Result<Self, CoreError> {
        Self::load_with(file_prefix, environment())
    }

    fn load_with(file_prefix: &str, env: config::Environment) -> Result<Self, CoreError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(env)
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        tracing::debug!(
            neo4j_uri = %settings.neo4j.uri,
            mongo_uri = %settings.mongo.uri,
            database = %settings.mongo.database,
            "Settings loaded"
        );
        Ok(settings)
    }
}

/// `HETIQ__*` variables. Values stay strings so credentials pass through
/// untouched; numeric fields are converted during deserialization.
fn environment() -> config::Environment {
    config::Environment::with_prefix("HETIQ").separator("__")
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "hetionet_db".to_string()
}

fn default_nodes_collection() -> String {
    "nodes".to_string()
}

fn default_edges_collection() -> String {
    "edges".to_string()
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_neo4j_uri(),
            user: default_neo4j_user(),
            password: default_neo4j_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            uri: default_mongo_uri(),
            database: default_database(),
            nodes_collection: default_nodes_collection(),
            edges_collection: default_edges_collection(),
        }
    }
}
