//! hetiq-graph: graph-native access to the knowledge graph.
//!
//! Queries are expressed as typed multi-hop patterns ([`PatternQuery`]) and
//! handed to a [`PatternExecutor`]. Two executors exist: the Neo4j
//! [`GraphClient`], which renders patterns to Cypher, and [`InMemoryGraph`],
//! which matches them against an adjacency list built from a TSV snapshot.

pub mod client;
pub mod memory;
pub mod mutations;
pub mod pattern;
pub mod queries;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use memory::InMemoryGraph;
pub use pattern::{
    ColumnValue, Direction, Exclusion, Hop, PatternExecutor, PatternQuery, PatternRow, Projection,
};
