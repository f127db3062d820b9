//! hetiq-docstore: document-store access to the knowledge graph.
//!
//! The graph lives in two collections, `nodes` and `edges`, and the only
//! operations are point lookups ([`DocumentStore::find_one`]) and filtered
//! scans ([`DocumentStore::find`]). There is no join and no path operator:
//! callers materialize each hop themselves.

pub mod client;
pub mod filter;
pub mod load;
pub mod memory;
pub mod store;

pub use client::{DocumentConfig, DocumentError, MongoStore};
pub use filter::{Collection, Condition, Filter};
pub use memory::{InMemoryDocumentStore, ProbeCounts};
pub use store::{decode_edge, decode_node, DocumentStore};
