//! vkgraph-graph: Neo4j client for the social graph.
//!
//! All graph reads and writes flow through this crate. Writes use MERGE so
//! that re-discovering a user or group updates it in place, and every
//! relationship is created at most once per (source, kind, target).

pub mod client;
pub mod mutations;
pub mod queries;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use queries::{CannedQuery, CannedReport, MutualPair, RankedNode};
