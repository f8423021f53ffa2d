//! vkgraph-crawl: VK profile fetcher and follower-graph crawler.
//!
//! Talks to the VK API for a user's profile, followers, and subscriptions,
//! then either writes them to a JSON snapshot or walks the follower graph to
//! a fixed depth, upserting users, groups, and relationships into Neo4j.

pub mod api;
pub mod error;
pub mod snapshot;
pub mod traversal;

pub use api::{ApiError, ProfileSource, VkClient};
pub use error::CrawlError;
pub use snapshot::Snapshot;
pub use traversal::{CrawlOptions, CrawlStats, GraphSink};
