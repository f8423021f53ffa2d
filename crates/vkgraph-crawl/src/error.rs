//! Error types for the vkgraph-crawl crate.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Graph error: {0}")]
    Graph(#[from] vkgraph_graph::GraphError),

    #[error("Record error: {0}")]
    Record(#[from] vkgraph_core::CoreError),

    #[error("No data fetched for user {user_id}")]
    NoData { user_id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
