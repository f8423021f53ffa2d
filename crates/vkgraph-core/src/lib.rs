//! vkgraph-core: Shared record types, settings, and error handling for vkgraph.
//!
//! This crate provides the foundational pieces used by the graph client and
//! the crawler binary:
//! - Record types (Profile, Group) and relationship kinds for the social graph
//! - The record mapper turning raw VK API objects into those records
//! - Layered settings loading (defaults, config file, environment, `.env`)
//! - Common error types

pub mod config;
pub mod error;
pub mod mapper;
pub mod types;

pub use crate::config::Settings;
pub use error::CoreError;
pub use types::{EdgeKind, Group, NodeKind, Profile, Sex, Subscription};
