//! Core record types for the vkgraph social graph.
//!
//! Users and groups are keyed by the integer id VK assigns them. Records are
//! upserted on every fetch, so these types carry only the latest attribute
//! values, never history.

use serde::{Deserialize, Serialize};

// ── Node Types ────────────────────────────────────────────────────

/// A user profile, reduced to the fields stored in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub screen_name: String,
    /// Display name: `"<first_name> <last_name>"`.
    pub name: String,
    pub sex: Sex,
    /// City title, empty when the profile does not expose one.
    pub city: String,
}

/// A community page the user subscribes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub screen_name: String,
}

/// Profile sex as reported by VK (0 = unknown, 1 = female, 2 = male).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sex {
    #[default]
    Unknown,
    Female,
    Male,
}

impl Sex {
    /// Map the remote integer code; unrecognized codes become `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Female,
            2 => Self::Male,
            _ => Self::Unknown,
        }
    }

    /// The integer code stored on graph nodes.
    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Female => 1,
            Self::Male => 2,
        }
    }
}

/// A classified entry from a user's subscription list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// A `type == "page"` entry. Stored as a Group, never expanded.
    Group(Group),
    /// Any other entry with an id: another user to follow and expand.
    User(i64),
}

/// Node labels used in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    User,
    Group,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Group => "Group",
        }
    }
}

// ── Edge Types ────────────────────────────────────────────────────

/// Directed relationship kinds. The source is always a User.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// User → User.
    Follows,
    /// User → Group.
    Subscribes,
}

impl EdgeKind {
    /// Cypher relationship type.
    pub fn rel_type(self) -> &'static str {
        match self {
            Self::Follows => "FOLLOWS",
            Self::Subscribes => "SUBSCRIBES",
        }
    }

    /// Label of the node at the head of the edge.
    pub fn target(self) -> NodeKind {
        match self {
            Self::Follows => NodeKind::User,
            Self::Subscribes => NodeKind::Group,
        }
    }
}
