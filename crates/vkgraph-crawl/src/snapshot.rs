//! Single-user snapshot: profile, followers, and subscriptions as JSON.
//!
//! Unlike the crawl, a snapshot tolerates partial failure. Only a missing
//! profile aborts it; a failed follower or subscription request leaves that
//! list empty.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::api::ProfileSource;
use crate::error::{CrawlError, Result};

/// Raw API payloads for one user, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub user_info: Value,
    pub followers: Vec<Value>,
    pub subscriptions: Vec<Value>,
}

/// Default file name for a user's snapshot.
pub fn default_file_name(user_id: &str) -> String {
    format!("output_{user_id}.json")
}

/// Fetch a snapshot. Returns `None` when the profile itself cannot be
/// fetched; the failure has already been logged.
pub async fn fetch_snapshot(source: &dyn ProfileSource, user_id: &str) -> Option<Snapshot> {
    let user_info = match source.user_info(user_id).await {
        Ok(info) => info,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Failed to fetch user info");
            return None;
        }
    };

    // Lists are keyed by numeric id; a screen name only works for users.get.
    let list_id = user_info
        .get("id")
        .and_then(Value::as_i64)
        .map(|id| id.to_string())
        .unwrap_or_else(|| user_id.to_string());

    let followers = source.followers(&list_id).await.unwrap_or_else(|e| {
        tracing::warn!(user_id = %list_id, error = %e, "Failed to fetch followers");
        Vec::new()
    });

    let subscriptions = source.subscriptions(&list_id).await.unwrap_or_else(|e| {
        tracing::warn!(user_id = %list_id, error = %e, "Failed to fetch subscriptions");
        Vec::new()
    });

    Some(Snapshot {
        user_info,
        followers,
        subscriptions,
    })
}

/// Write a snapshot to `dir/file_name`, creating `dir` if needed.
///
/// Output is indented by four spaces and keeps non-ASCII text as UTF-8.
pub fn save_snapshot(snapshot: &Snapshot, dir: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);

    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    snapshot.serialize(&mut ser)?;
    fs::write(&path, buf)?;

    tracing::info!(path = %path.display(), "Snapshot saved");
    Ok(path)
}

/// Fetch and save in one step. Nothing is written when the profile cannot
/// be fetched.
pub async fn export_snapshot(
    source: &dyn ProfileSource,
    user_id: &str,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf> {
    let snapshot = fetch_snapshot(source, user_id)
        .await
        .ok_or_else(|| CrawlError::NoData {
            user_id: user_id.to_string(),
        })?;

    tracing::info!(
        user_id,
        followers = snapshot.followers.len(),
        subscriptions = snapshot.subscriptions.len(),
        "Fetched user data"
    );

    save_snapshot(&snapshot, dir, file_name)
}
