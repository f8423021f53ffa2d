//! Depth-bounded crawl of the follower/subscription graph.
//!
//! For each user: fetch profile, followers, and subscriptions; upsert the
//! user; then for every follower and every non-page subscription fetch and
//! upsert that user, link it, and recurse with one less depth. Pages become
//! Groups and are never expanded.
//!
//! Without `dedupe` there is no visited-set: a user reachable along several
//! paths is refetched and re-upserted once per path, so work grows with
//! branching factor and depth. Any error aborts the whole crawl.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use vkgraph_core::{mapper, EdgeKind, Group, Profile, Subscription};
use vkgraph_graph::{GraphClient, GraphError};

use crate::api::ProfileSource;
use crate::error::Result;

/// Destination for crawled records.
#[async_trait]
pub trait GraphSink: Send + Sync {
    async fn upsert_user(&self, profile: &Profile) -> std::result::Result<(), GraphError>;

    async fn upsert_group(&self, group: &Group) -> std::result::Result<(), GraphError>;

    async fn upsert_edge(
        &self,
        source_id: i64,
        target_id: i64,
        kind: EdgeKind,
    ) -> std::result::Result<(), GraphError>;
}

#[async_trait]
impl GraphSink for GraphClient {
    async fn upsert_user(&self, profile: &Profile) -> std::result::Result<(), GraphError> {
        GraphClient::upsert_user(self, profile).await
    }

    async fn upsert_group(&self, group: &Group) -> std::result::Result<(), GraphError> {
        GraphClient::upsert_group(self, group).await
    }

    async fn upsert_edge(
        &self,
        source_id: i64,
        target_id: i64,
        kind: EdgeKind,
    ) -> std::result::Result<(), GraphError> {
        GraphClient::upsert_edge(self, source_id, target_id, kind).await
    }
}

/// Crawl parameters.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Remaining hops from the start user. Zero does nothing.
    pub depth: u32,
    /// Expand each user at most once per run.
    pub dedupe: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            depth: 2,
            dedupe: false,
        }
    }
}

/// Counters for a finished crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub users_expanded: u64,
    pub users_upserted: u64,
    pub groups_upserted: u64,
    pub follow_edges: u64,
    pub subscribe_edges: u64,
    pub skipped_items: u64,
}

/// Crawl from `user_id` (numeric id or screen name) to `options.depth`.
pub async fn crawl(
    source: &dyn ProfileSource,
    sink: &dyn GraphSink,
    user_id: &str,
    options: &CrawlOptions,
) -> Result<CrawlStats> {
    tracing::info!(user_id, depth = options.depth, dedupe = options.dedupe, "Starting crawl");

    let mut crawler = Crawler {
        source,
        sink,
        dedupe: options.dedupe,
        expanded: HashSet::new(),
        stats: CrawlStats::default(),
    };
    crawler.visit(user_id.to_string(), options.depth).await?;

    let stats = crawler.stats;
    tracing::info!(
        user_id,
        expanded = stats.users_expanded,
        users = stats.users_upserted,
        groups = stats.groups_upserted,
        follows = stats.follow_edges,
        subscribes = stats.subscribe_edges,
        skipped = stats.skipped_items,
        "Crawl complete"
    );
    Ok(stats)
}

struct Crawler<'a> {
    source: &'a dyn ProfileSource,
    sink: &'a dyn GraphSink,
    dedupe: bool,
    expanded: HashSet<i64>,
    stats: CrawlStats,
}

impl Crawler<'_> {
    fn visit(&mut self, user_id: String, depth: u32) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if depth == 0 {
                return Ok(());
            }

            if self.is_expanded(&user_id) {
                tracing::debug!(user_id = %user_id, "Already expanded, skipping");
                return Ok(());
            }

            tracing::info!(user_id = %user_id, depth, "Fetching user");
            let profile = self.fetch_profile(&user_id).await?;
            if self.dedupe && !self.expanded.insert(profile.id) {
                tracing::debug!(user_id = profile.id, "Already expanded, skipping");
                return Ok(());
            }
            self.stats.users_expanded += 1;

            let list_id = profile.id.to_string();
            let followers = self.source.followers(&list_id).await?;
            let subscriptions = self.source.subscriptions(&list_id).await?;

            self.store_user(&profile).await?;

            for raw in &followers {
                let Some(follower_id) = mapper::follower_id(raw) else {
                    self.skip(profile.id, raw);
                    continue;
                };
                self.follow(profile.id, follower_id).await?;
                self.visit(follower_id.to_string(), depth - 1).await?;
            }

            for raw in &subscriptions {
                match mapper::classify_subscription(raw) {
                    Some(Subscription::Group(group)) => {
                        self.sink.upsert_group(&group).await?;
                        self.stats.groups_upserted += 1;
                        self.sink
                            .upsert_edge(profile.id, group.id, EdgeKind::Subscribes)
                            .await?;
                        self.stats.subscribe_edges += 1;
                    }
                    Some(Subscription::User(target_id)) => {
                        self.follow(profile.id, target_id).await?;
                        self.visit(target_id.to_string(), depth - 1).await?;
                    }
                    None => self.skip(profile.id, raw),
                }
            }

            Ok(())
        })
    }

    /// Recursive visits pass numeric ids, so a known id needs no lookup.
    fn is_expanded(&self, user_id: &str) -> bool {
        self.dedupe
            && user_id
                .parse::<i64>()
                .is_ok_and(|id| self.expanded.contains(&id))
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile> {
        let raw = self.source.user_info(user_id).await?;
        Ok(mapper::map_profile(&raw)?)
    }

    async fn store_user(&mut self, profile: &Profile) -> Result<()> {
        self.sink.upsert_user(profile).await?;
        self.stats.users_upserted += 1;
        Ok(())
    }

    /// Fetch and store `target_id`, then link `source_id` to it.
    async fn follow(&mut self, source_id: i64, target_id: i64) -> Result<()> {
        let target = self.fetch_profile(&target_id.to_string()).await?;
        self.store_user(&target).await?;
        self.sink
            .upsert_edge(source_id, target_id, EdgeKind::Follows)
            .await?;
        self.stats.follow_edges += 1;
        Ok(())
    }

    fn skip(&mut self, user_id: i64, raw: &Value) {
        tracing::warn!(user_id, item = %raw, "Skipping list item without a usable id");
        self.stats.skipped_items += 1;
    }
}
