//! Recording fakes for the API and the graph.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::Mutex;

use vkgraph_core::{EdgeKind, Group, Profile};
use vkgraph_crawl::{ApiError, GraphSink, ProfileSource};
use vkgraph_graph::GraphError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    UserInfo(String),
    Followers(String),
    Subscriptions(String),
}

/// In-memory VK: users are known by numeric id; unknown users fail like the
/// real API does for an empty `users.get`.
#[derive(Clone, Default)]
pub struct FakeVk {
    users: HashMap<String, Value>,
    followers: HashMap<String, Vec<Value>>,
    subscriptions: HashMap<String, Vec<Value>>,
    failing: HashSet<(&'static str, String)>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeVk {
    pub fn with_user(mut self, id: i64, first_name: &str) -> Self {
        self.users.insert(
            id.to_string(),
            json!({
                "id": id,
                "first_name": first_name,
                "last_name": "Test",
                "screen_name": format!("id{id}"),
                "sex": 1,
                "city": {"id": 1, "title": "Moscow"},
            }),
        );
        self
    }

    /// Make `users.get` answer for `screen_name` with user `id`.
    pub fn with_alias(mut self, screen_name: &str, id: i64) -> Self {
        if let Some(user) = self.users.get(&id.to_string()).cloned() {
            self.users.insert(screen_name.to_string(), user);
        }
        self
    }

    pub fn with_followers(mut self, id: i64, ids: &[i64]) -> Self {
        self.followers
            .insert(id.to_string(), ids.iter().map(|i| json!(i)).collect());
        self
    }

    pub fn with_subscriptions(mut self, id: i64, items: Vec<Value>) -> Self {
        self.subscriptions.insert(id.to_string(), items);
        self
    }

    /// Make `method` fail for `id` with an API-reported error.
    pub fn failing(mut self, method: &'static str, id: &str) -> Self {
        self.failing.insert((method, id.to_string()));
        self
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    fn check(&self, method: &'static str, id: &str) -> Result<(), ApiError> {
        if self.failing.contains(&(method, id.to_string())) {
            return Err(ApiError::Remote {
                code: 30,
                message: "This profile is private".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileSource for FakeVk {
    async fn user_info(&self, user_id: &str) -> Result<Value, ApiError> {
        self.calls.lock().await.push(Call::UserInfo(user_id.to_string()));
        self.check("users.get", user_id)?;
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| ApiError::UserNotFound(user_id.to_string()))
    }

    async fn followers(&self, user_id: &str) -> Result<Vec<Value>, ApiError> {
        self.calls.lock().await.push(Call::Followers(user_id.to_string()));
        self.check("users.getFollowers", user_id)?;
        Ok(self.followers.get(user_id).cloned().unwrap_or_default())
    }

    async fn subscriptions(&self, user_id: &str) -> Result<Vec<Value>, ApiError> {
        self.calls
            .lock()
            .await
            .push(Call::Subscriptions(user_id.to_string()));
        self.check("users.getSubscriptions", user_id)?;
        Ok(self.subscriptions.get(user_id).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    User(i64),
    Group(i64),
    Edge(i64, i64, EdgeKind),
}

#[derive(Clone, Default)]
pub struct RecordingGraph {
    writes: Arc<Mutex<Vec<Write>>>,
}

impl RecordingGraph {
    pub async fn writes(&self) -> Vec<Write> {
        self.writes.lock().await.clone()
    }

    pub async fn count(&self, pred: impl Fn(&Write) -> bool) -> usize {
        self.writes.lock().await.iter().filter(|w| pred(w)).count()
    }
}

#[async_trait::async_trait]
impl GraphSink for RecordingGraph {
    async fn upsert_user(&self, profile: &Profile) -> Result<(), GraphError> {
        self.writes.lock().await.push(Write::User(profile.id));
        Ok(())
    }

    async fn upsert_group(&self, group: &Group) -> Result<(), GraphError> {
        self.writes.lock().await.push(Write::Group(group.id));
        Ok(())
    }

    async fn upsert_edge(
        &self,
        source_id: i64,
        target_id: i64,
        kind: EdgeKind,
    ) -> Result<(), GraphError> {
        self.writes
            .lock()
            .await
            .push(Write::Edge(source_id, target_id, kind));
        Ok(())
    }
}

pub fn page(id: i64, name: &str) -> Value {
    json!({"id": id, "name": name, "screen_name": format!("club{id}"), "type": "page"})
}

pub fn profile_item(id: i64) -> Value {
    json!({"id": id, "first_name": "Sub", "type": "profile"})
}
