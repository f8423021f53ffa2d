//! Write operations for the social graph.
//!
//! All mutations use MERGE (upsert) semantics: nodes are identified by their
//! remote id alone, and a re-fetch overwrites the stored attributes.

use chrono::Utc;
use neo4rs::query;

use vkgraph_core::{EdgeKind, Group, Profile};

use crate::client::{GraphClient, GraphError};

impl GraphClient {
    // ── Node Upserts ─────────────────────────────────────────────

    /// Upsert a User node.
    pub async fn upsert_user(&self, profile: &Profile) -> Result<(), GraphError> {
        let q = query(
            "MERGE (n:User {id: $id})
             ON CREATE SET n.first_seen = $now
             SET n.screen_name = $screen_name, n.name = $name,
                 n.sex = $sex, n.city = $city, n.last_seen = $now",
        )
        .param("id", profile.id)
        .param("screen_name", profile.screen_name.clone())
        .param("name", profile.name.clone())
        .param("sex", profile.sex.code())
        .param("city", profile.city.clone())
        .param("now", Utc::now().to_rfc3339());

        self.run(q).await
    }

    /// Upsert a Group node.
    pub async fn upsert_group(&self, group: &Group) -> Result<(), GraphError> {
        let q = query(
            "MERGE (n:Group {id: $id})
             ON CREATE SET n.first_seen = $now
             SET n.name = $name, n.screen_name = $screen_name, n.last_seen = $now",
        )
        .param("id", group.id)
        .param("name", group.name.clone())
        .param("screen_name", group.screen_name.clone())
        .param("now", Utc::now().to_rfc3339());

        self.run(q).await
    }

    // ── Edge Upserts ─────────────────────────────────────────────

    /// Upsert a directed edge from a User to the node of the kind's target
    /// label. A no-op when either end has not been stored yet.
    pub async fn upsert_edge(
        &self,
        source_id: i64,
        target_id: i64,
        kind: EdgeKind,
    ) -> Result<(), GraphError> {
        let rel_type = kind.rel_type();
        let target_label = kind.target().label();
        let cypher = format!(
            "MATCH (a:User {{id: $source_id}})
             MATCH (b:{target_label} {{id: $target_id}})
             MERGE (a)-[r:{rel_type}]->(b)
             ON CREATE SET r.first_seen = $now
             SET r.last_seen = $now"
        );

        let q = query(&cypher)
            .param("source_id", source_id)
            .param("target_id", target_id)
            .param("now", Utc::now().to_rfc3339());

        self.run(q).await
    }

    /// Delete nodes of a label by id, with their relationships.
    pub async fn delete_nodes(&self, label: &str, ids: &[i64]) -> Result<(), GraphError> {
        let cypher = format!(
            "MATCH (n:{label})
             WHERE n.id IN $ids
             DETACH DELETE n"
        );

        let q = query(&cypher).param("ids", ids.to_vec());

        self.run(q).await
    }
}
