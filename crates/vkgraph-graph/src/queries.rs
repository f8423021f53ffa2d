//! Read operations and the canned report queries.

use std::fmt;
use std::str::FromStr;

use neo4rs::query;
use serde::Serialize;

use vkgraph_core::{EdgeKind, NodeKind, Profile, Sex};

use crate::client::{GraphClient, GraphError};

/// The fixed set of reports that can be run against a crawled graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedQuery {
    TotalUsers,
    TotalGroups,
    TopUsers,
    TopGroups,
    MutualFollowers,
}

impl CannedQuery {
    pub const ALL: [CannedQuery; 5] = [
        Self::TotalUsers,
        Self::TotalGroups,
        Self::TopUsers,
        Self::TopGroups,
        Self::MutualFollowers,
    ];

    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::TotalUsers => "total_users",
            Self::TotalGroups => "total_groups",
            Self::TopUsers => "top_5_users",
            Self::TopGroups => "top_5_groups",
            Self::MutualFollowers => "mutual_followers",
        }
    }

    /// Cypher text. Column names are fixed per result shape:
    /// counts return `total`, rankings `id, name, total`,
    /// pairs `user1, user2`.
    pub fn cypher(self) -> &'static str {
        match self {
            Self::TotalUsers => "MATCH (u:User) RETURN count(u) AS total",
            Self::TotalGroups => "MATCH (g:Group) RETURN count(g) AS total",
            Self::TopUsers => {
                "MATCH (u:User)<-[:FOLLOWS]-()
                 RETURN u.id AS id, u.name AS name, count(*) AS total
                 ORDER BY total DESC LIMIT 5"
            }
            Self::TopGroups => {
                "MATCH (g:Group)<-[:SUBSCRIBES]-()
                 RETURN g.id AS id, g.name AS name, count(*) AS total
                 ORDER BY total DESC LIMIT 5"
            }
            Self::MutualFollowers => {
                "MATCH (a:User)-[:FOLLOWS]->(b:User)-[:FOLLOWS]->(a)
                 WHERE a.id < b.id
                 RETURN a.name AS user1, b.name AS user2"
            }
        }
    }
}

impl fmt::Display for CannedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CannedQuery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|q| q.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|q| q.name()).collect();
                format!("Unknown query: {s}. Choose: {}", names.join(", "))
            })
    }
}

/// A node with an incoming-edge count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedNode {
    pub id: i64,
    pub name: String,
    pub total: i64,
}

/// Two users following each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutualPair {
    pub user1: String,
    pub user2: String,
}

/// Result of a canned query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CannedReport {
    Count { query: String, total: i64 },
    Ranking { query: String, rows: Vec<RankedNode> },
    Pairs { query: String, rows: Vec<MutualPair> },
}

impl GraphClient {
    // ── Canned Reports ───────────────────────────────────────────

    /// Run one of the canned queries and shape its rows.
    pub async fn run_canned(&self, canned: CannedQuery) -> Result<CannedReport, GraphError> {
        let rows = self.query_rows(query(canned.cypher())).await?;
        let name = canned.name().to_string();

        let report = match canned {
            CannedQuery::TotalUsers | CannedQuery::TotalGroups => CannedReport::Count {
                query: name,
                total: rows
                    .first()
                    .map(|row| row.get::<i64>("total").unwrap_or(0))
                    .unwrap_or(0),
            },
            CannedQuery::TopUsers | CannedQuery::TopGroups => {
                let mut ranked = Vec::with_capacity(rows.len());
                for row in &rows {
                    ranked.push(RankedNode {
                        id: row
                            .get("id")
                            .map_err(|e| GraphError::Row(format!("missing id: {e}")))?,
                        name: row.get("name").unwrap_or_default(),
                        total: row.get("total").unwrap_or(0),
                    });
                }
                CannedReport::Ranking {
                    query: name,
                    rows: ranked,
                }
            }
            CannedQuery::MutualFollowers => CannedReport::Pairs {
                query: name,
                rows: rows
                    .iter()
                    .map(|row| MutualPair {
                        user1: row.get("user1").unwrap_or_default(),
                        user2: row.get("user2").unwrap_or_default(),
                    })
                    .collect(),
            },
        };

        tracing::debug!(query = %canned, rows = rows.len(), "Canned query complete");
        Ok(report)
    }

    // ── Lookups ──────────────────────────────────────────────────

    /// Count nodes of a kind.
    pub async fn count_nodes(&self, kind: NodeKind) -> Result<i64, GraphError> {
        let cypher = format!("MATCH (n:{}) RETURN count(n) AS cnt", kind.label());

        match self.query_one(query(&cypher)).await? {
            Some(row) => Ok(row.get::<i64>("cnt").unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Count edges of a kind leaving a given user.
    pub async fn count_edges_from(&self, source_id: i64, kind: EdgeKind) -> Result<i64, GraphError> {
        let cypher = format!(
            "MATCH (:User {{id: $id}})-[r:{}]->(:{}) RETURN count(r) AS cnt",
            kind.rel_type(),
            kind.target().label()
        );
        let q = query(&cypher).param("id", source_id);

        match self.query_one(q).await? {
            Some(row) => Ok(row.get::<i64>("cnt").unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Read a stored user back as a Profile.
    pub async fn find_user(&self, id: i64) -> Result<Option<Profile>, GraphError> {
        let q = query("MATCH (n:User {id: $id}) RETURN n LIMIT 1").param("id", id);

        match self.query_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row
                    .get("n")
                    .map_err(|e| GraphError::Row(format!("Failed to deserialize node: {e}")))?;
                Ok(Some(Profile {
                    id,
                    screen_name: node.get("screen_name").unwrap_or_default(),
                    name: node.get("name").unwrap_or_default(),
                    sex: Sex::from_code(node.get::<i64>("sex").unwrap_or(0)),
                    city: node.get("city").unwrap_or_default(),
                }))
            }
            None => Ok(None),
        }
    }
}
