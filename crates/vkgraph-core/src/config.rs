//! Settings for vkgraph.
//!
//! Loaded from (in priority order):
//! 1. Legacy flat environment variables (`VK_TOKEN`, `NEO4J_URI`, ...)
//! 2. Environment variables (`VKGRAPH__<SECTION>__<KEY>`)
//! 3. Config file (`vkgraph.toml` by default)
//! 4. Defaults
//!
//! A `.env` file is merged into the process environment before any of the
//! above are read.

use std::path::Path;

use serde::Deserialize;

use crate::error::{CoreError, Result};

/// Flat variable names accepted for each settings key, first match wins.
const LEGACY_VARS: &[(&str, &[&str])] = &[
    ("vk.token", &["VK_TOKEN", "SERV_VK_TOKEN"]),
    ("vk.api_version", &["VK_API_VERSION"]),
    ("neo4j.uri", &["NEO4J_URI"]),
    ("neo4j.user", &["NEO4J_USER"]),
    ("neo4j.password", &["NEO4J_PASSWORD"]),
];

/// Top-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub vk: VkSettings,
    #[serde(default)]
    pub neo4j: Neo4jSettings,
    #[serde(default)]
    pub crawl: CrawlSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Remote API access.
#[derive(Debug, Clone, Deserialize)]
pub struct VkSettings {
    /// Access token. Required for anything that talks to the API.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `count` passed to `users.getFollowers`.
    #[serde(default = "default_followers_limit")]
    pub followers_limit: u32,
}

/// Neo4j connection.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_neo4j_uri")]
    pub uri: String,
    #[serde(default = "default_neo4j_user")]
    pub user: String,
    #[serde(default = "default_neo4j_password")]
    pub password: String,
}

/// Traversal defaults, overridable from the command line.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    #[serde(default = "default_depth")]
    pub depth: u32,

    /// Skip re-expanding users already expanded in the same run.
    #[serde(default)]
    pub dedupe: bool,
}

/// Snapshot output.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

fn default_api_version() -> String {
    "5.131".to_string()
}

fn default_base_url() -> String {
    "https://api.vk.com/method/".to_string()
}

fn default_followers_limit() -> u32 {
    10
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "neo4j".to_string()
}

fn default_depth() -> u32 {
    2
}

fn default_output_dir() -> String {
    "user".to_string()
}

impl Default for VkSettings {
    fn default() -> Self {
        Self {
            token: None,
            api_version: default_api_version(),
            base_url: default_base_url(),
            followers_limit: default_followers_limit(),
        }
    }
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_neo4j_uri(),
            user: default_neo4j_user(),
            password: default_neo4j_password(),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            dedupe: false,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Settings {
    /// Load `.env` (or `env_file` when given), then build settings from the
    /// config file named by `file_prefix` and the process environment.
    pub fn load(file_prefix: &str, env_file: Option<&Path>) -> Result<Self> {
        match env_file {
            Some(path) => {
                dotenv::from_path(path).map_err(|e| {
                    CoreError::Config(format!("failed to load {}: {e}", path.display()))
                })?;
            }
            None => {
                dotenv::dotenv().ok();
            }
        }

        Self::from_sources(file_prefix, |name| std::env::var(name).ok())
    }

    /// Build settings from a config file and environment lookups.
    /// `legacy` resolves the flat variable names listed in [`LEGACY_VARS`].
    pub fn from_sources<F>(file_prefix: &str, legacy: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(config::Environment::with_prefix("VKGRAPH").separator("__"));

        for (key, names) in LEGACY_VARS {
            let value = names
                .iter()
                .find_map(|name| legacy(name).filter(|v| !v.is_empty()));
            builder = builder.set_override_option(*key, value)?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}

impl VkSettings {
    /// The access token, or a fatal error when it is absent.
    pub fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(CoreError::MissingCredentials(
                "VK access token not set (VK_TOKEN or vk.token)",
            ))
    }
}
