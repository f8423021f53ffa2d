//! VK API client.
//!
//! Three GET methods are used: `users.get`, `users.getFollowers`, and
//! `users.getSubscriptions`. Every response is an envelope holding either a
//! `response` payload or an `error` object; the latter is a failure.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use vkgraph_core::config::VkSettings;

/// Profile fields requested from `users.get`.
const USER_FIELDS: &str = "screen_name,sex,city,home_town,followers_count";

/// Errors from the VK API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {method} failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("VK API error: {message} (code {code})")]
    Remote { code: i64, message: String },

    #[error("Malformed {method} response: {reason}")]
    Malformed {
        method: &'static str,
        reason: String,
    },

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Client setup failed: {0}")]
    Setup(String),
}

/// Source of raw profile data. Payloads are returned as parsed JSON so the
/// snapshot writer can keep them verbatim.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// The first `users.get` entry for `user_id` (numeric id or screen name).
    async fn user_info(&self, user_id: &str) -> Result<Value, ApiError>;

    /// `items` of `users.getFollowers`.
    async fn followers(&self, user_id: &str) -> Result<Vec<Value>, ApiError>;

    /// `items` of `users.getSubscriptions` with `extended=1`.
    async fn subscriptions(&self, user_id: &str) -> Result<Vec<Value>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    response: Option<Value>,
    #[serde(default)]
    error: Option<RemoteError>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    #[serde(default)]
    error_code: i64,
    #[serde(default = "unknown_error")]
    error_msg: String,
}

fn unknown_error() -> String {
    "Unknown error".to_string()
}

impl Envelope {
    fn into_payload(self, method: &'static str) -> Result<Value, ApiError> {
        if let Some(err) = self.error {
            return Err(ApiError::Remote {
                code: err.error_code,
                message: err.error_msg,
            });
        }
        self.response.ok_or_else(|| ApiError::Malformed {
            method,
            reason: "neither response nor error present".to_string(),
        })
    }
}

/// Decode a raw response body into its payload.
pub fn decode_envelope(method: &'static str, body: &[u8]) -> Result<Value, ApiError> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(|e| ApiError::Malformed {
        method,
        reason: e.to_string(),
    })?;
    envelope.into_payload(method)
}

/// Take the `items` array out of a list payload; anything else is empty.
fn into_items(payload: Value) -> Vec<Value> {
    match payload {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Take the first entry of a `users.get` payload.
fn first_user(payload: Value, user_id: &str) -> Result<Value, ApiError> {
    match payload {
        Value::Array(users) => users
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::UserNotFound(user_id.to_string())),
        other => Err(ApiError::Malformed {
            method: "users.get",
            reason: format!("expected an array, got {other}"),
        }),
    }
}

/// HTTP client for the VK API.
#[derive(Clone)]
pub struct VkClient {
    http: Client,
    base_url: Url,
    token: String,
    version: String,
    followers_limit: u32,
}

impl fmt::Debug for VkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VkClient")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl VkClient {
    /// Build a client from settings, with an already validated token.
    pub fn from_settings(token: &str, settings: &VkSettings) -> Result<Self, ApiError> {
        let mut base = settings.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| ApiError::Setup(format!("{base}: {e}")))?;

        let http = Client::builder()
            .user_agent(concat!("vkgraph/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
            version: settings.api_version.clone(),
            followers_limit: settings.followers_limit,
        })
    }

    async fn call(
        &self,
        method: &'static str,
        params: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let url = self
            .base_url
            .join(method)
            .map_err(|e| ApiError::Setup(e.to_string()))?;
        debug!(method, "VK API request");

        let result = self.fetch(method, url, params).await;
        match &result {
            Err(ApiError::Remote { code, message }) => {
                warn!(method, code, message = %message, "VK API returned an error");
            }
            Err(e) => warn!(method, error = %e, "VK API request failed"),
            Ok(_) => {}
        }
        result
    }

    async fn fetch(
        &self,
        method: &'static str,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let body = self
            .http
            .get(url)
            .query(params)
            .query(&[("access_token", &self.token), ("v", &self.version)])
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|source| ApiError::Transport {
                method,
                source: source.without_url(),
            })?
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                method,
                source: source.without_url(),
            })?;

        decode_envelope(method, &body)
    }
}

#[async_trait]
impl ProfileSource for VkClient {
    async fn user_info(&self, user_id: &str) -> Result<Value, ApiError> {
        let payload = self
            .call(
                "users.get",
                &[
                    ("user_ids", user_id.to_string()),
                    ("fields", USER_FIELDS.to_string()),
                ],
            )
            .await?;
        first_user(payload, user_id)
    }

    async fn followers(&self, user_id: &str) -> Result<Vec<Value>, ApiError> {
        let payload = self
            .call(
                "users.getFollowers",
                &[
                    ("user_id", user_id.to_string()),
                    ("count", self.followers_limit.to_string()),
                ],
            )
            .await?;
        Ok(into_items(payload))
    }

    async fn subscriptions(&self, user_id: &str) -> Result<Vec<Value>, ApiError> {
        let payload = self
            .call(
                "users.getSubscriptions",
                &[("user_id", user_id.to_string()), ("extended", "1".to_string())],
            )
            .await?;
        Ok(into_items(payload))
    }
}
