//! Record mapper: raw VK API objects → vkgraph records.
//!
//! Only a fixed subset of each object is kept. Everything else the API
//! returns is ignored here (the snapshot writer keeps raw payloads verbatim
//! instead).

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::types::{Group, Profile, Sex, Subscription};

/// Subscription `type` marking a community page.
const PAGE_TYPE: &str = "page";

#[derive(Debug, Deserialize)]
struct RawUser {
    id: i64,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    screen_name: String,
    #[serde(default)]
    sex: i64,
    #[serde(default)]
    city: Option<RawCity>,
}

#[derive(Debug, Deserialize)]
struct RawCity {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    screen_name: String,
}

/// Map a `users.get` entry into a Profile. Fails only when `id` is missing
/// or not an integer.
pub fn map_profile(raw: &Value) -> Result<Profile> {
    let user = RawUser::deserialize(raw)?;
    Ok(Profile {
        id: user.id,
        screen_name: user.screen_name,
        name: format!("{} {}", user.first_name, user.last_name),
        sex: Sex::from_code(user.sex),
        city: user.city.map(|c| c.title).unwrap_or_default(),
    })
}

/// Classify a `users.getSubscriptions` item.
///
/// `type == "page"` always yields a Group. Returns `None` for items that
/// cannot be keyed (no integer `id`).
pub fn classify_subscription(raw: &Value) -> Option<Subscription> {
    if raw.get("type").and_then(Value::as_str) == Some(PAGE_TYPE) {
        return RawGroup::deserialize(raw).ok().map(|g| {
            Subscription::Group(Group {
                id: g.id,
                name: g.name,
                screen_name: g.screen_name,
            })
        });
    }

    raw.get("id").and_then(Value::as_i64).map(Subscription::User)
}

/// Extract a follower id. Items are bare integers unless the request asked
/// for extra fields, in which case they are user objects.
pub fn follower_id(raw: &Value) -> Option<i64> {
    raw.as_i64()
        .or_else(|| raw.get("id").and_then(Value::as_i64))
}
