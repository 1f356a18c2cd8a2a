//! User models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A realm member as listed by `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The authenticated account, from `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name; this is what other users put in a mention.
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
