use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level key in `users.json` that holds the session secret instead of a user.
pub const SECRET_KEY_FIELD: &str = "secretKey";

/// A stored admin account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Parsed contents of `users.json`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDirectory {
    pub users: BTreeMap<String, User>,
    pub secret_key: String,
}

/// The authenticated caller of a mutating operation.
///
/// Lifecycle code only records it in audit logs and never branches on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub username: String,
    pub role: String,
}

impl Actor {
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
        }
    }
}
