//! Session Manager for navdesk.
//!
//! In-memory map from opaque token to the logged-in [`Actor`]. Tokens are
//! handed to RPC callers at login and resolved on every mutating call; the
//! resolved actor is passed explicitly into lifecycle operations.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::types::user::Actor;

/// A live login.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub actor: Actor,
    pub login_time: DateTime<Utc>,
}

/// Trait defining session store operations.
pub trait SessionManagerTrait {
    /// Opens a session and returns its token.
    fn login(&mut self, actor: Actor) -> String;
    /// Closes a session. Returns the actor that owned it, if any.
    fn logout(&mut self, token: &str) -> Option<Actor>;
    /// Looks up a live session, dropping it if expired.
    fn resolve(&mut self, token: &str) -> Option<Session>;
    fn active_sessions(&self) -> usize;
}

/// Session store with a fixed time-to-live.
pub struct SessionManager {
    sessions: HashMap<String, Session>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(ttl_days: i64) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl: Duration::days(ttl_days),
        }
    }

    fn resolve_at(&mut self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let expired = match self.sessions.get(token) {
            Some(session) => now - session.login_time > self.ttl,
            None => return None,
        };
        if expired {
            if let Some(session) = self.sessions.remove(token) {
                info!(user = %session.actor.username, "session expired");
            }
            return None;
        }
        self.sessions.get(token).cloned()
    }
}

impl SessionManagerTrait for SessionManager {
    fn login(&mut self, actor: Actor) -> String {
        let token = Uuid::new_v4().to_string();
        info!(user = %actor.username, role = %actor.role, "session opened");
        self.sessions.insert(
            token.clone(),
            Session {
                actor,
                login_time: Utc::now(),
            },
        );
        token
    }

    fn logout(&mut self, token: &str) -> Option<Actor> {
        let session = self.sessions.remove(token)?;
        info!(user = %session.actor.username, "session closed");
        Some(session.actor)
    }

    fn resolve(&mut self, token: &str) -> Option<Session> {
        self.resolve_at(token, Utc::now())
    }

    fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
