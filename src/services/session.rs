use crate::config::MAX_SESSION_LIFETIME;
use crate::services::auth::generate_session_token;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

pub const SESSION_COOKIE: &str = "gallerist_session";

#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    /// Issued through the admin secret.
    pub elevated: bool,
    expires_at: Instant,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory sessions keyed by an opaque random token.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            lifetime: lifetime.min(MAX_SESSION_LIFETIME),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn create(&self, username: &str, elevated: bool) -> String {
        let token = generate_session_token();
        let session = Session {
            username: username.to_string(),
            elevated,
            expires_at: Instant::now() + self.lifetime,
        };
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), session);
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        let session = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()?;
        if session.is_expired() {
            self.remove(token);
            return None;
        }
        Some(session)
    }

    /// Replaces `token` with a fresh elevated session for the same user.
    pub fn elevate(&self, token: &str) -> Option<String> {
        let session = self.get(token)?;
        self.remove(token);
        Some(self.create(&session.username, true))
    }

    pub fn remove(&self, token: &str) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }

    pub fn cleanup(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        before - sessions.len()
    }
}
