//! In-process identity backend for local development and tests.
//!
//! Mints opaque random tokens and tracks sessions in maps. The lifecycle
//! mirrors the hosted provider: id tokens are exchanged for session cookies
//! with a TTL, and verification fails on unknown, expired, or revoked
//! cookies. Test helpers can force-expire or revoke a session.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::Duration;
use uuid::Uuid;

use crate::identity::{IdentityError, IdentityProvider, IdentityUser};

#[derive(Debug, Clone)]
struct SessionRecord {
    uid: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemoryIdentity {
    /// uid -> account
    users: RwLock<HashMap<String, IdentityUser>>,
    /// id token -> uid
    id_tokens: RwLock<HashMap<String, String>>,
    /// session cookie -> session
    sessions: RwLock<HashMap<String, SessionRecord>>,
    revoked: RwLock<HashSet<String>>,
}

#[allow(dead_code)] // lifecycle helpers are exercised by tests only
impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account and returns a fresh id token for it, as if the
    /// client had just completed a credential check with the provider.
    pub fn register_user(&self, uid: &str, email: &str) -> String {
        self.users.write().unwrap().insert(
            uid.to_string(),
            IdentityUser {
                uid: uid.to_string(),
                email: email.to_string(),
            },
        );
        self.issue_id_token(uid)
    }

    /// Issues a new id token for an already-registered uid.
    pub fn issue_id_token(&self, uid: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.id_tokens
            .write()
            .unwrap()
            .insert(token.clone(), uid.to_string());
        token
    }

    /// Backdates a session's expiry so the next verification fails.
    pub fn expire_session(&self, cookie: &str) {
        if let Some(session) = self.sessions.write().unwrap().get_mut(cookie) {
            session.expires_at = Utc::now() - ChronoDuration::seconds(1);
        }
    }

    /// Revokes a session cookie provider-side.
    pub fn revoke_session(&self, cookie: &str) {
        self.revoked.write().unwrap().insert(cookie.to_string());
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<IdentityUser>, IdentityError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_session_cookie(
        &self,
        id_token: &str,
        ttl: Duration,
    ) -> Result<String, IdentityError> {
        let uid = self
            .id_tokens
            .read()
            .unwrap()
            .get(id_token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)?;

        let cookie = Uuid::new_v4().simple().to_string();
        self.sessions.write().unwrap().insert(
            cookie.clone(),
            SessionRecord {
                uid,
                expires_at: Utc::now() + ChronoDuration::seconds(ttl.as_secs() as i64),
            },
        );
        Ok(cookie)
    }

    async fn verify_session_cookie(&self, cookie: &str) -> Result<String, IdentityError> {
        if self.revoked.read().unwrap().contains(cookie) {
            return Err(IdentityError::Revoked);
        }
        let session = self
            .sessions
            .read()
            .unwrap()
            .get(cookie)
            .cloned()
            .ok_or(IdentityError::InvalidToken)?;
        if session.expires_at <= Utc::now() {
            return Err(IdentityError::Expired);
        }
        Ok(session.uid)
    }
}
