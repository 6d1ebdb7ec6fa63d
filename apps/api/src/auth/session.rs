//! Session manager: issues, verifies, and revokes the session credential.
//!
//! Verification is deliberately lossy about failure causes: a missing
//! cookie, an expired or revoked session, a malformed value, a provider
//! error, and a dangling uid all collapse to `None`. Call sites only ever
//! see "authenticated or not"; the cause is logged at debug level.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::auth::cookie::{
    clearing_header_value, SessionCookie, SESSION_TTL_SECS,
};
use crate::auth::AuthError;
use crate::identity::IdentityProvider;
use crate::models::user::User;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct SessionManager {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    secure_cookies: bool,
}

impl SessionManager {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        secure_cookies: bool,
    ) -> Self {
        Self {
            identity,
            store,
            secure_cookies,
        }
    }

    /// Exchanges a verified client-side identity token for a session cookie
    /// valid for one week. `InvalidToken` if the provider rejects the token.
    pub async fn issue(&self, id_token: &str) -> Result<SessionCookie, AuthError> {
        let value = self
            .identity
            .create_session_cookie(id_token, Duration::from_secs(SESSION_TTL_SECS))
            .await?;
        Ok(SessionCookie {
            value,
            secure: self.secure_cookies,
        })
    }

    /// Resolves the user behind a session cookie. `None` on any failure —
    /// absent, expired, revoked, malformed, provider error, or a uid with no
    /// backing user record. Never an error to the caller.
    pub async fn verify(&self, cookie: Option<&str>) -> Option<User> {
        let cookie = cookie?;

        let uid = match self.identity.verify_session_cookie(cookie).await {
            Ok(uid) => uid,
            Err(e) => {
                debug!("Session cookie rejected: {e}");
                return None;
            }
        };

        match self.store.get_user(&uid).await {
            Ok(user) => user,
            Err(e) => {
                debug!("User lookup failed during session verification: {e}");
                None
            }
        }
    }

    /// Set-Cookie value that clears the session. Idempotent; clearing an
    /// already-cleared session is a no-op on the client.
    pub fn revoke(&self) -> String {
        clearing_header_value(self.secure_cookies)
    }

    pub async fn is_authenticated(&self, cookie: Option<&str>) -> bool {
        self.verify(cookie).await.is_some()
    }
}
