//! Identity provider seam.
//!
//! The provider owns account credentials, token verification, and session
//! cookie minting. Call sites see only the trait: a cookie goes in, a uid
//! comes out; how validity (signature, expiry, revocation) is checked is
//! the implementation's business.
//!
//! Carried in `AppState` as `Arc<dyn IdentityProvider>`; swapped at startup
//! via the `IDENTITY_BACKEND` env var.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod firebase;
pub mod memory;

pub use firebase::FirebaseIdentity;
pub use memory::MemoryIdentity;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity token rejected by provider")]
    InvalidToken,

    #[error("session cookie expired")]
    Expired,

    #[error("session revoked")]
    Revoked,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },
}

/// An account record as the provider knows it.
#[derive(Debug, Clone)]
pub struct IdentityUser {
    pub uid: String,
    pub email: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the provider account for an email address, if any.
    async fn get_user_by_email(&self, email: &str)
        -> Result<Option<IdentityUser>, IdentityError>;

    /// Exchanges a verified client-side identity token for an opaque signed
    /// session cookie valid for `ttl`. `InvalidToken` if the provider
    /// rejects the token.
    async fn create_session_cookie(
        &self,
        id_token: &str,
        ttl: Duration,
    ) -> Result<String, IdentityError>;

    /// Verifies a session cookie (signature, expiry, revocation) and returns
    /// the uid it was minted for.
    async fn verify_session_cookie(&self, cookie: &str) -> Result<String, IdentityError>;
}
