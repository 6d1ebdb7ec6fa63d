pub mod accounts;
pub mod cookie;
pub mod handlers;
pub mod session;

use thiserror::Error;

use crate::identity::IdentityError;
use crate::store::StoreError;

/// Failures of the sign-up / sign-in flow. Handlers recover every variant
/// into a `{success, message}` response; nothing here reaches the client as
/// an HTTP error.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("identity token rejected")]
    InvalidToken,

    #[error("user already exists")]
    UserExists,

    #[error("no account for that email")]
    UserNotFound,

    #[error(transparent)]
    Identity(IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<IdentityError> for AuthError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::InvalidToken => AuthError::InvalidToken,
            other => AuthError::Identity(other),
        }
    }
}
