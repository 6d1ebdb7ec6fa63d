//! Sign-up and sign-in: the credential issuer.

use std::sync::Arc;
use tracing::info;

use crate::auth::cookie::SessionCookie;
use crate::auth::session::SessionManager;
use crate::auth::AuthError;
use crate::identity::IdentityProvider;
use crate::models::user::User;
use crate::store::DocumentStore;

/// Creates the user record for a provider-issued uid. The uid originates in
/// the identity provider, so a collision can only be the same identity
/// signing up twice; the store's conditional write turns that into a clean
/// `UserExists` instead of a lost race.
pub async fn sign_up(
    store: &Arc<dyn DocumentStore>,
    uid: &str,
    name: &str,
    email: &str,
) -> Result<(), AuthError> {
    let created = store
        .create_user(&User {
            id: uid.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        })
        .await?;

    if !created {
        return Err(AuthError::UserExists);
    }

    info!("Created user {uid}");
    Ok(())
}

/// Resolves the account for an email with the identity provider, then
/// delegates to the session manager to mint the cookie.
pub async fn sign_in(
    identity: &Arc<dyn IdentityProvider>,
    sessions: &SessionManager,
    email: &str,
    id_token: &str,
) -> Result<SessionCookie, AuthError> {
    let account = identity.get_user_by_email(email).await?;
    if account.is_none() {
        return Err(AuthError::UserNotFound);
    }

    sessions.issue(id_token).await
}
