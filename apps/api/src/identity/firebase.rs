//! Firebase-backed identity provider.
//!
//! Admin operations (account lookup, session cookie minting) hit the
//! Identity Toolkit REST surface with an OAuth2 bearer token. Session
//! cookies are verified locally: the cookie is an RS256 JWT signed with
//! Google's session-cookie keys, so verification checks the signature
//! against the published key set, the project-scoped audience and issuer,
//! and expiry, then compares the mint time against the account's
//! `validSince` for revocation.
//!
//! The base URL is configurable so local runs can target the auth
//! emulator; there `FIREBASE_ADMIN_TOKEN=owner` stands in for a real
//! service-account token. When no token is configured, admin calls mint
//! one from the GCE/Cloud Run metadata server and cache it until shortly
//! before expiry.

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::identity::{IdentityError, IdentityProvider, IdentityUser};

/// Google publishes the session-cookie signing keys as a JWK set.
const SESSION_COOKIE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/session-cookie@system.gserviceaccount.com";

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh the cached admin token this long before its reported expiry.
const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;

pub struct FirebaseIdentity {
    client: Client,
    base_url: String,
    project_id: String,
    admin_auth: AdminAuth,
    session_keys: RwLock<Option<JwkSet>>,
}

enum AdminAuth {
    /// Fixed token from config ("owner" against the emulator, or a
    /// service-account token minted out of band).
    Static(String),
    /// Token minted by the metadata server, cached until near expiry.
    Metadata(Mutex<Option<CachedToken>>),
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Serialize)]
struct LookupByEmailRequest<'a> {
    email: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupByUidRequest<'a> {
    local_id: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    #[serde(default)]
    email: String,
    /// Seconds since epoch, as a decimal string. Bumped by the provider
    /// when the account's refresh tokens are revoked.
    valid_since: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionCookieRequest<'a> {
    id_token: &'a str,
    /// Seconds, as a decimal string (Identity Toolkit convention).
    valid_duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionCookieResponse {
    session_cookie: String,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Claims carried by a Firebase session cookie that verification needs.
#[derive(Debug, Deserialize)]
struct SessionCookieClaims {
    sub: String,
    iat: i64,
}

impl FirebaseIdentity {
    pub fn new(base_url: String, project_id: String, admin_token: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            project_id,
            admin_auth: match admin_token {
                Some(token) => AdminAuth::Static(token),
                None => AdminAuth::Metadata(Mutex::new(None)),
            },
            session_keys: RwLock::new(None),
        }
    }

    async fn admin_token(&self) -> Result<String, IdentityError> {
        let cache = match &self.admin_auth {
            AdminAuth::Static(token) => return Ok(token.clone()),
            AdminAuth::Metadata(cache) => cache,
        };

        {
            let guard = cache.lock().unwrap();
            if let Some(cached) = guard.as_ref() {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let response = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let minted: MetadataToken = response.json().await?;
        let expires_at = Instant::now()
            + Duration::from_secs(minted.expires_in.saturating_sub(TOKEN_REFRESH_MARGIN_SECS));
        *cache.lock().unwrap() = Some(CachedToken {
            token: minted.access_token.clone(),
            expires_at,
        });
        Ok(minted.access_token)
    }

    async fn post_admin<B: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, IdentityError> {
        let token = self.admin_token().await?;
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            debug!("Identity provider returned {status}: {message}");
            return Err(classify_provider_error(status.as_u16(), message));
        }

        Ok(response.json().await?)
    }

    fn cached_session_jwk(&self, kid: &str) -> Option<Jwk> {
        self.session_keys
            .read()
            .unwrap()
            .as_ref()
            .and_then(|set| set.find(kid))
            .cloned()
    }

    /// Resolves the decoding key for a cookie's `kid`, refreshing the key
    /// set once on a miss (Google rotates keys).
    async fn session_decoding_key(&self, kid: &str) -> Result<DecodingKey, IdentityError> {
        if let Some(jwk) = self.cached_session_jwk(kid) {
            return DecodingKey::from_jwk(&jwk).map_err(|_| IdentityError::InvalidToken);
        }

        let response = self.client.get(SESSION_COOKIE_JWKS_URL).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Provider {
                status: status.as_u16(),
                message,
            });
        }
        let keys: JwkSet = response.json().await?;
        *self.session_keys.write().unwrap() = Some(keys);

        let jwk = self
            .cached_session_jwk(kid)
            .ok_or(IdentityError::InvalidToken)?;
        DecodingKey::from_jwk(&jwk).map_err(|_| IdentityError::InvalidToken)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<IdentityUser>, IdentityError> {
        let response: LookupResponse = self
            .post_admin("accounts:lookup", &LookupByEmailRequest { email: vec![email] })
            .await?;

        Ok(response.users.into_iter().next().map(|u| IdentityUser {
            uid: u.local_id,
            email: u.email,
        }))
    }

    async fn create_session_cookie(
        &self,
        id_token: &str,
        ttl: Duration,
    ) -> Result<String, IdentityError> {
        let path = format!("projects/{}:createSessionCookie", self.project_id);
        let response: CreateSessionCookieResponse = self
            .post_admin(
                &path,
                &CreateSessionCookieRequest {
                    id_token,
                    valid_duration: ttl.as_secs().to_string(),
                },
            )
            .await?;

        Ok(response.session_cookie)
    }

    async fn verify_session_cookie(&self, cookie: &str) -> Result<String, IdentityError> {
        let header = decode_header(cookie).map_err(map_jwt_error)?;
        let kid = header.kid.ok_or(IdentityError::InvalidToken)?;
        let key = self.session_decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[session_issuer(&self.project_id)]);
        let token =
            decode::<SessionCookieClaims>(cookie, &key, &validation).map_err(map_jwt_error)?;
        let claims = token.claims;

        // Revocation is not in the signature: a cookie minted before the
        // account's validSince has been revoked provider-side.
        let response: LookupResponse = self
            .post_admin(
                "accounts:lookup",
                &LookupByUidRequest {
                    local_id: vec![&claims.sub],
                },
            )
            .await?;
        let account = response
            .users
            .into_iter()
            .next()
            .ok_or(IdentityError::InvalidToken)?;
        if revoked_since(claims.iat, account.valid_since.as_deref()) {
            return Err(IdentityError::Revoked);
        }

        Ok(claims.sub)
    }
}

fn session_issuer(project_id: &str) -> String {
    format!("https://session.firebase.google.com/{project_id}")
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> IdentityError {
    match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => IdentityError::Expired,
        _ => IdentityError::InvalidToken,
    }
}

/// Token-shaped rejections surface as InvalidToken so callers keep a single
/// failure path for bad credentials.
fn classify_provider_error(status: u16, message: String) -> IdentityError {
    if message.starts_with("INVALID_ID_TOKEN")
        || message.starts_with("INVALID_SESSION_COOKIE")
        || message.starts_with("TOKEN_EXPIRED")
    {
        IdentityError::InvalidToken
    } else {
        IdentityError::Provider { status, message }
    }
}

fn revoked_since(iat: i64, valid_since: Option<&str>) -> bool {
    valid_since
        .and_then(|s| s.parse::<i64>().ok())
        .map(|since| iat < since)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    fn provider() -> FirebaseIdentity {
        FirebaseIdentity::new(
            "http://localhost:9099/identitytoolkit.googleapis.com/v1".to_string(),
            "demo-project".to_string(),
            Some("owner".to_string()),
        )
    }

    #[test]
    fn test_session_issuer_is_project_scoped() {
        assert_eq!(
            session_issuer("demo-project"),
            "https://session.firebase.google.com/demo-project"
        );
    }

    #[test]
    fn test_expired_signature_maps_to_expired() {
        let e = jsonwebtoken::errors::Error::from(ErrorKind::ExpiredSignature);
        assert!(matches!(map_jwt_error(e), IdentityError::Expired));
    }

    #[test]
    fn test_other_jwt_errors_map_to_invalid_token() {
        let e = jsonwebtoken::errors::Error::from(ErrorKind::InvalidSignature);
        assert!(matches!(map_jwt_error(e), IdentityError::InvalidToken));
        let e = jsonwebtoken::errors::Error::from(ErrorKind::InvalidAudience);
        assert!(matches!(map_jwt_error(e), IdentityError::InvalidToken));
    }

    #[test]
    fn test_token_shaped_rejections_collapse_to_invalid_token() {
        assert!(matches!(
            classify_provider_error(400, "INVALID_ID_TOKEN".to_string()),
            IdentityError::InvalidToken
        ));
        assert!(matches!(
            classify_provider_error(400, "INVALID_SESSION_COOKIE : bad".to_string()),
            IdentityError::InvalidToken
        ));
        assert!(matches!(
            classify_provider_error(400, "TOKEN_EXPIRED".to_string()),
            IdentityError::InvalidToken
        ));
        assert!(matches!(
            classify_provider_error(500, "backend error".to_string()),
            IdentityError::Provider { status: 500, .. }
        ));
    }

    #[test]
    fn test_revocation_compares_mint_time_to_valid_since() {
        assert!(revoked_since(100, Some("200")));
        assert!(!revoked_since(300, Some("200")));
        assert!(!revoked_since(100, None));
        assert!(!revoked_since(100, Some("not-a-number")));
    }

    #[tokio::test]
    async fn test_malformed_cookie_rejected_before_any_network_call() {
        let result = provider().verify_session_cookie("not-a-jwt").await;
        assert!(matches!(result, Err(IdentityError::InvalidToken)));
    }
}
