use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub firebase_project_id: String,
    /// Bearer token for Identity Toolkit admin calls. "owner" against the
    /// emulator; unset in environments with a metadata server, where the
    /// provider client mints its own.
    pub firebase_admin_token: Option<String>,
    /// Base URL of the Identity Toolkit REST surface. Overridable so local
    /// runs can point at the auth emulator.
    pub identity_base_url: String,
    /// "firebase" (default) or "memory" for local runs without a provider.
    pub identity_backend: String,
    /// "postgres" (default) or "memory" for local runs without a database.
    pub store_backend: String,
    /// "development" or "production". Session cookies are marked Secure
    /// only outside development.
    pub app_env: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let store_backend = env_or("STORE_BACKEND", "postgres");
        let identity_backend = env_or("IDENTITY_BACKEND", "firebase");

        // Postgres/Firebase credentials are only required when the
        // corresponding backend is selected.
        let database_url = if store_backend == "postgres" {
            require_env("DATABASE_URL")?
        } else {
            std::env::var("DATABASE_URL").unwrap_or_default()
        };
        let firebase_project_id = if identity_backend == "firebase" {
            require_env("FIREBASE_PROJECT_ID")?
        } else {
            String::new()
        };

        Ok(Config {
            database_url,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            firebase_project_id,
            firebase_admin_token: std::env::var("FIREBASE_ADMIN_TOKEN").ok(),
            identity_base_url: env_or(
                "IDENTITY_BASE_URL",
                "https://identitytoolkit.googleapis.com/v1",
            ),
            identity_backend,
            store_backend,
            app_env: env_or("APP_ENV", "development"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Session cookies carry the Secure attribute outside development.
    pub fn secure_cookies(&self) -> bool {
        self.app_env != "development"
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
