use std::env;
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The port the server listens on.
    pub port: u16,
    /// The secret that signs access tokens.
    pub jwt_secret: Zeroizing<String>,
    /// The secret that signs refresh tokens. Falls back to `jwt_secret`
    /// when JWT_REFRESH_SECRET is not set.
    pub jwt_refresh_secret: Zeroizing<String>,
    /// Access token lifetime in days.
    pub jwt_expire_days: i64,
    /// Refresh token lifetime in days.
    pub jwt_refresh_expire_days: i64,
    /// The OpenAI API key, if configured.
    pub openai_api_key: Option<String>,
    /// The Gemini API key, if configured.
    pub gemini_api_key: Option<String>,
    /// Global cap on stored chat generations across all users.
    pub chat_request_limit: i64,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .context("JWT_SECRET must be set (generate with: openssl rand -hex 32)")?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters");
        }

        let jwt_refresh_secret = env::var("JWT_REFRESH_SECRET").unwrap_or_else(|_| jwt_secret.clone());

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("Invalid PORT")?,
            jwt_secret: Zeroizing::new(jwt_secret),
            jwt_refresh_secret: Zeroizing::new(jwt_refresh_secret),
            jwt_expire_days: env::var("JWT_EXPIRE_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("Invalid JWT_EXPIRE_DAYS")?,
            jwt_refresh_expire_days: env::var("JWT_REFRESH_EXPIRE_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .context("Invalid JWT_REFRESH_EXPIRE_DAYS")?,
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            chat_request_limit: env::var("CHAT_REQUEST_LIMIT")
                .unwrap_or_else(|_| "250".to_string())
                .parse()
                .context("Invalid CHAT_REQUEST_LIMIT")?,
        })
    }
}
