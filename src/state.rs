use deadpool_postgres::Pool;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::llm::{gemini::GeminiProvider, openai::OpenAiProvider, ChatProvider};

/// Timeout applied to every upstream provider call.
const PROVIDER_TIMEOUT_SECS: u64 = 30;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: Pool,
    /// The application's configuration.
    pub config: Config,
    /// The OpenAI chat backend.
    pub openai: Arc<dyn ChatProvider>,
    /// The Gemini chat backend.
    pub gemini: Arc<dyn ChatProvider>,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL pool initialized with deadpool-postgres");

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let openai: Arc<dyn ChatProvider> = Arc::new(OpenAiProvider::new(
            http.clone(),
            config.openai_api_key.clone(),
        ));
        let gemini: Arc<dyn ChatProvider> = Arc::new(GeminiProvider::new(
            http,
            config.gemini_api_key.clone(),
        ));
        tracing::info!("✅ Chat providers initialized");

        Ok(AppState {
            db,
            config: config.clone(),
            openai,
            gemini,
        })
    }
}
