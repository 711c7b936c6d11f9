//! OpenAI client configuration with sensible defaults.

use crate::config::OpenAISettings;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client with the configured timeout and optional API base.
///
/// The API key is read from `OPENAI_API_KEY`.
pub fn create_client(settings: &OpenAISettings) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = &settings.api_base {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
