//! Note summarization.
//!
//! Without an `OPENAI_API_KEY` a [`MockSummarizer`] answers after a fixed
//! delay. With a key, [`OpenAiSummarizer`] calls a chat completions API and
//! degrades to canned text on any provider failure. Either way callers always
//! get a summary string back.

mod mock;
mod openai;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{config::Config, Error, Result};

pub use mock::MockSummarizer;
pub use openai::{OpenAiConfig, OpenAiSummarizer, ProviderError};
pub use routes::{router, SummarizeRequest, SummarizeResponse};

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, content: &str) -> String;
}

pub type SharedSummarizer = Arc<dyn Summarizer>;

pub fn from_config(config: &Config) -> Result<SharedSummarizer> {
    let api_key = config.openai_api_key.as_deref().map(str::trim).filter(|key| !key.is_empty());

    let Some(api_key) = api_key else {
        tracing::info!(delay_ms = config.mock_summary_delay_ms, "summarizer: mock");
        return Ok(Arc::new(MockSummarizer::from_millis(config.mock_summary_delay_ms)));
    };

    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| Error::App(e.into()))?;

    tracing::info!(model = %config.openai_model, base_url = %config.openai_base_url, "summarizer: openai");

    Ok(Arc::new(OpenAiSummarizer::new(
        client,
        OpenAiConfig {
            api_key: api_key.to_owned(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
        },
    )))
}

/// Used when the provider fails for any reason other than quota.
pub fn fallback_summary(content: &str) -> String {
    let head = content.chars().take(60).collect::<String>();
    format!("📝 Mock Summary (fallback): {head}...")
}
