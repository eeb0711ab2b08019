// SPDX-License-Identifier: Apache-2.0

//! Anthropic API client.
//!
//! Uses Anthropic's OpenAI SDK compatibility endpoint so it shares the
//! chat-completions wire shape with the other backends.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;

use super::provider::ChatModel;
use super::{ANTHROPIC_API_KEY_ENV, ANTHROPIC_API_URL};
use crate::config::AiConfig;
use crate::types::ProviderKind;

/// Anthropic API client.
pub struct AnthropicClient {
    /// HTTP client with configured timeout.
    http: Client,
    /// API key for Anthropic authentication.
    api_key: SecretString,
    /// Model name (e.g. "claude-sonnet-4-20250514").
    model: String,
    /// Maximum tokens for API responses.
    max_tokens: u32,
    /// Temperature for API requests.
    temperature: f32,
}

impl AnthropicClient {
    /// Creates a new Anthropic client with a provided API key.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn with_api_key(api_key: SecretString, config: &AiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| ProviderKind::Anthropic.default_model().to_string()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn api_url(&self) -> &str {
        ANTHROPIC_API_URL
    }

    fn api_key_env(&self) -> &str {
        ANTHROPIC_API_KEY_ENV
    }

    fn http_client(&self) -> &Client {
        &self.http
    }

    fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }
}
