// SPDX-License-Identifier: Apache-2.0

//! Groq API client.
//!
//! Default backend: fast inference with a generous free tier, speaking the
//! OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;

use super::provider::ChatModel;
use super::{GROQ_API_KEY_ENV, GROQ_API_URL};
use crate::config::AiConfig;
use crate::types::ProviderKind;

/// Groq API client.
///
/// Holds HTTP client, API key, and model configuration for reuse across
/// multiple requests.
pub struct GroqClient {
    /// HTTP client with configured timeout.
    http: Client,
    /// API key for Groq authentication.
    api_key: SecretString,
    /// Model name (e.g. "meta-llama/llama-4-scout-17b-16e-instruct").
    model: String,
    /// Maximum tokens for API responses.
    max_tokens: u32,
    /// Temperature for API requests.
    temperature: f32,
}

impl GroqClient {
    /// Creates a new Groq client with a provided API key.
    ///
    /// The model falls back to the provider default when the configuration
    /// does not name one.
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
                .unwrap_or_else(|| ProviderKind::Groq.default_model().to_string()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    fn api_url(&self) -> &str {
        GROQ_API_URL
    }

    fn api_key_env(&self) -> &str {
        GROQ_API_KEY_ENV
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
