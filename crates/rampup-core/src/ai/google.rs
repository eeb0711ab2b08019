// SPDX-License-Identifier: Apache-2.0

//! Google AI Studio (Gemini) API client.
//!
//! Uses the OpenAI-compatible endpoint for seamless integration.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;

use super::provider::ChatModel;
use super::{GOOGLE_API_KEY_ENV, GOOGLE_API_URL};
use crate::config::AiConfig;
use crate::types::ProviderKind;

/// Google AI Studio API client.
pub struct GoogleClient {
    /// HTTP client with configured timeout.
    http: Client,
    /// API key for Google AI Studio authentication.
    api_key: SecretString,
    /// Model name (e.g. "gemini-1.5-flash").
    model: String,
    /// Maximum tokens for API responses.
    max_tokens: u32,
    /// Temperature for API requests.
    temperature: f32,
}

impl GoogleClient {
    /// Creates a new Google client with a provided API key.
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
                .unwrap_or_else(|| ProviderKind::Google.default_model().to_string()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for GoogleClient {
    fn name(&self) -> &str {
        "google"
    }

    fn api_url(&self) -> &str {
        GOOGLE_API_URL
    }

    fn api_key_env(&self) -> &str {
        GOOGLE_API_KEY_ENV
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
