// SPDX-License-Identifier: Apache-2.0

//! AI provider trait and shared implementations.
//!
//! Defines the `ChatModel` trait that all backends implement, with default
//! implementations for request sending, structured-response parsing with
//! retry, and streaming chat.

use anyhow::{Context, Result};
use async_trait::async_trait;
use backon::Retryable;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use super::sse;
use super::types::{BatchAnalysisResponse, ChatCompletionRequest, ChatCompletionResponse};
use crate::error::RampupError;
use crate::retry::{is_retryable_anyhow, retry_backoff};

/// Parses JSON response from an AI provider, detecting truncated responses.
///
/// EOF errors (response cut off mid-JSON) become a retryable
/// `TruncatedResponse`; other JSON errors are wrapped as `InvalidAiResponse`.
fn parse_ai_json<T: serde::de::DeserializeOwned>(text: &str, provider: &str) -> Result<T> {
    match serde_json::from_str::<T>(text) {
        Ok(value) => Ok(value),
        Err(e) if e.is_eof() => Err(anyhow::anyhow!(RampupError::TruncatedResponse {
            provider: provider.to_string(),
        })),
        Err(e) => Err(anyhow::anyhow!(RampupError::InvalidAiResponse(e))),
    }
}

/// Turns a non-success HTTP response into the matching error.
///
/// 401 means a bad key, 429 carries the Retry-After hint; anything else
/// surfaces the response body.
async fn error_for_status(
    name: &str,
    api_key_env: &str,
    response: reqwest::Response,
) -> anyhow::Error {
    let status = response.status().as_u16();
    match status {
        401 => {
            anyhow::anyhow!("Invalid {name} API key. Check your {api_key_env} environment variable.")
        }
        429 => {
            warn!("Rate limited by {name} API");
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);
            anyhow::anyhow!(RampupError::RateLimited {
                provider: name.to_string(),
                retry_after,
            })
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            anyhow::anyhow!(RampupError::Ai {
                message: body,
                status: Some(status),
                provider: name.to_string(),
            })
        }
    }
}

/// Interchangeable AI backend for classification and chat.
///
/// Backends provide connection details; shared request/parse/stream logic
/// lives in the default implementations.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the name of the provider (e.g. "groq").
    fn name(&self) -> &str;

    /// Returns the chat-completions URL for this provider.
    fn api_url(&self) -> &str;

    /// Returns the environment variable name for the API key.
    fn api_key_env(&self) -> &str;

    /// Returns the HTTP client for making requests.
    fn http_client(&self) -> &Client;

    /// Returns the API key for authentication.
    fn api_key(&self) -> &SecretString;

    /// Returns the model name.
    fn model(&self) -> &str;

    /// Returns the maximum tokens for classification responses.
    fn max_tokens(&self) -> u32;

    /// Returns the temperature for classification requests.
    fn temperature(&self) -> f32;

    /// Builds extra HTTP headers for API requests.
    ///
    /// Default implementation sets Content-Type; providers can override
    /// to add custom headers.
    fn build_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(val) = "application/json".parse() {
            headers.insert("Content-Type", val);
        }
        headers
    }

    /// Sends a chat completion request (HTTP-only, no retry).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, invalid credentials (401),
    /// rate limits (429), or any other non-success status.
    async fn send_request_inner(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let mut req = self
            .http_client()
            .post(self.api_url())
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key().expose_secret()),
            );

        for (key, value) in &self.build_headers() {
            req = req.header(key.clone(), value.clone());
        }

        let response = req
            .json(request)
            .send()
            .await
            .context(format!("Failed to send request to {} API", self.name()))?;

        if !response.status().is_success() {
            return Err(error_for_status(self.name(), self.api_key_env(), response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context(format!("Failed to parse {} API response", self.name()))?;

        Ok(completion)
    }

    /// Sends a request and parses the structured batch-analysis response.
    ///
    /// HTTP request and JSON parsing share one retry loop so truncated
    /// responses are retried along with transient transport errors.
    ///
    /// # Errors
    ///
    /// Returns an error when retries are exhausted or the response is not
    /// valid batch-analysis JSON.
    async fn complete_batch(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<BatchAnalysisResponse> {
        let parsed: BatchAnalysisResponse = (|| async {
            let completion = self.send_request_inner(request).await?;

            let content = completion
                .choices
                .first()
                .map(|c| c.message.content.clone())
                .context("No response from AI model")?;

            debug!(response_length = content.len(), "Received AI response");

            parse_ai_json(&content, self.name())
        })
        .retry(retry_backoff())
        .when(is_retryable_anyhow)
        .notify(|err, dur| warn!(error = %err, delay = ?dur, "Retrying after error"))
        .await?;

        Ok(parsed)
    }

    /// Opens a streaming chat completion and returns the token stream.
    ///
    /// The stream is a pass-through of the provider's SSE deltas; the
    /// request must have `stream: Some(true)` set by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be opened; mid-stream errors
    /// surface as `Err` items on the stream.
    async fn stream_chat(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<BoxStream<'static, Result<String>>> {
        let mut req = self
            .http_client()
            .post(self.api_url())
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key().expose_secret()),
            );

        for (key, value) in &self.build_headers() {
            req = req.header(key.clone(), value.clone());
        }

        let response = req
            .json(request)
            .send()
            .await
            .context(format!("Failed to send request to {} API", self.name()))?;

        if !response.status().is_success() {
            return Err(error_for_status(self.name(), self.api_key_env(), response).await);
        }

        debug!(provider = self.name(), "Streaming chat response");

        Ok(sse::token_stream(response.bytes_stream().boxed()))
    }
}
