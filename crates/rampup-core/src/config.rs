// SPDX-License-Identifier: Apache-2.0

//! Configuration objects for the analysis pipeline and AI requests.
//!
//! The service is environment-driven: these structs carry defaults and are
//! overridden programmatically by the server, not loaded from files.

use serde::Deserialize;

/// Batch policy for the analysis pipeline.
///
/// Declares the knobs the orchestration loop runs on: batch size, the fixed
/// inter-batch delay, and the bounds on how many issues one job may fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchPolicy {
    /// Issues per classification request.
    pub batch_size: usize,
    /// Fixed delay between batches, in milliseconds. Omitted after the last batch.
    pub batch_delay_ms: u64,
    /// Issues fetched when the request does not say otherwise.
    pub default_max_issues: usize,
    /// Upper bound on issues fetched per job.
    pub max_issues_limit: usize,
    /// Page size for issue pagination.
    pub page_size: u8,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_delay_ms: 500,
            default_max_issues: 20,
            max_issues_limit: 100,
            page_size: 30,
        }
    }
}

impl BatchPolicy {
    /// Clamps a requested issue count to `1..=max_issues_limit`,
    /// falling back to the default when absent.
    #[must_use]
    pub fn clamp_max_issues(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_max_issues)
            .clamp(1, self.max_issues_limit)
    }
}

/// AI request settings shared by all provider adapters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Model identifier override; `None` uses the provider's default model.
    pub model: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum tokens for API responses.
    pub max_tokens: u32,
    /// Temperature for API requests (0.0-1.0).
    pub temperature: f32,
    /// Maximum tokens for chat replies.
    pub chat_max_tokens: u32,
    /// Temperature for chat replies.
    pub chat_temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: None,
            timeout_seconds: 60,
            max_tokens: 4096,
            temperature: 0.3,
            chat_max_tokens: 1000,
            chat_temperature: 0.7,
        }
    }
}
