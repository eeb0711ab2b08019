// SPDX-License-Identifier: Apache-2.0

//! AI integration module.
//!
//! One adapter per backend, all speaking the OpenAI-compatible
//! chat-completions shape, selected at runtime through [`provider_for`].

use anyhow::Result;
use secrecy::SecretString;

use crate::config::AiConfig;
use crate::types::ProviderKind;

pub mod anthropic;
pub mod classifier;
pub mod google;
pub mod groq;
pub mod openai;
pub mod provider;
pub mod sse;
pub mod types;

pub use classifier::ModelClassifier;
pub use provider::ChatModel;

/// Anthropic chat-completions endpoint (OpenAI SDK compatibility layer).
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/chat/completions";

/// Environment variable for the Anthropic API key.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// OpenAI chat-completions endpoint.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Environment variable for the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Google AI Studio OpenAI-compatible chat-completions endpoint.
pub const GOOGLE_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";

/// Environment variable for the Google AI Studio API key.
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Groq OpenAI-compatible chat-completions endpoint.
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Environment variable for the Groq API key.
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

impl ProviderKind {
    /// Environment variable consulted for this provider's API key.
    #[must_use]
    pub fn api_key_env(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => ANTHROPIC_API_KEY_ENV,
            ProviderKind::OpenAi => OPENAI_API_KEY_ENV,
            ProviderKind::Google => GOOGLE_API_KEY_ENV,
            ProviderKind::Groq => GROQ_API_KEY_ENV,
        }
    }

    /// Model used when the configuration does not override it.
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "claude-sonnet-4-20250514",
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Google => "gemini-1.5-flash",
            ProviderKind::Groq => "meta-llama/llama-4-scout-17b-16e-instruct",
        }
    }
}

/// Constructs the adapter for the selected backend.
///
/// Adding a backend means adding an adapter module and one arm here.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn provider_for(
    kind: ProviderKind,
    api_key: SecretString,
    config: &AiConfig,
) -> Result<Box<dyn ChatModel>> {
    Ok(match kind {
        ProviderKind::Anthropic => {
            Box::new(anthropic::AnthropicClient::with_api_key(api_key, config)?)
        }
        ProviderKind::OpenAi => Box::new(openai::OpenAiClient::with_api_key(api_key, config)?),
        ProviderKind::Google => Box::new(google::GoogleClient::with_api_key(api_key, config)?),
        ProviderKind::Groq => Box::new(groq::GroqClient::with_api_key(api_key, config)?),
    })
}
