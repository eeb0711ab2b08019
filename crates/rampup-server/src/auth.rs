// SPDX-License-Identifier: Apache-2.0

//! Credential resolution from environment variables.

use secrecy::SecretString;

use rampup_core::{KeyResolver, RampupError, types::ProviderKind};

/// Resolves credentials from environment variables.
///
/// Reads `GITHUB_TOKEN` for GitHub API access and the per-provider key
/// variables (`ANTHROPIC_API_KEY`, `OPENAI_API_KEY`, `GOOGLE_API_KEY`,
/// `GROQ_API_KEY`) for AI access.
pub struct EnvKeys;

impl KeyResolver for EnvKeys {
    fn key_for(&self, provider: ProviderKind) -> rampup_core::Result<SecretString> {
        let env_var = provider.api_key_env();
        std::env::var(env_var)
            .ok()
            .filter(|v| !v.is_empty())
            .map(SecretString::from)
            .ok_or_else(|| RampupError::MissingApiKey {
                provider: provider.to_string(),
                env_var: env_var.to_string(),
            })
    }

    fn github_token(&self) -> Option<SecretString> {
        std::env::var("GITHUB_TOKEN").ok().map(SecretString::from)
    }
}
