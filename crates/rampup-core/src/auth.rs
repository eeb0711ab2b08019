// SPDX-License-Identifier: Apache-2.0

//! Credential resolution.
//!
//! The pipeline and chat assistant never read the environment themselves;
//! they go through a [`KeyResolver`] so hosts can plug in their own
//! credential sources (environment, request overrides, keychains).

use secrecy::SecretString;

use crate::Result;
use crate::types::ProviderKind;

/// Source of AI provider keys and the optional GitHub token.
pub trait KeyResolver: Send + Sync {
    /// Resolves the API key for a provider.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::RampupError::MissingApiKey`] when no key is
    /// available for the provider.
    fn key_for(&self, provider: ProviderKind) -> Result<SecretString>;

    /// Resolves the GitHub token, if one is configured.
    ///
    /// Unauthenticated GitHub access works for public repositories at a
    /// much lower rate limit.
    fn github_token(&self) -> Option<SecretString>;
}
