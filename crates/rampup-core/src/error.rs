// SPDX-License-Identifier: Apache-2.0

//! Error types for rampup.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use thiserror::Error;

/// Errors that can occur during rampup operations.
#[derive(Error, Debug)]
pub enum RampupError {
    /// The repository reference could not be parsed.
    #[error(
        "Invalid GitHub repository URL: {input}\n\
         Expected https://github.com/owner/repo or owner/repo"
    )]
    InvalidRepoRef {
        /// The input that failed to parse.
        input: String,
    },

    /// Repository does not exist or is not publicly visible.
    #[error("Repository {owner}/{repo} not found or is private")]
    RepoNotFound {
        /// Repository owner.
        owner: String,
        /// Repository name.
        repo: String,
    },

    /// GitHub primary or secondary rate limit was hit.
    #[error("GitHub API rate limit exceeded. Please try again later or use a GitHub token.")]
    GitHubRateLimited,

    /// Any other GitHub API error from octocrab.
    #[error("Failed to fetch from GitHub: {message}")]
    GitHub {
        /// Error message.
        message: String,
    },

    /// No API key available for the selected AI provider.
    #[error("API key required for {provider}. Provide one in the request or set {env_var}")]
    MissingApiKey {
        /// Provider name (e.g. `anthropic`).
        provider: String,
        /// Environment variable consulted.
        env_var: String,
    },

    /// AI provider error (auth, HTTP failure, malformed payload).
    #[error("AI provider error from {provider}: {message}")]
    Ai {
        /// Error message from the AI provider.
        message: String,
        /// Optional HTTP status code from the provider.
        status: Option<u16>,
        /// Name of the AI provider (e.g. `groq`).
        provider: String,
    },

    /// Rate limit exceeded on an AI provider.
    #[error("Rate limit exceeded on {provider}, retry after {retry_after}s")]
    RateLimited {
        /// Name of the provider that rate limited.
        provider: String,
        /// Number of seconds to wait before retrying.
        retry_after: u64,
    },

    /// AI response was truncated (incomplete JSON due to EOF).
    #[error("Truncated response from {provider} - response ended prematurely")]
    TruncatedResponse {
        /// Name of the AI provider that returned truncated response.
        provider: String,
    },

    /// Invalid JSON response from an AI provider.
    #[error("Invalid JSON response from AI")]
    InvalidAiResponse(#[source] serde_json::Error),

    /// No analysis job exists for the given id.
    #[error("Analysis {id} not found")]
    JobNotFound {
        /// Job identifier.
        id: String,
    },

    /// The job has not reached the Complete state yet.
    #[error("Analysis must be complete before chatting")]
    AnalysisIncomplete,

    /// Network/HTTP error from reqwest.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<octocrab::Error> for RampupError {
    fn from(err: octocrab::Error) -> Self {
        RampupError::GitHub {
            message: err.to_string(),
        }
    }
}

/// Maps a GitHub HTTP status (when one is available) to a distinct error.
///
/// 404 becomes [`RampupError::RepoNotFound`], 403/429 become
/// [`RampupError::GitHubRateLimited`], everything else keeps the raw message.
#[must_use]
pub fn classify_github_error(
    status: Option<u16>,
    message: String,
    owner: &str,
    repo: &str,
) -> RampupError {
    match status {
        Some(404) => RampupError::RepoNotFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
        },
        Some(403 | 429) => RampupError::GitHubRateLimited,
        _ => RampupError::GitHub { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_not_found_message_names_visibility() {
        let err = classify_github_error(Some(404), "Not Found".into(), "octo", "nope");
        assert!(err.to_string().contains("octo/nope not found or is private"));
    }

    #[test]
    fn forbidden_and_too_many_requests_map_to_rate_limit() {
        for status in [403, 429] {
            let err = classify_github_error(Some(status), String::new(), "o", "r");
            assert!(matches!(err, RampupError::GitHubRateLimited));
        }
    }

    #[test]
    fn other_statuses_keep_the_message() {
        let err = classify_github_error(Some(500), "boom".into(), "o", "r");
        assert!(err.to_string().contains("boom"));
        let err = classify_github_error(None, "offline".into(), "o", "r");
        assert!(err.to_string().contains("offline"));
    }
}
