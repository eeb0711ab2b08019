// SPDX-License-Identifier: Apache-2.0

//! Retry logic with exponential backoff for transient failures.
//!
//! Transient GitHub page fetches and AI provider calls are wrapped in a
//! short exponential backoff; everything else fails fast.

use backon::ExponentialBuilder;

use crate::error::RampupError;

/// Determines if an HTTP status code is retryable.
///
/// Retryable status codes: 429, 500, 502, 503, 504.
#[must_use]
pub fn is_retryable_http(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Determines if an octocrab error is retryable.
///
/// GitHub errors with transient status codes, service errors, and hyper
/// (network) errors are retried. 403 is included for GitHub secondary
/// rate limits.
#[must_use]
pub fn is_retryable_octocrab(e: &octocrab::Error) -> bool {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            matches!(
                source.status_code.as_u16(),
                429 | 500 | 502 | 503 | 504 | 403
            )
        }
        octocrab::Error::Service { .. } | octocrab::Error::Hyper { .. } => true,
        _ => false,
    }
}

/// Determines if an anyhow error is retryable.
///
/// Checks the error chain for a retryable HTTP status, a network error,
/// or a retryable [`RampupError`] variant.
#[must_use]
pub fn is_retryable_anyhow(e: &anyhow::Error) -> bool {
    if let Some(oct_err) = e.downcast_ref::<octocrab::Error>() {
        return is_retryable_octocrab(oct_err);
    }

    if let Some(req_err) = e.downcast_ref::<reqwest::Error>() {
        if req_err.is_timeout() || req_err.is_connect() {
            return true;
        }
        if let Some(status) = req_err.status() {
            return is_retryable_http(status.as_u16());
        }
    }

    if let Some(err) = e.downcast_ref::<RampupError>() {
        return matches!(
            err,
            RampupError::RateLimited { .. } | RampupError::TruncatedResponse { .. }
        );
    }

    false
}

/// Creates a configured exponential backoff builder for retries.
///
/// Factor 2, min delay 1s, 3 attempts, jitter enabled.
#[must_use]
pub fn retry_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_factor(2.0)
        .with_min_delay(std::time::Duration::from_secs(1))
        .with_max_times(3)
        .with_jitter()
}
