// SPDX-License-Identifier: Apache-2.0

//! Open-issue fetching for the analysis pipeline.
//!
//! Paginates a repository's open issues in fixed-size pages, newest first,
//! skipping pull requests, and stops at the requested maximum or when a
//! short page signals exhaustion.

use anyhow::anyhow;
use async_trait::async_trait;
use backon::Retryable;
use octocrab::{Octocrab, params};
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::error::classify_github_error;
use crate::pipeline::IssueSource;
use crate::retry::{is_retryable_anyhow, retry_backoff};
use crate::types::Issue;

/// Extracts the HTTP status from an octocrab error, when one exists.
fn octocrab_status(e: &octocrab::Error) -> Option<u16> {
    match e {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

fn to_issue(raw: octocrab::models::issues::Issue) -> Issue {
    Issue {
        number: raw.number,
        title: raw.title,
        body: raw.body,
        labels: raw.labels.into_iter().map(|l| l.name).collect(),
        html_url: raw.html_url.to_string(),
        comments: raw.comments,
        created_at: raw.created_at,
        author: Some(raw.user.login),
    }
}

/// Fetches up to `max_issues` open, non-pull-request issues, newest first.
///
/// A failed page aborts the whole fetch: transient errors are retried with
/// backoff per page, then the error is classified and surfaced. Not-found
/// and rate-limit failures map to distinct error variants.
///
/// # Errors
///
/// Returns [`crate::error::RampupError::RepoNotFound`] for missing/private
/// repositories, [`crate::error::RampupError::GitHubRateLimited`] when the
/// upstream rate limit is hit, and a generic GitHub error otherwise.
#[instrument(skip(client), fields(owner = %owner, repo = %repo, max_issues))]
pub async fn fetch_open_issues(
    client: &Octocrab,
    owner: &str,
    repo: &str,
    max_issues: usize,
    page_size: u8,
) -> Result<Vec<Issue>> {
    let mut issues: Vec<Issue> = Vec::new();
    let mut page_no: u32 = 1;

    while issues.len() < max_issues {
        let page = (|| async {
            client
                .issues(owner, repo)
                .list()
                .state(params::State::Open)
                .sort(params::issues::Sort::Created)
                .direction(params::Direction::Descending)
                .per_page(page_size)
                .page(page_no)
                .send()
                .await
                .map_err(|e| anyhow!(e))
        })
        .retry(retry_backoff())
        .when(is_retryable_anyhow)
        .notify(|err, dur| warn!(error = %err, delay = ?dur, "Retrying issue page fetch"))
        .await
        .map_err(|e| {
            let status = e.downcast_ref::<octocrab::Error>().and_then(octocrab_status);
            classify_github_error(status, format!("Failed to fetch issues: {e}"), owner, repo)
        })?;

        let page_len = page.items.len();
        if page_len == 0 {
            break;
        }

        for raw in page.items {
            // Pull requests come back through the issues endpoint too.
            if raw.pull_request.is_some() {
                continue;
            }
            issues.push(to_issue(raw));
            if issues.len() >= max_issues {
                break;
            }
        }

        // A short page means the repository has no further open issues.
        if page_len < usize::from(page_size) {
            break;
        }

        page_no += 1;
    }

    debug!(count = issues.len(), "Fetched open issues");

    Ok(issues)
}

/// [`IssueSource`] backed by the GitHub REST API.
pub struct GithubIssueSource {
    client: Octocrab,
    page_size: u8,
}

impl GithubIssueSource {
    /// Wraps an Octocrab client with the given pagination size.
    #[must_use]
    pub fn new(client: Octocrab, page_size: u8) -> Self {
        Self { client, page_size }
    }
}

#[async_trait]
impl IssueSource for GithubIssueSource {
    async fn fetch_open_issues(
        &self,
        owner: &str,
        repo: &str,
        max_issues: usize,
    ) -> Result<Vec<Issue>> {
        fetch_open_issues(&self.client, owner, repo, max_issues, self.page_size).await
    }
}
