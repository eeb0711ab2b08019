// SPDX-License-Identifier: Apache-2.0

//! Repository context fetching for the chat assistant.
//!
//! README, metadata, and recent pull requests are fetched on demand when a
//! chat session starts; none of this is cached.

use octocrab::{Octocrab, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::Result;
use crate::error::RampupError;

/// Repository metadata surfaced to the chat prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoMetadata {
    /// Full `owner/repo` name.
    pub full_name: String,
    /// Repository description.
    pub description: Option<String>,
    /// Primary language.
    pub language: Option<String>,
    /// Star count.
    pub stargazers: u32,
    /// Fork count.
    pub forks: u32,
    /// Open issue count (includes PRs, as reported by GitHub).
    pub open_issues: u32,
    /// Repository topics.
    pub topics: Vec<String>,
    /// License name, if any.
    pub license: Option<String>,
}

/// A recent pull request, trimmed to what the chat prompt needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullSummary {
    /// PR number.
    pub number: u64,
    /// PR title.
    pub title: String,
    /// Open/closed state.
    pub state: String,
    /// Whether the PR was merged.
    pub merged: bool,
    /// Author login, if known.
    pub author: Option<String>,
    /// Label names.
    pub labels: Vec<String>,
    /// Browser URL.
    pub html_url: String,
}

/// Fetches repository metadata.
///
/// # Errors
///
/// Returns a GitHub error if the repository cannot be read.
#[instrument(skip(client), fields(owner = %owner, repo = %repo))]
pub async fn fetch_metadata(client: &Octocrab, owner: &str, repo: &str) -> Result<RepoMetadata> {
    let repository = client.repos(owner, repo).get().await?;

    Ok(RepoMetadata {
        full_name: repository
            .full_name
            .unwrap_or_else(|| format!("{owner}/{repo}")),
        description: repository.description,
        language: repository
            .language
            .and_then(|v| v.as_str().map(str::to_string)),
        stargazers: repository.stargazers_count.unwrap_or(0),
        forks: repository.forks_count.unwrap_or(0),
        open_issues: repository.open_issues_count.unwrap_or(0),
        topics: repository.topics.unwrap_or_default(),
        license: repository.license.map(|l| l.name),
    })
}

/// Fetches and decodes the repository README.
///
/// Returns `None` when the repository has no `README.md`.
///
/// # Errors
///
/// Returns a GitHub error on transport failures other than not-found.
#[instrument(skip(client), fields(owner = %owner, repo = %repo))]
pub async fn fetch_readme(client: &Octocrab, owner: &str, repo: &str) -> Result<Option<String>> {
    let contents = client
        .repos(owner, repo)
        .get_content()
        .path("README.md")
        .send()
        .await;

    match contents {
        Ok(mut contents) => Ok(contents
            .items
            .pop()
            .and_then(|item| item.decoded_content())),
        Err(octocrab::Error::GitHub { source, .. }) if source.status_code.as_u16() == 404 => {
            debug!("Repository has no README.md");
            Ok(None)
        }
        Err(e) => Err(RampupError::from(e)),
    }
}

/// Fetches the most recently updated pull requests, newest first.
///
/// # Errors
///
/// Returns a GitHub error if the list request fails.
#[instrument(skip(client), fields(owner = %owner, repo = %repo, limit))]
pub async fn fetch_recent_pulls(
    client: &Octocrab,
    owner: &str,
    repo: &str,
    limit: u8,
) -> Result<Vec<PullSummary>> {
    let page = client
        .pulls(owner, repo)
        .list()
        .state(params::State::All)
        .sort(params::pulls::Sort::Created)
        .direction(params::Direction::Descending)
        .per_page(limit)
        .send()
        .await?;

    let pulls = page
        .items
        .into_iter()
        .map(|pr| PullSummary {
            number: pr.number,
            title: pr.title.unwrap_or_default(),
            state: pr.state.map_or_else(String::new, |s| {
                format!("{s:?}").to_lowercase()
            }),
            merged: pr.merged_at.is_some(),
            author: pr.user.map(|u| u.login),
            labels: pr
                .labels
                .unwrap_or_default()
                .into_iter()
                .map(|l| l.name)
                .collect(),
            html_url: pr.html_url.map_or_else(String::new, |u| u.to_string()),
        })
        .collect();

    Ok(pulls)
}
