// SPDX-License-Identifier: Apache-2.0

//! GitHub integration module.
//!
//! Repository reference parsing plus the REST fetchers the analysis
//! pipeline and chat assistant rely on.

use octocrab::Octocrab;
use secrecy::SecretString;
use tracing::debug;

use crate::Result;
use crate::error::RampupError;

pub mod issues;
pub mod repo;

/// Coordinates of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

/// Parses a repository reference in the formats users paste in.
///
/// Supports:
/// - `https://github.com/owner/repo` (optional trailing `/`)
/// - `https://github.com/owner/repo/issues`
/// - `https://github.com/owner/repo.git`
/// - bare `owner/repo`
///
/// # Errors
///
/// Returns [`RampupError::InvalidRepoRef`] for anything else.
pub fn parse_repo_ref(input: &str) -> Result<RepoRef> {
    let trimmed = input.trim();

    let invalid = || RampupError::InvalidRepoRef {
        input: input.to_string(),
    };

    let path = if let Some(rest) = trimmed
        .strip_prefix("https://github.com/")
        .or_else(|| trimmed.strip_prefix("http://github.com/"))
    {
        rest
    } else if trimmed.contains("://") || trimmed.contains('#') {
        return Err(invalid());
    } else {
        trimmed
    };

    let mut parts = path.trim_end_matches('/').split('/');
    let owner = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
    let repo = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;

    // A single trailing `/issues` segment is tolerated, anything else is not.
    match parts.next() {
        None => {}
        Some("issues") if parts.next().is_none() => {}
        Some(_) => return Err(invalid()),
    }

    let repo = repo.trim_end_matches(".git");
    if repo.is_empty() {
        return Err(invalid());
    }

    debug!(owner, repo, "Parsed repository reference");

    Ok(RepoRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Builds an Octocrab client, authenticated when a token is available.
///
/// Anonymous access is enough for public repositories; a token raises the
/// rate limit ceiling.
///
/// # Errors
///
/// Returns an error if the client cannot be constructed.
pub fn build_client(token: Option<SecretString>) -> Result<Octocrab> {
    let builder = octocrab::OctocrabBuilder::new();
    let client = match token {
        Some(token) => builder.personal_token(token).build(),
        None => builder.build(),
    }
    .map_err(|e| RampupError::GitHub {
        message: e.to_string(),
    })?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_url() {
        let parsed = parse_repo_ref("https://github.com/rust-lang/rust").unwrap();
        assert_eq!(parsed.owner, "rust-lang");
        assert_eq!(parsed.repo, "rust");
    }

    #[test]
    fn parses_url_with_trailing_slash_and_issues_path() {
        assert_eq!(
            parse_repo_ref("https://github.com/octocat/Hello-World/").unwrap(),
            RepoRef {
                owner: "octocat".into(),
                repo: "Hello-World".into()
            }
        );
        assert_eq!(
            parse_repo_ref("https://github.com/octocat/Hello-World/issues").unwrap(),
            RepoRef {
                owner: "octocat".into(),
                repo: "Hello-World".into()
            }
        );
    }

    #[test]
    fn parses_git_url() {
        let parsed = parse_repo_ref("https://github.com/octocat/Hello-World.git").unwrap();
        assert_eq!(parsed.repo, "Hello-World");
    }

    #[test]
    fn parses_bare_owner_repo() {
        let parsed = parse_repo_ref("  octocat/Hello-World ").unwrap();
        assert_eq!(parsed.owner, "octocat");
        assert_eq!(parsed.repo, "Hello-World");
    }

    #[test]
    fn rejects_other_hosts_and_junk() {
        for input in [
            "https://gitlab.com/octocat/repo",
            "octocat",
            "octocat/",
            "/repo",
            "https://github.com/octocat",
            "https://github.com/octocat/repo/pull/1",
            "owner/repo#12",
            "",
        ] {
            assert!(parse_repo_ref(input).is_err(), "should reject {input:?}");
        }
    }
}
