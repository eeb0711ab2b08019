// SPDX-License-Identifier: Apache-2.0

//! Domain types shared across the fetcher, classifier, store, and server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An open GitHub issue, immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue body (markdown), if any.
    pub body: Option<String>,
    /// Label names on the issue.
    pub labels: Vec<String>,
    /// Browser URL of the issue.
    pub html_url: String,
    /// Number of comments.
    pub comments: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Author login, if known.
    pub author: Option<String>,
}

/// Contributor-facing complexity tier for an issue.
///
/// Ordered: `Beginner < Intermediate < Advanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Good first issue, clear scope, minimal codebase knowledge.
    Beginner,
    /// Requires codebase understanding, moderate complexity.
    Intermediate,
    /// Complex changes, deep expertise needed, architectural impact.
    Advanced,
}

impl Complexity {
    /// Tier substituted when the classifier could not produce a rating.
    pub const DEFAULT: Complexity = Complexity::Intermediate;

    /// Lowercase name as used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Complexity::Beginner => "beginner",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output for a single issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityAnalysis {
    /// Assigned complexity tier.
    pub complexity: Complexity,
    /// Short natural-language justification.
    pub reasoning: String,
    /// Technologies/frameworks the work is expected to touch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    /// Rough estimate of hours needed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
}

impl ComplexityAnalysis {
    /// Default analysis for issues the provider did not cover.
    #[must_use]
    pub fn unanalyzed() -> Self {
        Self {
            complexity: Complexity::DEFAULT,
            reasoning: "Unable to analyze this issue".to_string(),
            technologies: None,
            estimated_hours: None,
        }
    }

    /// Default analysis carrying the provider failure text.
    #[must_use]
    pub fn failed(error: &str) -> Self {
        Self {
            complexity: Complexity::DEFAULT,
            reasoning: format!("Analysis failed: {error}"),
            technologies: None,
            estimated_hours: None,
        }
    }
}

/// An [`Issue`] together with its classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedIssue {
    /// The underlying issue.
    #[serde(flatten)]
    pub issue: Issue,
    /// Assigned complexity tier.
    pub complexity: Complexity,
    /// Short justification for the tier.
    pub reasoning: String,
    /// Technologies involved, if identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    /// Estimated hours, if identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
}

impl ClassifiedIssue {
    /// Combines an issue with its analysis.
    #[must_use]
    pub fn new(issue: Issue, analysis: ComplexityAnalysis) -> Self {
        Self {
            issue,
            complexity: analysis.complexity,
            reasoning: analysis.reasoning,
            technologies: analysis.technologies,
            estimated_hours: analysis.estimated_hours,
        }
    }
}

/// Interchangeable AI backend, selected per job/chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic Claude models.
    Anthropic,
    /// OpenAI models.
    OpenAi,
    /// Google Gemini models.
    Google,
    /// Groq-hosted models.
    Groq,
}

impl ProviderKind {
    /// Lowercase provider name as used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Google => "google",
            ProviderKind::Groq => "groq",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anthropic" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAi),
            "google" => Ok(ProviderKind::Google),
            "groq" => Ok(ProviderKind::Groq),
            other => Err(format!("Unsupported AI provider: {other}")),
        }
    }
}

/// Lifecycle state of an analysis job.
///
/// Transitions are monotonic: `Pending -> Processing -> Complete | Error`.
/// `Complete` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, background work not started yet.
    Pending,
    /// Fetch/classify pipeline is running.
    Processing,
    /// All batches classified.
    Complete,
    /// The fetch step failed; see the job's error message.
    Error,
}

impl JobStatus {
    /// Whether this state admits no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }
}

/// Progress counters for a job: `current` classified out of `total` fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Issues classified so far.
    pub current: usize,
    /// Issues fetched for this job.
    pub total: usize,
}

/// One end-to-end analysis run for a single repository submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    /// Generated job identifier.
    pub id: String,
    /// Repository URL as submitted.
    pub repo_url: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Lifecycle status.
    pub status: JobStatus,
    /// Progress counters.
    pub progress: Progress,
    /// Classified issues accumulated so far.
    pub issues: Vec<ClassifiedIssue>,
    /// AI backend chosen for this job.
    pub provider: ProviderKind,
    /// Failure message when `status` is `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl AnalysisJob {
    /// Creates a pending job with empty progress and no issues.
    #[must_use]
    pub fn new(id: String, repo_url: String, owner: String, repo: String, provider: ProviderKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            repo_url,
            owner,
            repo,
            status: JobStatus::Pending,
            progress: Progress::default(),
            issues: vec![],
            provider,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-tier counts over a job's full (unfiltered) issue list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    /// Issues rated beginner.
    pub beginner: usize,
    /// Issues rated intermediate.
    pub intermediate: usize,
    /// Issues rated advanced.
    pub advanced: usize,
    /// All classified issues.
    pub total: usize,
}

impl TierCounts {
    /// Tallies counts over the full issue list.
    #[must_use]
    pub fn tally(issues: &[ClassifiedIssue]) -> Self {
        let mut counts = TierCounts {
            total: issues.len(),
            ..TierCounts::default()
        };
        for issue in issues {
            match issue.complexity {
                Complexity::Beginner => counts.beginner += 1,
                Complexity::Intermediate => counts.intermediate += 1,
                Complexity::Advanced => counts.advanced += 1,
            }
        }
        counts
    }
}

/// A single turn of a chat conversation, request-local only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Either `user` or `assistant`.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

/// Role of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// End-user message.
    User,
    /// Model reply.
    Assistant,
}

impl ChatRole {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(number: u64) -> Issue {
        Issue {
            number,
            title: format!("issue {number}"),
            body: None,
            labels: vec![],
            html_url: format!("https://github.com/o/r/issues/{number}"),
            comments: 0,
            created_at: Utc::now(),
            author: None,
        }
    }

    fn classified(number: u64, complexity: Complexity) -> ClassifiedIssue {
        ClassifiedIssue::new(
            issue(number),
            ComplexityAnalysis {
                complexity,
                reasoning: "r".into(),
                technologies: None,
                estimated_hours: None,
            },
        )
    }

    #[test]
    fn complexity_tiers_are_ordered() {
        assert!(Complexity::Beginner < Complexity::Intermediate);
        assert!(Complexity::Intermediate < Complexity::Advanced);
    }

    #[test]
    fn complexity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Complexity::Beginner).unwrap(),
            "\"beginner\""
        );
        let parsed: Complexity = serde_json::from_str("\"advanced\"").unwrap();
        assert_eq!(parsed, Complexity::Advanced);
    }

    #[test]
    fn provider_kind_round_trips_through_serde_and_fromstr() {
        for (kind, name) in [
            (ProviderKind::Anthropic, "anthropic"),
            (ProviderKind::OpenAi, "openai"),
            (ProviderKind::Google, "google"),
            (ProviderKind::Groq, "groq"),
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), format!("\"{name}\""));
            assert_eq!(name.parse::<ProviderKind>().unwrap(), kind);
        }
        assert!("mistral".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn terminal_states_are_complete_and_error() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Complete.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }

    #[test]
    fn tier_counts_match_the_unfiltered_set() {
        let issues = vec![
            classified(1, Complexity::Beginner),
            classified(2, Complexity::Advanced),
            classified(3, Complexity::Intermediate),
            classified(4, Complexity::Beginner),
        ];
        let counts = TierCounts::tally(&issues);
        assert_eq!(counts.beginner, 2);
        assert_eq!(counts.intermediate, 1);
        assert_eq!(counts.advanced, 1);
        assert_eq!(counts.total, 4);
    }

    #[test]
    fn default_analysis_uses_intermediate_tier() {
        let default = ComplexityAnalysis::unanalyzed();
        assert_eq!(default.complexity, Complexity::Intermediate);
        assert_eq!(default.reasoning, "Unable to analyze this issue");

        let failed = ComplexityAnalysis::failed("Invalid anthropic API key");
        assert_eq!(failed.complexity, Complexity::Intermediate);
        assert!(failed.reasoning.contains("Invalid anthropic API key"));
    }
}
