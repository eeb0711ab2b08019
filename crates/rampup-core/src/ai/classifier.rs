// SPDX-License-Identifier: Apache-2.0

//! Batch complexity classification.
//!
//! Builds the batch prompt, sends it through a [`ChatModel`], and maps the
//! structured response back onto the input issues. Issues the model skips
//! get a default tier rather than failing the batch.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::provider::ChatModel;
use super::types::{BatchAnalysisResponse, ChatCompletionRequest, ChatMessage, ResponseFormat};
use crate::pipeline::IssueClassifier;
use crate::types::{ComplexityAnalysis, Issue};
use crate::util::truncate_chars;

/// Maximum issue-body length included in the batch prompt.
const MAX_BODY_LENGTH: usize = 500;

/// Builds the classification prompt for a batch of issues.
///
/// Bodies are truncated so a handful of long issues cannot blow the
/// context window.
#[must_use]
pub fn build_batch_prompt(issues: &[Issue]) -> String {
    let issues_list = issues
        .iter()
        .map(|issue| {
            let labels = if issue.labels.is_empty() {
                "None".to_string()
            } else {
                issue.labels.join(", ")
            };
            let body = issue
                .body
                .as_deref()
                .map_or_else(|| "No description".to_string(), |b| {
                    truncate_chars(b, MAX_BODY_LENGTH)
                });
            format!(
                "Issue #{}: \"{}\"\nLabels: {}\nBody: {}\nComments: {}",
                issue.number, issue.title, labels, body, issue.comments
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "Analyze these GitHub issues and rate each one's complexity for contributors.\n\n\
         {issues_list}\n\n\
         Rate each issue as:\n\
         - BEGINNER: Good first issue, clear scope, minimal codebase knowledge\n\
         - INTERMEDIATE: Requires codebase understanding, moderate complexity\n\
         - ADVANCED: Complex changes, deep expertise needed, architectural impact\n\n\
         For each issue, also identify:\n\
         - \"technologies\": Array of technologies/frameworks needed (e.g., [\"React\", \"TypeScript\", \"CSS\"])\n\
         - \"estimated_hours\": Rough estimate of hours needed (1-40)\n\
         - \"reasoning\": Brief explanation (1-2 sentences)\n\n\
         Return JSON with an \"analyses\" array containing objects with \"issue_number\", \
         \"complexity\", \"reasoning\", \"technologies\", and \"estimated_hours\"."
    )
}

/// Maps a batch response back onto the input issues.
///
/// Issues the model did not mention get the default tier with an
/// "unable to analyze" note, so every input issue has an entry.
#[must_use]
pub fn map_analyses(
    issues: &[Issue],
    response: BatchAnalysisResponse,
) -> BTreeMap<u64, ComplexityAnalysis> {
    let mut results: BTreeMap<u64, ComplexityAnalysis> = BTreeMap::new();

    for analysis in response.analyses {
        results.insert(
            analysis.issue_number,
            ComplexityAnalysis {
                complexity: analysis.complexity,
                reasoning: analysis.reasoning,
                technologies: analysis.technologies,
                estimated_hours: analysis.estimated_hours,
            },
        );
    }

    for issue in issues {
        results
            .entry(issue.number)
            .or_insert_with(ComplexityAnalysis::unanalyzed);
    }

    results
}

/// Classifies a batch of issues through the given model.
///
/// # Errors
///
/// Returns an error when the model request fails after retries or the
/// response cannot be parsed.
#[instrument(skip(model, issues), fields(provider = model.name(), count = issues.len()))]
pub async fn classify_batch(
    model: &dyn ChatModel,
    issues: &[Issue],
) -> Result<BTreeMap<u64, ComplexityAnalysis>> {
    let request = ChatCompletionRequest {
        model: model.model().to_string(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: build_batch_prompt(issues),
        }],
        response_format: Some(ResponseFormat::json_object()),
        max_tokens: Some(model.max_tokens()),
        temperature: Some(model.temperature()),
        stream: None,
    };

    let response = model.complete_batch(&request).await?;

    debug!(analyses = response.analyses.len(), "Classified batch");

    Ok(map_analyses(issues, response))
}

/// [`IssueClassifier`] backed by a chat model.
pub struct ModelClassifier {
    model: Box<dyn ChatModel>,
}

impl ModelClassifier {
    /// Wraps a chat model.
    #[must_use]
    pub fn new(model: Box<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl IssueClassifier for ModelClassifier {
    async fn classify_batch(
        &self,
        issues: &[Issue],
    ) -> Result<BTreeMap<u64, ComplexityAnalysis>> {
        classify_batch(self.model.as_ref(), issues).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::IssueAnalysis;
    use crate::types::Complexity;

    fn issue(number: u64, title: &str, body: Option<&str>, labels: &[&str]) -> Issue {
        Issue {
            number,
            title: title.to_string(),
            body: body.map(str::to_string),
            labels: labels.iter().map(|s| (*s).to_string()).collect(),
            html_url: format!("https://github.com/o/r/issues/{number}"),
            comments: 2,
            created_at: chrono::Utc::now(),
            author: Some("octocat".to_string()),
        }
    }

    #[test]
    fn prompt_includes_issue_details() {
        let issues = vec![issue(42, "Fix typo", Some("In the readme"), &["docs", "easy"])];
        let prompt = build_batch_prompt(&issues);

        assert!(prompt.contains("Issue #42: \"Fix typo\""));
        assert!(prompt.contains("Labels: docs, easy"));
        assert!(prompt.contains("Body: In the readme"));
        assert!(prompt.contains("Comments: 2"));
    }

    #[test]
    fn prompt_handles_missing_body_and_labels() {
        let issues = vec![issue(1, "Untitled work", None, &[])];
        let prompt = build_batch_prompt(&issues);

        assert!(prompt.contains("Labels: None"));
        assert!(prompt.contains("Body: No description"));
    }

    #[test]
    fn prompt_truncates_long_bodies() {
        let long_body = "x".repeat(2000);
        let issues = vec![issue(1, "Long", Some(&long_body), &[])];
        let prompt = build_batch_prompt(&issues);

        assert!(prompt.contains(&"x".repeat(MAX_BODY_LENGTH)));
        assert!(!prompt.contains(&"x".repeat(MAX_BODY_LENGTH + 1)));
    }

    #[test]
    fn map_analyses_backfills_missing_issues() {
        let issues = vec![issue(1, "a", None, &[]), issue(2, "b", None, &[])];
        let response = BatchAnalysisResponse {
            analyses: vec![IssueAnalysis {
                issue_number: 1,
                complexity: Complexity::Beginner,
                reasoning: "small".to_string(),
                technologies: Some(vec!["Rust".to_string()]),
                estimated_hours: Some(2.0),
            }],
        };

        let results = map_analyses(&issues, response);

        assert_eq!(results.len(), 2);
        assert_eq!(results[&1].complexity, Complexity::Beginner);
        assert_eq!(results[&2].complexity, Complexity::Intermediate);
        assert_eq!(results[&2].reasoning, "Unable to analyze this issue");
    }

    #[test]
    fn map_analyses_ignores_unknown_issue_numbers() {
        let issues = vec![issue(1, "a", None, &[])];
        let response = BatchAnalysisResponse {
            analyses: vec![
                IssueAnalysis {
                    issue_number: 1,
                    complexity: Complexity::Advanced,
                    reasoning: "hard".to_string(),
                    technologies: None,
                    estimated_hours: None,
                },
                IssueAnalysis {
                    issue_number: 99,
                    complexity: Complexity::Beginner,
                    reasoning: "hallucinated".to_string(),
                    technologies: None,
                    estimated_hours: None,
                },
            ],
        };

        let results = map_analyses(&issues, response);

        // The stray entry stays keyed by its own number and does not
        // displace a real issue.
        assert_eq!(results[&1].complexity, Complexity::Advanced);
        assert!(results.contains_key(&99));
    }
}
