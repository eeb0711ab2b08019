// SPDX-License-Identifier: Apache-2.0

//! Repository chat assistant.
//!
//! Builds a grounding prompt from the job's classified issues plus
//! freshly fetched README, metadata, and recent pull requests, then
//! streams the model's answer. Conversation history is request-local:
//! the client sends prior turns with each message.

use anyhow::Result;
use futures::stream::BoxStream;
use octocrab::Octocrab;
use tracing::{instrument, warn};

use crate::ai::ChatModel;
use crate::ai::types::{ChatCompletionRequest, ChatMessage};
use crate::config::AiConfig;
use crate::github::repo::{self, PullSummary, RepoMetadata};
use crate::types::{ChatTurn, ClassifiedIssue, Complexity};
use crate::util::truncate_chars;

/// Issues included in the prompt; the rest are summarized as a count.
const PROMPT_MAX_ISSUES: usize = 20;
/// Pull requests included in the prompt.
const PROMPT_MAX_PULLS: usize = 5;
/// Pull requests fetched for context.
const FETCH_MAX_PULLS: u8 = 10;
/// README characters included in the prompt.
const PROMPT_README_CHARS: usize = 1000;
/// Issue-body characters included per issue.
const PROMPT_BODY_CHARS: usize = 200;

/// Everything the system prompt is built from.
pub struct RepoContext {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Classified issues from the completed job.
    pub issues: Vec<ClassifiedIssue>,
    /// README content, when the repository has one.
    pub readme: Option<String>,
    /// Repository metadata, when it could be fetched.
    pub metadata: Option<RepoMetadata>,
    /// Recent pull requests, possibly empty.
    pub pulls: Vec<PullSummary>,
}

/// Gathers chat context for a repository.
///
/// The three fetches run concurrently and fail independently: a missing
/// README or an unreadable PR list degrades the prompt instead of failing
/// the chat request.
#[instrument(skip(client, issues), fields(owner = %owner, repo = %repo))]
pub async fn build_context(
    client: &Octocrab,
    owner: &str,
    repo: &str,
    issues: Vec<ClassifiedIssue>,
) -> RepoContext {
    let (readme, metadata, pulls) = tokio::join!(
        repo::fetch_readme(client, owner, repo),
        repo::fetch_metadata(client, owner, repo),
        repo::fetch_recent_pulls(client, owner, repo, FETCH_MAX_PULLS),
    );

    let readme = readme
        .map_err(|e| warn!(error = %e, "README fetch failed"))
        .ok()
        .flatten();
    let metadata = metadata
        .map_err(|e| warn!(error = %e, "Metadata fetch failed"))
        .ok();
    let pulls = pulls
        .map_err(|e| warn!(error = %e, "Pull request fetch failed"))
        .unwrap_or_default();

    RepoContext {
        owner: owner.to_string(),
        repo: repo.to_string(),
        issues,
        readme,
        metadata,
        pulls,
    }
}

fn metadata_section(metadata: Option<&RepoMetadata>) -> String {
    let Some(m) = metadata else {
        return "Metadata not available".to_string();
    };
    format!(
        "- Name: {}\n\
         - Description: {}\n\
         - Language: {}\n\
         - Stars: {}\n\
         - Forks: {}\n\
         - Open Issues: {}\n\
         - Topics: {}\n\
         - License: {}",
        m.full_name,
        m.description.as_deref().unwrap_or("No description"),
        m.language.as_deref().unwrap_or("Not specified"),
        m.stargazers,
        m.forks,
        m.open_issues,
        if m.topics.is_empty() {
            "None".to_string()
        } else {
            m.topics.join(", ")
        },
        m.license.as_deref().unwrap_or("Not specified"),
    )
}

fn issue_section(issue: &ClassifiedIssue) -> String {
    let labels = if issue.issue.labels.is_empty() {
        "None".to_string()
    } else {
        issue.issue.labels.join(", ")
    };
    let body = issue
        .issue
        .body
        .as_deref()
        .map(|b| format!("\n- Description: {}...", truncate_chars(b, PROMPT_BODY_CHARS)))
        .unwrap_or_default();
    format!(
        "### Issue #{}: {}\n\
         - Complexity: {}\n\
         - Labels: {}\n\
         - Comments: {}\n\
         - Reasoning: {}\n\
         - URL: {}{}",
        issue.issue.number,
        issue.issue.title,
        issue.complexity,
        labels,
        issue.issue.comments,
        issue.reasoning,
        issue.issue.html_url,
        body,
    )
}

fn pulls_section(pulls: &[PullSummary]) -> String {
    if pulls.is_empty() {
        return "No recent PRs available".to_string();
    }
    pulls
        .iter()
        .take(PROMPT_MAX_PULLS)
        .map(|pr| {
            let labels = if pr.labels.is_empty() {
                "None".to_string()
            } else {
                pr.labels.join(", ")
            };
            format!(
                "### PR #{}: {}\n\
                 - State: {}{}\n\
                 - Author: {}\n\
                 - Labels: {}\n\
                 - URL: {}",
                pr.number,
                pr.title,
                pr.state,
                if pr.merged { " (merged)" } else { "" },
                pr.author.as_deref().unwrap_or("unknown"),
                labels,
                pr.html_url,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Renders the grounding system prompt for a chat session.
#[must_use]
pub fn build_system_prompt(context: &RepoContext) -> String {
    let issues_list = context
        .issues
        .iter()
        .take(PROMPT_MAX_ISSUES)
        .map(issue_section)
        .collect::<Vec<_>>()
        .join("\n\n");

    let overflow = if context.issues.len() > PROMPT_MAX_ISSUES {
        format!(
            "\n\n... and {} more issues",
            context.issues.len() - PROMPT_MAX_ISSUES
        )
    } else {
        String::new()
    };

    let readme_section = context
        .readme
        .as_deref()
        .map(|r| {
            format!(
                "\n\n## README (first {PROMPT_README_CHARS} characters)\n{}...",
                truncate_chars(r, PROMPT_README_CHARS)
            )
        })
        .unwrap_or_default();

    format!(
        "You are a helpful AI assistant that answers questions about the GitHub repository {owner}/{repo}.\n\n\
         You have access to the following repository information:\n\n\
         ## Repository Metadata\n\
         {metadata}\n\n\
         ## Issues ({issue_count} analyzed)\n\
         {issues_list}{overflow}\n\n\
         ## Recent Pull Requests\n\
         {pulls}{readme_section}\n\n\
         When answering questions:\n\
         1. Be specific and reference issue numbers, PR numbers, or specific details\n\
         2. Use the complexity ratings to recommend appropriate issues for different skill levels\n\
         3. Provide links when mentioning specific issues or PRs\n\
         4. If you don't have enough information to answer accurately, say so\n\
         5. Be concise but informative\n\
         6. Format your responses in markdown for readability\n\n\
         Answer questions about:\n\
         - Issues (complexity, recommendations, filtering)\n\
         - Pull requests (status, activity)\n\
         - Repository information (languages, dependencies, structure)\n\
         - Contribution opportunities\n\
         - Project overview and direction",
        owner = context.owner,
        repo = context.repo,
        metadata = metadata_section(context.metadata.as_ref()),
        issue_count = context.issues.len(),
        pulls = pulls_section(&context.pulls),
    )
}

/// Canned questions offered when a chat session opens.
///
/// The fourth question adapts to the analysis: it asks about beginner
/// issues only when the job actually found some.
#[must_use]
pub fn suggested_questions(issues: &[ClassifiedIssue]) -> Vec<String> {
    let beginner_count = issues
        .iter()
        .filter(|i| i.complexity == Complexity::Beginner)
        .count();
    let adaptive_tier = if beginner_count > 0 {
        "beginner"
    } else {
        "intermediate"
    };

    vec![
        "What are the best beginner-friendly issues to start with?".to_string(),
        "Which issues are related to documentation?".to_string(),
        "Summarize the most active areas of development".to_string(),
        format!("Are there any {adaptive_tier} issues related to UI/frontend?"),
        "What skills do I need to contribute to this project?".to_string(),
        "Which issues have the most discussion?".to_string(),
    ]
}

/// Opens a streamed chat completion grounded in the repository context.
///
/// # Errors
///
/// Returns an error when the provider request cannot be opened.
pub async fn chat_stream(
    model: &dyn ChatModel,
    config: &AiConfig,
    system_prompt: &str,
    history: &[ChatTurn],
    message: &str,
) -> Result<BoxStream<'static, Result<String>>> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage {
        role: "system".to_string(),
        content: system_prompt.to_string(),
    });
    for turn in history {
        messages.push(ChatMessage {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        });
    }
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: message.to_string(),
    });

    let request = ChatCompletionRequest {
        model: model.model().to_string(),
        messages,
        response_format: None,
        max_tokens: Some(config.chat_max_tokens),
        temperature: Some(config.chat_temperature),
        stream: Some(true),
    };

    model.stream_chat(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::types::{ComplexityAnalysis, Issue};

    fn classified(number: u64, complexity: Complexity, body: Option<&str>) -> ClassifiedIssue {
        ClassifiedIssue::new(
            Issue {
                number,
                title: format!("issue {number}"),
                body: body.map(str::to_string),
                labels: vec!["bug".to_string()],
                html_url: format!("https://github.com/o/r/issues/{number}"),
                comments: 3,
                created_at: Utc::now(),
                author: Some("octocat".to_string()),
            },
            ComplexityAnalysis {
                complexity,
                reasoning: "well scoped".to_string(),
                technologies: None,
                estimated_hours: None,
            },
        )
    }

    fn context(issues: Vec<ClassifiedIssue>) -> RepoContext {
        RepoContext {
            owner: "o".to_string(),
            repo: "r".to_string(),
            issues,
            readme: None,
            metadata: None,
            pulls: vec![],
        }
    }

    #[test]
    fn prompt_covers_issues_and_fallback_sections() {
        let ctx = context(vec![classified(1, Complexity::Beginner, Some("short body"))]);
        let prompt = build_system_prompt(&ctx);

        assert!(prompt.contains("repository o/r"));
        assert!(prompt.contains("### Issue #1: issue 1"));
        assert!(prompt.contains("- Complexity: beginner"));
        assert!(prompt.contains("Metadata not available"));
        assert!(prompt.contains("No recent PRs available"));
        assert!(!prompt.contains("## README"));
    }

    #[test]
    fn prompt_caps_issue_list_and_counts_the_rest() {
        let issues = (1..=30)
            .map(|n| classified(n, Complexity::Intermediate, None))
            .collect();
        let prompt = build_system_prompt(&context(issues));

        assert!(prompt.contains("## Issues (30 analyzed)"));
        assert!(prompt.contains("### Issue #20:"));
        assert!(!prompt.contains("### Issue #21:"));
        assert!(prompt.contains("... and 10 more issues"));
    }

    #[test]
    fn prompt_truncates_readme_and_issue_bodies() {
        let long_body = "b".repeat(500);
        let mut ctx = context(vec![classified(1, Complexity::Beginner, Some(&long_body))]);
        ctx.readme = Some("r".repeat(5000));

        let prompt = build_system_prompt(&ctx);

        assert!(prompt.contains(&format!("{}...", "b".repeat(PROMPT_BODY_CHARS))));
        assert!(!prompt.contains(&"b".repeat(PROMPT_BODY_CHARS + 1)));
        assert!(prompt.contains(&format!("{}...", "r".repeat(PROMPT_README_CHARS))));
        assert!(!prompt.contains(&"r".repeat(PROMPT_README_CHARS + 1)));
    }

    #[test]
    fn prompt_shows_merged_marker_on_pulls() {
        let mut ctx = context(vec![]);
        ctx.pulls = vec![PullSummary {
            number: 9,
            title: "Add parser".to_string(),
            state: "closed".to_string(),
            merged: true,
            author: Some("dev".to_string()),
            labels: vec![],
            html_url: "https://github.com/o/r/pull/9".to_string(),
        }];

        let prompt = build_system_prompt(&ctx);
        assert!(prompt.contains("### PR #9: Add parser"));
        assert!(prompt.contains("- State: closed (merged)"));
    }

    #[test]
    fn suggested_questions_adapt_to_beginner_presence() {
        let with_beginner = vec![classified(1, Complexity::Beginner, None)];
        let questions = suggested_questions(&with_beginner);
        assert_eq!(questions.len(), 6);
        assert_eq!(
            questions[3],
            "Are there any beginner issues related to UI/frontend?"
        );

        let without = vec![classified(1, Complexity::Advanced, None)];
        let questions = suggested_questions(&without);
        assert_eq!(
            questions[3],
            "Are there any intermediate issues related to UI/frontend?"
        );
    }
}
