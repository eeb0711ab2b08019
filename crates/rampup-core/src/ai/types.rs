// SPDX-License-Identifier: Apache-2.0

//! Wire types for the OpenAI-compatible chat-completions APIs.

use serde::{Deserialize, Serialize};

use crate::types::Complexity;

/// A chat message for the completions API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant".
    pub role: String,
    /// Message content.
    pub content: String,
}

/// Request body for the chat-completions API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier.
    pub model: String,
    /// List of messages in the conversation.
    pub messages: Vec<ChatMessage>,
    /// Response format specification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// Maximum tokens in response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature for response randomness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Whether to stream the response as SSE deltas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// Response format specification for structured output.
#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    /// Type of response format (`json_object` for structured output).
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    /// The `json_object` structured-output format.
    #[must_use]
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

/// Response from the chat-completions API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// List of choices (usually just one).
    pub choices: Vec<Choice>,
}

/// A single choice in the chat completion response.
#[derive(Debug, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ChatMessage,
}

/// One SSE chunk of a streamed chat completion.
#[derive(Debug, Deserialize)]
pub struct StreamChunk {
    /// Incremental choices.
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

/// A single choice delta in a streamed response.
#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    /// The incremental content.
    #[serde(default)]
    pub delta: Delta,
}

/// Incremental message content.
#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    /// New token text, absent on role/stop chunks.
    #[serde(default)]
    pub content: Option<String>,
}

/// Structured classification response expected from the model.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchAnalysisResponse {
    /// Per-issue analyses, keyed by `issue_number`.
    pub analyses: Vec<IssueAnalysis>,
}

/// One issue's classification inside a batch response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IssueAnalysis {
    /// Issue number this analysis refers to.
    pub issue_number: u64,
    /// Assigned complexity tier.
    pub complexity: Complexity,
    /// Brief explanation (1-2 sentences).
    pub reasoning: String,
    /// Technologies/frameworks involved.
    #[serde(default)]
    pub technologies: Option<Vec<String>>,
    /// Rough estimate of hours needed (1-40).
    #[serde(default)]
    pub estimated_hours: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_response_parses_with_optional_fields_absent() {
        let json = r#"{"analyses":[{"issue_number":7,"complexity":"beginner","reasoning":"small fix"}]}"#;
        let parsed: BatchAnalysisResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.analyses.len(), 1);
        assert_eq!(parsed.analyses[0].issue_number, 7);
        assert_eq!(parsed.analyses[0].complexity, Complexity::Beginner);
        assert!(parsed.analyses[0].technologies.is_none());
        assert!(parsed.analyses[0].estimated_hours.is_none());
    }

    #[test]
    fn stream_chunk_tolerates_empty_delta() {
        let json = r#"{"choices":[{"delta":{}}]}"#;
        let parsed: StreamChunk = serde_json::from_str(json).unwrap();
        assert!(parsed.choices[0].delta.content.is_none());

        let json = r#"{"choices":[{"delta":{"content":"Hi"}}]}"#;
        let parsed: StreamChunk = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].delta.content.as_deref(), Some("Hi"));
    }

    #[test]
    fn request_omits_unset_options() {
        let request = ChatCompletionRequest {
            model: "m".into(),
            messages: vec![],
            response_format: None,
            max_tokens: None,
            temperature: None,
            stream: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("response_format"));
        assert!(!json.contains("stream"));
    }
}
