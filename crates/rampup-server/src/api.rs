// SPDX-License-Identifier: Apache-2.0

//! HTTP handlers for the analysis API.
//!
//! RPC-style JSON endpoints under `/api`: start an analysis, poll its
//! status, read filtered results, chat about the repository (SSE), and
//! fetch suggested chat questions.

use std::convert::Infallible;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, KeepAliveStream, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, BoxStream, StreamExt};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use rampup_core::chat::{build_context, build_system_prompt, chat_stream, suggested_questions};
use rampup_core::github::issues::GithubIssueSource;
use rampup_core::types::{
    AnalysisJob, ChatTurn, ClassifiedIssue, Complexity, JobStatus, Progress, ProviderKind,
    TierCounts,
};
use rampup_core::{ModelClassifier, parse_repo_ref, provider_for, run_analysis};

use crate::AppState;
use crate::error::ApiError;

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analysis", post(start_analysis))
        .route("/api/analysis/{id}/status", get(status))
        .route("/api/analysis/{id}/results", get(results))
        .route("/api/analysis/{id}/chat", post(chat))
        .route("/api/analysis/{id}/questions", get(questions))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartAnalysisRequest {
    repo_url: String,
    provider: ProviderKind,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    max_issues: Option<usize>,
}

#[derive(Debug, Serialize)]
struct StartAnalysisResponse {
    analysis_id: String,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    id: String,
    status: JobStatus,
    progress: Progress,
    provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultsQuery {
    complexity: Option<Complexity>,
}

#[derive(Debug, Serialize)]
struct ResultsResponse {
    id: String,
    status: JobStatus,
    issues: Vec<ClassifiedIssue>,
    counts: TierCounts,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    message: String,
    provider: ProviderKind,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
struct QuestionsResponse {
    questions: Vec<String>,
}

/// Resolves the AI key: a non-empty request override wins over the
/// environment.
fn resolve_key(
    state: &AppState,
    provider: ProviderKind,
    override_key: Option<String>,
) -> Result<SecretString, ApiError> {
    match override_key.filter(|k| !k.is_empty()) {
        Some(key) => Ok(SecretString::from(key)),
        None => Ok(state.keys.key_for(provider)?),
    }
}

/// Validates the request, registers a pending job, and spawns the
/// analysis pipeline in the background.
#[instrument(skip(state, req), fields(repo_url = %req.repo_url, provider = %req.provider))]
async fn start_analysis(
    State(state): State<AppState>,
    Json(req): Json<StartAnalysisRequest>,
) -> Result<(StatusCode, Json<StartAnalysisResponse>), ApiError> {
    let repo_ref = parse_repo_ref(&req.repo_url)?;
    let key = resolve_key(&state, req.provider, req.api_key)?;
    let model = provider_for(req.provider, key, &state.ai)?;

    let id = Uuid::new_v4().to_string();
    state.store.create(AnalysisJob::new(
        id.clone(),
        req.repo_url,
        repo_ref.owner.clone(),
        repo_ref.repo.clone(),
        req.provider,
    ))?;

    let max_issues = state.policy.clamp_max_issues(req.max_issues);
    let source = GithubIssueSource::new(state.github.clone(), state.policy.page_size);
    let classifier = ModelClassifier::new(model);
    let store = state.store.clone();
    let policy = state.policy.clone();
    let job_id = id.clone();

    info!(analysis_id = %id, owner = %repo_ref.owner, repo = %repo_ref.repo, "Starting analysis");

    tokio::spawn(async move {
        if let Err(e) = run_analysis(
            store.as_ref(),
            &source,
            &classifier,
            &job_id,
            &repo_ref.owner,
            &repo_ref.repo,
            max_issues,
            &policy,
        )
        .await
        {
            error!(analysis_id = %job_id, error = %e, "Analysis job failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(StartAnalysisResponse { analysis_id: id }),
    ))
}

async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let job = state.store.get(&id)?;
    Ok(Json(StatusResponse {
        id: job.id,
        status: job.status,
        progress: job.progress,
        provider: job.provider,
        error: job.error,
    }))
}

/// Returns the job's classified issues, optionally filtered by tier,
/// sorted beginner first. Counts always cover the unfiltered set.
async fn results(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let job = state.store.get(&id)?;
    let counts = TierCounts::tally(&job.issues);

    let mut issues: Vec<ClassifiedIssue> = match query.complexity {
        Some(tier) => job
            .issues
            .into_iter()
            .filter(|i| i.complexity == tier)
            .collect(),
        None => job.issues,
    };
    issues.sort_by_key(|i| i.complexity);

    Ok(Json(ResultsResponse {
        id: job.id,
        status: job.status,
        issues,
        counts,
    }))
}

/// Streams a chat answer grounded in the completed analysis.
#[instrument(skip(state, req), fields(analysis_id = %id, provider = %req.provider))]
async fn chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Sse<KeepAliveStream<BoxStream<'static, Result<Event, Infallible>>>>, ApiError> {
    let job = state.store.get(&id)?;
    if job.status != JobStatus::Complete {
        return Err(rampup_core::RampupError::AnalysisIncomplete.into());
    }

    let key = resolve_key(&state, req.provider, req.api_key)?;
    let model = provider_for(req.provider, key, &state.ai)?;

    let context = build_context(&state.github, &job.owner, &job.repo, job.issues).await;
    let system_prompt = build_system_prompt(&context);

    let tokens = chat_stream(
        model.as_ref(),
        &state.ai,
        &system_prompt,
        &req.history,
        &req.message,
    )
    .await?;

    let events = tokens
        .map(|item| {
            Ok(match item {
                Ok(token) => Event::default().data(token),
                Err(e) => Event::default().event("error").data(e.to_string()),
            })
        })
        .chain(stream::once(async { Ok(Event::default().data("[DONE]")) }))
        .boxed();

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

async fn questions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuestionsResponse>, ApiError> {
    let job = state.store.get(&id)?;
    Ok(Json(QuestionsResponse {
        questions: suggested_questions(&job.issues),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use tower::ServiceExt;

    use rampup_core::types::{ComplexityAnalysis, Issue};
    use rampup_core::{AiConfig, AnalysisStore, BatchPolicy, KeyResolver, MemoryStore, RampupError};

    struct StubKeys {
        key: Option<&'static str>,
    }

    impl KeyResolver for StubKeys {
        fn key_for(&self, provider: ProviderKind) -> rampup_core::Result<SecretString> {
            self.key
                .map(SecretString::from)
                .ok_or_else(|| RampupError::MissingApiKey {
                    provider: provider.to_string(),
                    env_var: provider.api_key_env().to_string(),
                })
        }

        fn github_token(&self) -> Option<SecretString> {
            None
        }
    }

    fn app(store: Arc<MemoryStore>, key: Option<&'static str>) -> Router {
        router(AppState {
            store,
            keys: Arc::new(StubKeys { key }),
            github: octocrab::Octocrab::default(),
            policy: BatchPolicy::default(),
            ai: AiConfig::default(),
        })
    }

    fn classified(number: u64, complexity: Complexity) -> ClassifiedIssue {
        ClassifiedIssue::new(
            Issue {
                number,
                title: format!("issue {number}"),
                body: None,
                labels: vec![],
                html_url: format!("https://github.com/o/r/issues/{number}"),
                comments: 0,
                created_at: Utc::now(),
                author: None,
            },
            ComplexityAnalysis {
                complexity,
                reasoning: "r".into(),
                technologies: None,
                estimated_hours: None,
            },
        )
    }

    fn seed_complete_job(store: &MemoryStore, id: &str, issues: Vec<ClassifiedIssue>) {
        store
            .create(AnalysisJob::new(
                id.to_string(),
                "https://github.com/o/r".to_string(),
                "o".to_string(),
                "r".to_string(),
                ProviderKind::Groq,
            ))
            .unwrap();
        store.set_issues(id, issues).unwrap();
        store.set_status(id, JobStatus::Complete, None).unwrap();
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn unknown_job_status_is_not_found() {
        let app = app(Arc::new(MemoryStore::new()), Some("k"));
        let response = app.oneshot(get("/api/analysis/nope/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn invalid_repo_url_is_bad_request() {
        let app = app(Arc::new(MemoryStore::new()), Some("k"));
        let response = app
            .oneshot(post_json(
                "/api/analysis",
                serde_json::json!({
                    "repo_url": "https://gitlab.com/owner/repo",
                    "provider": "groq",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Invalid GitHub"));
    }

    #[tokio::test]
    async fn missing_api_key_is_bad_request() {
        let app = app(Arc::new(MemoryStore::new()), None);
        let response = app
            .oneshot(post_json(
                "/api/analysis",
                serde_json::json!({
                    "repo_url": "octocat/Hello-World",
                    "provider": "groq",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("GROQ_API_KEY"));
    }

    #[tokio::test]
    async fn start_analysis_registers_a_job() {
        let store = Arc::new(MemoryStore::new());
        let app = app(store.clone(), Some("k"));
        let response = app
            .oneshot(post_json(
                "/api/analysis",
                serde_json::json!({
                    "repo_url": "https://github.com/octocat/Hello-World",
                    "provider": "groq",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = body_json(response).await;
        let id = body["analysis_id"].as_str().unwrap();
        let job = store.get(id).unwrap();
        assert_eq!(job.owner, "octocat");
        assert_eq!(job.repo, "Hello-World");
    }

    #[tokio::test]
    async fn results_filter_by_tier_but_count_everything() {
        let store = Arc::new(MemoryStore::new());
        seed_complete_job(
            &store,
            "job",
            vec![
                classified(1, Complexity::Advanced),
                classified(2, Complexity::Beginner),
                classified(3, Complexity::Intermediate),
            ],
        );
        let app = app(store, Some("k"));

        let response = app
            .oneshot(get("/api/analysis/job/results?complexity=beginner"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let issues = body["issues"].as_array().unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0]["number"], 2);
        // Counts cover the unfiltered set.
        assert_eq!(body["counts"]["beginner"], 1);
        assert_eq!(body["counts"]["intermediate"], 1);
        assert_eq!(body["counts"]["advanced"], 1);
        assert_eq!(body["counts"]["total"], 3);
    }

    #[tokio::test]
    async fn unfiltered_results_are_sorted_by_tier() {
        let store = Arc::new(MemoryStore::new());
        seed_complete_job(
            &store,
            "job",
            vec![
                classified(1, Complexity::Advanced),
                classified(2, Complexity::Beginner),
                classified(3, Complexity::Intermediate),
            ],
        );
        let app = app(store, Some("k"));

        let response = app.oneshot(get("/api/analysis/job/results")).await.unwrap();
        let body = body_json(response).await;
        let tiers: Vec<&str> = body["issues"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["complexity"].as_str().unwrap())
            .collect();
        assert_eq!(tiers, vec!["beginner", "intermediate", "advanced"]);
    }

    #[tokio::test]
    async fn chat_requires_a_complete_job() {
        let store = Arc::new(MemoryStore::new());
        store
            .create(AnalysisJob::new(
                "job".to_string(),
                "https://github.com/o/r".to_string(),
                "o".to_string(),
                "r".to_string(),
                ProviderKind::Groq,
            ))
            .unwrap();
        store.set_status("job", JobStatus::Processing, None).unwrap();
        let app = app(store, Some("k"));

        let response = app
            .oneshot(post_json(
                "/api/analysis/job/chat",
                serde_json::json!({
                    "message": "hi",
                    "provider": "groq",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("must be complete before chatting"));
    }

    #[tokio::test]
    async fn questions_adapt_to_the_analysis() {
        let store = Arc::new(MemoryStore::new());
        seed_complete_job(&store, "job", vec![classified(1, Complexity::Beginner)]);
        let app = app(store, Some("k"));

        let response = app
            .oneshot(get("/api/analysis/job/questions"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let questions = body["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 6);
        assert!(questions[3]
            .as_str()
            .unwrap()
            .contains("beginner issues related to UI/frontend"));
    }
}
