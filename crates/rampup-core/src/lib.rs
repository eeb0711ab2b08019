// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # Rampup Core
//!
//! Core library for rampup - AI-assisted contributor onboarding for GitHub
//! repositories.
//!
//! This crate provides reusable components for:
//! - GitHub API integration (repository parsing, issue fetching, repo context)
//! - Issue complexity classification via interchangeable AI backends
//! - Batched analysis orchestration with progress tracking
//! - A repository chat assistant with streamed answers
//!
//! ## Modules
//!
//! - [`ai`] - AI backends, batch classifier, and SSE streaming
//! - [`auth`] - Credential resolution trait
//! - [`chat`] - Repository chat assistant
//! - [`config`] - Batch policy and AI request settings
//! - [`error`] - Error types
//! - [`github`] - GitHub API (URL parsing, issues, repo context)
//! - [`pipeline`] - Analysis orchestration
//! - [`store`] - Job storage

pub mod ai;
pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod github;
pub mod pipeline;
pub mod retry;
pub mod store;
pub mod types;
pub mod util;

pub use auth::KeyResolver;
pub use error::RampupError;

/// Convenience Result type for rampup operations.
///
/// This is equivalent to `std::result::Result<T, RampupError>`.
pub type Result<T> = std::result::Result<T, RampupError>;

pub use ai::{ChatModel, ModelClassifier, provider_for};
pub use config::{AiConfig, BatchPolicy};
pub use github::{RepoRef, build_client, parse_repo_ref};
pub use pipeline::{IssueClassifier, IssueSource, run_analysis};
pub use store::{AnalysisStore, MemoryStore};
pub use types::{
    AnalysisJob, ChatRole, ChatTurn, ClassifiedIssue, Complexity, ComplexityAnalysis, Issue,
    JobStatus, Progress, ProviderKind, TierCounts,
};
