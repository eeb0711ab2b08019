// SPDX-License-Identifier: Apache-2.0

//! Analysis pipeline orchestration.
//!
//! Fetches a repository's open issues, classifies them in fixed-size
//! batches with a fixed delay between batches, and publishes partial
//! results to the store after every batch so status polls see progress.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::config::BatchPolicy;
use crate::store::AnalysisStore;
use crate::types::{
    ClassifiedIssue, ComplexityAnalysis, Issue, JobStatus, Progress,
};

/// Source of a repository's open issues.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Fetches up to `max_issues` open issues, newest first, PRs excluded.
    async fn fetch_open_issues(
        &self,
        owner: &str,
        repo: &str,
        max_issues: usize,
    ) -> Result<Vec<Issue>>;
}

/// Classifier for one batch of issues.
#[async_trait]
pub trait IssueClassifier: Send + Sync {
    /// Classifies a batch, returning analyses keyed by issue number.
    ///
    /// Every input issue is expected to have an entry on success; the
    /// pipeline substitutes a default for any that are missing anyway.
    async fn classify_batch(
        &self,
        issues: &[Issue],
    ) -> anyhow::Result<BTreeMap<u64, ComplexityAnalysis>>;
}

/// Runs one analysis job to completion.
///
/// A fetch failure marks the job `Error` and aborts. A batch failure does
/// not: every issue in the failed batch gets the default tier with the
/// failure text as reasoning, and the run continues.
///
/// # Errors
///
/// Returns the fetch error after recording it on the job; classification
/// errors are absorbed into per-issue results.
#[instrument(skip(store, source, classifier, policy), fields(job_id = %job_id, owner = %owner, repo = %repo))]
pub async fn run_analysis(
    store: &dyn AnalysisStore,
    source: &dyn IssueSource,
    classifier: &dyn IssueClassifier,
    job_id: &str,
    owner: &str,
    repo: &str,
    max_issues: usize,
    policy: &BatchPolicy,
) -> Result<()> {
    store.set_status(job_id, JobStatus::Processing, None)?;

    let issues = match source.fetch_open_issues(owner, repo, max_issues).await {
        Ok(issues) => issues,
        Err(e) => {
            warn!(error = %e, "Issue fetch failed");
            store.set_status(job_id, JobStatus::Error, Some(e.to_string()))?;
            return Err(e);
        }
    };

    let total = issues.len();
    store.set_progress(
        job_id,
        Progress { current: 0, total },
    )?;

    let mut classified: Vec<ClassifiedIssue> = Vec::with_capacity(total);
    let batch_count = issues.chunks(policy.batch_size).count();

    for (index, batch) in issues.chunks(policy.batch_size).enumerate() {
        debug!(batch = index + 1, of = batch_count, size = batch.len(), "Classifying batch");

        let analyses = match classifier.classify_batch(batch).await {
            Ok(analyses) => analyses,
            Err(e) => {
                warn!(batch = index + 1, error = %e, "Batch classification failed");
                let failed = ComplexityAnalysis::failed(&e.to_string());
                batch
                    .iter()
                    .map(|issue| (issue.number, failed.clone()))
                    .collect()
            }
        };

        for issue in batch {
            let analysis = analyses
                .get(&issue.number)
                .cloned()
                .unwrap_or_else(ComplexityAnalysis::unanalyzed);
            classified.push(ClassifiedIssue::new(issue.clone(), analysis));
        }

        store.set_progress(
            job_id,
            Progress {
                current: classified.len().min(total),
                total,
            },
        )?;
        store.set_issues(job_id, classified.clone())?;

        // Fixed pause between batches keeps providers under their rate
        // limits; skipped after the last batch.
        if index + 1 < batch_count {
            tokio::time::sleep(Duration::from_millis(policy.batch_delay_ms)).await;
        }
    }

    store.set_status(job_id, JobStatus::Complete, None)?;
    info!(total, "Analysis complete");

    Ok(())
}
