// SPDX-License-Identifier: Apache-2.0

//! Job storage.
//!
//! The store is injected wherever job state is read or written, so the
//! in-memory implementation can be swapped for a persistent one without
//! touching the pipeline or the server handlers.
//!
//! Status transitions are monotonic: once a job reaches `Complete` or
//! `Error`, later writes to status and progress are ignored.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;

use crate::Result;
use crate::error::RampupError;
use crate::types::{AnalysisJob, ClassifiedIssue, JobStatus, Progress};

/// Storage for analysis jobs.
pub trait AnalysisStore: Send + Sync {
    /// Inserts a new job, replacing any previous job with the same id.
    fn create(&self, job: AnalysisJob) -> Result<()>;

    /// Returns a snapshot of the job.
    ///
    /// # Errors
    ///
    /// Returns [`RampupError::JobNotFound`] for unknown ids.
    fn get(&self, id: &str) -> Result<AnalysisJob>;

    /// Moves the job to a new status, recording the error message if any.
    ///
    /// Writes against a terminal job are ignored.
    fn set_status(&self, id: &str, status: JobStatus, error: Option<String>) -> Result<()>;

    /// Updates progress counters.
    ///
    /// `current` never decreases and never exceeds `total`; writes against
    /// a terminal job are ignored.
    fn set_progress(&self, id: &str, progress: Progress) -> Result<()>;

    /// Replaces the job's classified-issue list.
    fn set_issues(&self, id: &str, issues: Vec<ClassifiedIssue>) -> Result<()>;
}

/// In-memory [`AnalysisStore`]; jobs live for the process lifetime.
#[derive(Default)]
pub struct MemoryStore {
    jobs: RwLock<HashMap<String, AnalysisJob>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_job<F>(&self, id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut AnalysisJob),
    {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| RampupError::JobNotFound { id: id.to_string() })?;
        f(job);
        job.updated_at = Utc::now();
        Ok(())
    }
}

impl AnalysisStore for MemoryStore {
    fn create(&self, job: AnalysisJob) -> Result<()> {
        debug!(job_id = %job.id, repo = %job.repo_url, "Creating analysis job");
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<AnalysisJob> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(id)
            .cloned()
            .ok_or_else(|| RampupError::JobNotFound { id: id.to_string() })
    }

    fn set_status(&self, id: &str, status: JobStatus, error: Option<String>) -> Result<()> {
        self.with_job(id, |job| {
            if job.status.is_terminal() {
                return;
            }
            job.status = status;
            if error.is_some() {
                job.error = error;
            }
        })
    }

    fn set_progress(&self, id: &str, progress: Progress) -> Result<()> {
        self.with_job(id, |job| {
            if job.status.is_terminal() {
                return;
            }
            job.progress.total = progress.total;
            let clamped = progress.current.min(progress.total);
            job.progress.current = job.progress.current.max(clamped);
        })
    }

    fn set_issues(&self, id: &str, issues: Vec<ClassifiedIssue>) -> Result<()> {
        self.with_job(id, |job| {
            job.issues = issues;
        })
    }
}
