//! In-memory tracking of analysis runs started through the HTTP service.
//!
//! Each POST creates one [`JobRecord`]. The run's progress callback
//! ([`JobProgress`]) appends status lines to it; the spawned task stores the
//! output and the materialised report file when the run completes. Records
//! are independent: a run only ever touches its own entry.

use crate::analyze::{AnalysisOutput, AnalysisStats};
use crate::pipeline::parse::ChecklistResultEntry;
use crate::progress::{AnalysisProgressCallback, ProgressEvent};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::debug;
use uuid::Uuid;

/// Lifecycle of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Running,
    Completed,
    Failed,
}

/// Blocking error shown to the user when a run aborts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobError {
    pub title: String,
    pub message: String,
}

/// Everything known about one run.
#[derive(Debug)]
pub struct JobRecord {
    pub state: JobState,
    pub history: Vec<String>,
    pub error: Option<JobError>,
    pub output: Option<AnalysisOutput>,
    /// Owned copy of the report on disk; deleted when the record is dropped.
    pub report_file: Option<NamedTempFile>,
    created_at: Instant,
    finished_at: Option<Instant>,
}

impl JobRecord {
    fn new() -> Self {
        Self {
            state: JobState::Running,
            history: Vec::new(),
            error: None,
            output: None,
            report_file: None,
            created_at: Instant::now(),
            finished_at: None,
        }
    }

    /// Latest status line, or an empty string before the first event.
    pub fn status(&self) -> &str {
        self.history.last().map(String::as_str).unwrap_or("")
    }
}

/// JSON view of a job returned by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub job_id: Uuid,
    pub state: JobState,
    pub status: String,
    pub history: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<AnalysisStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<ChecklistResultEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// Shared map of job id → record.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    inner: Arc<Mutex<HashMap<Uuid, JobRecord>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, JobRecord>> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new running job and return its id.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(id, JobRecord::new());
        id
    }

    pub fn push_status(&self, id: Uuid, line: String) {
        if let Some(job) = self.lock().get_mut(&id) {
            job.history.push(line);
        }
    }

    /// Mark a job failed. Only a running job changes state.
    pub fn fail(&self, id: Uuid, title: &str, message: &str) {
        if let Some(job) = self.lock().get_mut(&id) {
            if job.state == JobState::Running {
                job.state = JobState::Failed;
                job.error = Some(JobError {
                    title: title.to_string(),
                    message: message.to_string(),
                });
                job.history.push(format!("{title}: {message}"));
                job.finished_at = Some(Instant::now());
            }
        }
    }

    /// Store the output of a finished run.
    pub fn complete(&self, id: Uuid, output: AnalysisOutput, report_file: Option<NamedTempFile>) {
        if let Some(job) = self.lock().get_mut(&id) {
            job.state = JobState::Completed;
            job.output = Some(output);
            job.report_file = report_file;
            job.finished_at = Some(Instant::now());
        }
    }

    pub fn snapshot(&self, id: Uuid) -> Option<JobSnapshot> {
        let jobs = self.lock();
        let job = jobs.get(&id)?;
        let done = job.state == JobState::Completed;
        Some(JobSnapshot {
            job_id: id,
            state: job.state,
            status: job.status().to_string(),
            history: job.history.clone(),
            error: job.error.clone(),
            stats: job.output.as_ref().map(|o| o.stats.clone()),
            entries: job.output.as_ref().map(|o| o.entries.clone()),
            report_url: done.then(|| format!("/api/analyses/{id}/report")),
            download_url: (done && job.report_file.is_some())
                .then(|| format!("/api/analyses/{id}/download")),
        })
    }

    /// The rendered report of a completed job.
    pub fn report_html(&self, id: Uuid) -> Option<String> {
        self.lock()
            .get(&id)
            .and_then(|job| job.output.as_ref().map(|o| o.html.clone()))
    }

    /// Path of the materialised report of a completed job.
    pub fn report_path(&self, id: Uuid) -> Option<PathBuf> {
        self.lock()
            .get(&id)
            .and_then(|job| job.report_file.as_ref().map(|f| f.path().to_path_buf()))
    }

    pub fn state(&self, id: Uuid) -> Option<JobState> {
        self.lock().get(&id).map(|job| job.state)
    }

    /// Drop finished jobs older than `retention`, deleting their report files.
    pub fn prune(&self, retention: Duration) -> usize {
        let mut jobs = self.lock();
        let before = jobs.len();
        jobs.retain(|_, job| match job.finished_at {
            Some(t) => t.elapsed() < retention,
            None => true,
        });
        let removed = before - jobs.len();
        if removed > 0 {
            debug!("Pruned {} finished jobs", removed);
        }
        removed
    }

    /// Age of a job, for logging.
    pub fn age(&self, id: Uuid) -> Option<Duration> {
        self.lock().get(&id).map(|job| job.created_at.elapsed())
    }
}

/// Progress callback that writes a run's events into its job record.
pub struct JobProgress {
    store: JobStore,
    id: Uuid,
}

impl JobProgress {
    pub fn new(store: JobStore, id: Uuid) -> Self {
        Self { store, id }
    }
}

impl AnalysisProgressCallback for JobProgress {
    fn on_event(&self, event: &ProgressEvent) {
        self.store.push_status(self.id, event.status_line());
    }

    fn on_run_failed(&self, title: &str, message: &str) {
        self.store.fail(self.id, title, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output() -> AnalysisOutput {
        AnalysisOutput {
            summary: "- Objeto: X".into(),
            entries: Vec::new(),
            html: "<html></html>".into(),
            stats: AnalysisStats::default(),
        }
    }

    #[test]
    fn progress_events_accumulate_in_history() {
        let store = JobStore::new();
        let id = store.create();
        let cb = JobProgress::new(store.clone(), id);
        cb.on_event(&ProgressEvent::Starting);
        cb.on_event(&ProgressEvent::GeneratingSummary);

        let snap = store.snapshot(id).unwrap();
        assert_eq!(snap.state, JobState::Running);
        assert_eq!(snap.history.len(), 2);
        assert_eq!(snap.status, "Generando resumen ejecutivo con IA...");
        assert!(snap.report_url.is_none());
    }

    #[test]
    fn failure_is_recorded_once() {
        let store = JobStore::new();
        let id = store.create();
        store.fail(id, "Faltan Archivos", "sube ambos");
        store.fail(id, "Error de API", "otra");

        let snap = store.snapshot(id).unwrap();
        assert_eq!(snap.state, JobState::Failed);
        assert_eq!(snap.error.unwrap().title, "Faltan Archivos");
    }

    #[test]
    fn completion_exposes_urls_and_report() {
        let store = JobStore::new();
        let id = store.create();
        let out = output();
        let file = out.materialize().unwrap();
        store.complete(id, out, Some(file));

        let snap = store.snapshot(id).unwrap();
        assert_eq!(snap.state, JobState::Completed);
        assert_eq!(snap.report_url.unwrap(), format!("/api/analyses/{id}/report"));
        assert_eq!(snap.download_url.unwrap(), format!("/api/analyses/{id}/download"));
        assert_eq!(store.report_html(id).unwrap(), "<html></html>");
        assert!(store.report_path(id).unwrap().exists());
    }

    #[test]
    fn prune_removes_finished_jobs_and_their_files() {
        let store = JobStore::new();
        let running = store.create();
        let done = store.create();
        let out = output();
        let file = out.materialize().unwrap();
        let path = file.path().to_path_buf();
        store.complete(done, out, Some(file));

        assert_eq!(store.prune(Duration::ZERO), 1);
        assert!(store.state(running).is_some());
        assert!(store.state(done).is_none());
        assert!(!path.exists());
        assert_eq!(store.prune(Duration::ZERO), 0);
    }

    #[test]
    fn unknown_job_has_no_snapshot() {
        assert!(JobStore::new().snapshot(Uuid::new_v4()).is_none());
    }
}
