//! The analysis run: validation → extraction → summary → per-item checks →
//! report.
//!
//! [`Orchestrator::run`] drives the phases strictly in order and emits a
//! [`ProgressEvent`] before each one. Only the fatal conditions of
//! [`RevisorError`] stop a run; a failed summary or checklist item is
//! folded into the report as visible content and the run carries on.
//!
//! Items are analysed one after another with a configurable pause between
//! consecutive requests. There are no retries: a failed call becomes that
//! item's sentinel result.

use crate::checklist::CHECKLIST_ITEMS;
use crate::config::AnalysisConfig;
use crate::error::RevisorError;
use crate::pipeline::extract::{extract_document, PdfiumExtractor, TextExtractor};
use crate::pipeline::llm::{GeminiConnector, LlmClient, LlmConnector};
use crate::pipeline::parse::{
    parse_requirement_response, summary_text, ChecklistResultEntry, Found,
};
use crate::pipeline::render::render_report;
use crate::prompts::{build_requirement_prompt, build_summary_prompt, consolidate};
use crate::progress::ProgressEvent;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// One uploaded document: the name the user gave it and where it lives now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInput {
    /// Base name shown in markers, prompts and the report.
    pub filename: String,
    pub path: PathBuf,
}

impl DocumentInput {
    /// `filename` is reduced to its last path component; browsers on some
    /// platforms send the full client-side path.
    pub fn new(filename: &str, path: impl Into<PathBuf>) -> Self {
        let base = filename
            .rsplit(['/', '\\'])
            .find(|s| !s.is_empty())
            .unwrap_or("documento.pdf");
        Self {
            filename: base.to_string(),
            path: path.into(),
        }
    }

    /// Use the file's own name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "documento.pdf".to_string());
        Self::new(&name, path)
    }
}

/// Inputs of one run, as submitted by the user.
#[derive(Clone, Default)]
pub struct AnalysisRequest {
    pub api_key: String,
    /// "Resumen del Sistema" document.
    pub file1: Option<DocumentInput>,
    /// "Pliego de Condiciones" document.
    pub file2: Option<DocumentInput>,
}

impl fmt::Debug for AnalysisRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisRequest")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("file1", &self.file1)
            .field("file2", &self.file2)
            .finish()
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    pub total_items: usize,
    pub found_items: usize,
    pub not_found_items: usize,
    pub error_items: usize,
    pub duration_ms: u64,
}

/// Everything a completed run produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    /// Executive summary, verbatim from the model (or the failure sentence).
    pub summary: String,
    /// One entry per checklist item, in checklist order.
    pub entries: Vec<ChecklistResultEntry>,
    /// The rendered report.
    #[serde(skip)]
    pub html: String,
    pub stats: AnalysisStats,
}

impl AnalysisOutput {
    /// Write the report to a fresh temp file that lives as long as the
    /// returned handle.
    pub fn materialize(&self) -> Result<NamedTempFile, RevisorError> {
        let mut file = tempfile::Builder::new()
            .prefix("reporte_")
            .suffix(".html")
            .tempfile()
            .map_err(|e| RevisorError::ReportWriteFailed {
                path: std::env::temp_dir(),
                source: e,
            })?;
        std::io::Write::write_all(&mut file, self.html.as_bytes()).map_err(|e| {
            RevisorError::ReportWriteFailed {
                path: file.path().to_path_buf(),
                source: e,
            }
        })?;
        debug!("Report materialised at {}", file.path().display());
        Ok(file)
    }

    /// Write the report to `path` atomically (temp file + rename).
    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<(), RevisorError> {
        let path = path.as_ref();
        let write_err = |source| RevisorError::ReportWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let tmp_path = path.with_extension("html.tmp");
        tokio::fs::write(&tmp_path, &self.html)
            .await
            .map_err(write_err)?;
        tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
        Ok(())
    }
}

/// Sequences one analysis run over its collaborators.
#[derive(Clone)]
pub struct Orchestrator {
    connector: Arc<dyn LlmConnector>,
    extractor: Arc<dyn TextExtractor>,
    config: AnalysisConfig,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        connector: Arc<dyn LlmConnector>,
        extractor: Arc<dyn TextExtractor>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            connector,
            extractor,
            config,
        }
    }

    /// Gemini over HTTP and pdfium for text.
    pub fn with_defaults(config: AnalysisConfig) -> Self {
        Self::new(
            Arc::new(GeminiConnector::new(&config)),
            Arc::new(PdfiumExtractor::new()),
            config,
        )
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Same collaborators, different configuration (e.g. a per-run callback).
    pub fn with_config(&self, config: AnalysisConfig) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            extractor: Arc::clone(&self.extractor),
            config,
        }
    }

    /// Run a full analysis.
    ///
    /// # Errors
    /// Only the fatal conditions: missing credential, missing files, client
    /// configuration failure, or a document that cannot be read. The
    /// progress callback receives `on_run_failed` before the error returns.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisOutput, RevisorError> {
        let result = self.run_inner(request).await;
        if let Err(ref e) = result {
            warn!("Analysis aborted: {}: {}", e.title(), e);
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_run_failed(e.title(), &e.to_string());
            }
        }
        result
    }

    async fn run_inner(&self, request: &AnalysisRequest) -> Result<AnalysisOutput, RevisorError> {
        let start = Instant::now();
        self.emit(ProgressEvent::Starting);

        // ── Step 1: Validate inputs ──────────────────────────────────────
        if request.api_key.trim().is_empty() {
            return Err(RevisorError::MissingCredential);
        }
        let (Some(file1), Some(file2)) = (&request.file1, &request.file2) else {
            return Err(RevisorError::MissingFiles);
        };

        // ── Step 2: Configure the LLM client ─────────────────────────────
        let client = self
            .connector
            .connect(&request.api_key)
            .map_err(|e| RevisorError::ApiConfiguration {
                detail: e.to_string(),
            })?;

        // ── Steps 3–4: Extract both documents ────────────────────────────
        self.emit(ProgressEvent::ExtractingFirst {
            filename: file1.filename.clone(),
        });
        let text1 = self.extract(file1).await?;

        self.emit(ProgressEvent::ExtractingSecond {
            filename: file2.filename.clone(),
        });
        let text2 = self.extract(file2).await?;

        // ── Step 5: Consolidate ──────────────────────────────────────────
        let consolidated = consolidate(&file1.filename, &text1, &file2.filename, &text2);
        info!(
            "Consolidated {} + {} chars from '{}' and '{}'",
            text1.len(),
            text2.len(),
            file1.filename,
            file2.filename
        );

        // ── Step 6: Executive summary (degrades, never aborts) ───────────
        self.emit(ProgressEvent::GeneratingSummary);
        let summary_response = client.generate(&build_summary_prompt(&consolidated)).await;
        if let Err(ref e) = summary_response {
            warn!("Summary generation failed: {}", e);
        }
        let summary = summary_text(summary_response);

        // ── Step 7: Checklist items, sequentially ────────────────────────
        let entries = self
            .analyze_items(client.as_ref(), &consolidated, &file1.filename, &file2.filename)
            .await;

        // ── Step 8: Render ───────────────────────────────────────────────
        self.emit(ProgressEvent::RenderingReport);
        let html = render_report(&summary, &entries);

        let stats = AnalysisStats {
            total_items: entries.len(),
            found_items: count(&entries, Found::Yes),
            not_found_items: count(&entries, Found::No),
            error_items: count(&entries, Found::Error),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Analysis complete: {}/{} found, {} errors, {}ms",
            stats.found_items, stats.total_items, stats.error_items, stats.duration_ms
        );

        self.emit(ProgressEvent::Completed);

        Ok(AnalysisOutput {
            summary,
            entries,
            html,
            stats,
        })
    }

    async fn extract(&self, doc: &DocumentInput) -> Result<String, RevisorError> {
        extract_document(Arc::clone(&self.extractor), &doc.path)
            .await
            .map_err(|source| RevisorError::ReadError {
                filename: doc.filename.clone(),
                source,
            })
    }

    /// One entry per checklist item, in order, whatever each call returns.
    async fn analyze_items(
        &self,
        client: &dyn LlmClient,
        consolidated: &str,
        filename1: &str,
        filename2: &str,
    ) -> Vec<ChecklistResultEntry> {
        let total = CHECKLIST_ITEMS.len();
        let delay = Duration::from_millis(self.config.item_delay_ms);
        let mut entries = Vec::with_capacity(total);

        for (i, requirement) in CHECKLIST_ITEMS.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let index = i + 1;
            self.emit(ProgressEvent::AnalyzingItem {
                index,
                total,
                requirement: requirement.to_string(),
            });

            let prompt = build_requirement_prompt(requirement, consolidated, filename1, filename2);
            let result = parse_requirement_response(client.generate(&prompt).await);
            debug!("Item {}/{}: {}", index, total, result.found);

            let entry = ChecklistResultEntry {
                requirement: requirement.to_string(),
                result,
            };
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_item_complete(index, total, &entry);
            }
            entries.push(entry);
        }

        entries
    }

    fn emit(&self, event: ProgressEvent) {
        debug!("{}", event);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_event(&event);
        }
    }
}

fn count(entries: &[ChecklistResultEntry], found: Found) -> usize {
    entries.iter().filter(|e| e.result.found == found).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_input_keeps_base_name() {
        assert_eq!(DocumentInput::new("C:\\Users\\x\\Cartel.pdf", "/tmp/a").filename, "Cartel.pdf");
        assert_eq!(DocumentInput::new("/home/u/sicop.pdf", "/tmp/b").filename, "sicop.pdf");
        assert_eq!(DocumentInput::new("plain.pdf", "/tmp/c").filename, "plain.pdf");
        assert_eq!(DocumentInput::new("", "/tmp/d").filename, "documento.pdf");
    }

    #[test]
    fn document_input_from_path() {
        let d = DocumentInput::from_path("/data/pliego.pdf");
        assert_eq!(d.filename, "pliego.pdf");
        assert_eq!(d.path, PathBuf::from("/data/pliego.pdf"));
    }

    #[test]
    fn request_debug_redacts_key() {
        let req = AnalysisRequest {
            api_key: "AIzaSecret".into(),
            ..Default::default()
        };
        let s = format!("{req:?}");
        assert!(!s.contains("AIzaSecret"));
        assert!(s.contains("<redacted>"));
    }

    fn output(html: &str) -> AnalysisOutput {
        AnalysisOutput {
            summary: String::new(),
            entries: Vec::new(),
            html: html.to_string(),
            stats: AnalysisStats::default(),
        }
    }

    #[test]
    fn materialize_writes_html_file() {
        let out = output("<html>x</html>");
        let file = out.materialize().unwrap();
        assert!(file.path().extension().is_some_and(|e| e == "html"));
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "<html>x</html>");
    }

    #[tokio::test]
    async fn write_to_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/report.html");
        output("<p>ok</p>").write_to(&target).await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "<p>ok</p>");
        assert!(!target.with_extension("html.tmp").exists());
    }
}
