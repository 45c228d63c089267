//! Progress notifications for an analysis run.
//!
//! A run reports each phase as a [`ProgressEvent`] before doing the work, so
//! an interactive caller can show a live status line. Events are delivered
//! through an [`Arc<dyn AnalysisProgressCallback>`] set on
//! [`crate::config::AnalysisConfigBuilder::progress_callback`]; the
//! orchestrator's return value stays the single source of the final result.
//!
//! # Example
//!
//! ```rust
//! use revisor_cgr::{AnalysisConfig, AnalysisProgressCallback, ProgressEvent};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Recorder {
//!     lines: Mutex<Vec<String>>,
//! }
//!
//! impl AnalysisProgressCallback for Recorder {
//!     fn on_event(&self, event: &ProgressEvent) {
//!         self.lines.lock().unwrap().push(event.status_line());
//!     }
//! }
//!
//! let config = AnalysisConfig::builder()
//!     .progress_callback(Arc::new(Recorder::default()))
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::parse::ChecklistResultEntry;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// One step of a run, in the order they are emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Emitted first, before inputs are validated.
    Starting,
    /// About to extract the first document.
    ExtractingFirst { filename: String },
    /// About to extract the second document.
    ExtractingSecond { filename: String },
    /// About to request the executive summary.
    GeneratingSummary,
    /// About to analyse checklist item `index` (1-based) of `total`.
    AnalyzingItem {
        index: usize,
        total: usize,
        requirement: String,
    },
    /// All items analysed; rendering the HTML report.
    RenderingReport,
    /// The report is ready.
    Completed,
}

impl ProgressEvent {
    /// Human-readable status line for display.
    pub fn status_line(&self) -> String {
        match self {
            ProgressEvent::Starting => "Iniciando proceso...".to_string(),
            ProgressEvent::ExtractingFirst { .. } => {
                "Extrayendo texto del primer archivo...".to_string()
            }
            ProgressEvent::ExtractingSecond { .. } => {
                "Extrayendo texto del segundo archivo...".to_string()
            }
            ProgressEvent::GeneratingSummary => "Generando resumen ejecutivo con IA...".to_string(),
            ProgressEvent::AnalyzingItem {
                index,
                total,
                requirement,
            } => format!("Analizando requisito {index}/{total}: {requirement}..."),
            ProgressEvent::RenderingReport => "Generando reporte final...".to_string(),
            ProgressEvent::Completed => "✅ ¡Proceso completado!".to_string(),
        }
    }

    /// True for the terminal event of a successful run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Completed)
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status_line())
    }
}

/// Receives run events from the orchestrator.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. A run is strictly sequential, but the callback is
/// shared across tasks, hence `Send + Sync`.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called before each phase starts.
    fn on_event(&self, event: &ProgressEvent) {
        let _ = event;
    }

    /// Called after a checklist item has a result (including sentinel errors).
    ///
    /// # Arguments
    /// * `index`: 1-based position in the checklist
    /// * `total`: checklist length
    /// * `entry`: the requirement and its parsed result
    fn on_item_complete(&self, index: usize, total: usize, entry: &ChecklistResultEntry) {
        let _ = (index, total, entry);
    }

    /// Called once when a fatal error aborts the run.
    fn on_run_failed(&self, title: &str, message: &str) {
        let _ = (title, message);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;
