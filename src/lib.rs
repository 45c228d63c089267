//! # revisor-cgr
//!
//! Checklist review of public-procurement documents with an LLM.
//!
//! A user submits two PDFs (the SICOP system summary and the bidding
//! conditions, "pliego de condiciones") together with a Google AI key. The
//! text of both is extracted, joined behind per-file markers, summarised, and
//! checked against a fixed list of 14 requirements, one model call per
//! requirement. The result is a self-contained HTML report with an executive
//! summary and a verification table.
//!
//! ## Pipeline Overview
//!
//! ```text
//! api_key + file1.pdf + file2.pdf
//!  │
//!  ├─ 1. Validate  credential present, both files present
//!  ├─ 2. Connect   Gemini client bound to the user's key
//!  ├─ 3. Extract   pdfium page text (CPU-bound, spawn_blocking)
//!  ├─ 4. Join      "--- INICIO: name ---" … "--- FIN: name ---"
//!  ├─ 5. Summary   one call; failure becomes a visible sentence
//!  ├─ 6. Checklist 14 sequential calls; failure becomes a sentinel row
//!  └─ 7. Report    HTML document (summary + table)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use revisor_cgr::{AnalysisConfig, AnalysisRequest, DocumentInput, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::with_defaults(AnalysisConfig::default());
//!     let request = AnalysisRequest {
//!         api_key: std::env::var("GEMINI_API_KEY")?,
//!         file1: Some(DocumentInput::from_path("sicop.pdf")),
//!         file2: Some(DocumentInput::from_path("cartel.pdf")),
//!     };
//!     let output = orchestrator.run(&request).await?;
//!     output.write_to("reporte.html").await?;
//!     eprintln!("{}/{} requisitos encontrados",
//!         output.stats.found_items, output.stats.total_items);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `revisor` binary (clap + anyhow + indicatif + tracing-subscriber) |
//! | `bundled` | on      | Embeds the pdfium library in the binary via `pdfium-auto` |
//!
//! The HTTP service ([`server`]) is part of the library so it can be embedded
//! or driven in tests without binding a socket.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod checklist;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{AnalysisOutput, AnalysisRequest, AnalysisStats, DocumentInput, Orchestrator};
pub use checklist::CHECKLIST_ITEMS;
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, ServerConfig, DEFAULT_MODEL, LEGACY_MODEL,
};
pub use error::{ExtractError, LlmError, RevisorError};
pub use pipeline::extract::{PdfiumExtractor, TextExtractor};
pub use pipeline::llm::{GeminiConnector, LlmClient, LlmConnector, ProviderClient};
pub use pipeline::parse::{AnalysisResult, ChecklistResultEntry, Found};
pub use pipeline::render::render_report;
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback, ProgressEvent};
pub use server::{build_router, AppState};
