//! Pipeline stages for a checklist analysis.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the external collaborators (pdfium, the LLM service) sit behind
//! traits the orchestrator receives from its caller.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ prompts ──▶ llm ──▶ parse ──▶ render
//! (pdfium)    (text)      (HTTP)  (JSON)    (HTML)
//! ```
//!
//! 1. [`extract`]: PDF → page-joined text, in `spawn_blocking`
//! 2. [`llm`]: credential → client; prompt → completion
//! 3. [`parse`]: completion → [`parse::AnalysisResult`], never failing
//! 4. [`render`]: summary + results → self-contained HTML

pub mod extract;
pub mod llm;
pub mod parse;
pub mod render;
