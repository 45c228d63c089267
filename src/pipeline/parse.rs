//! Response parsing: turn a requirement completion into an [`AnalysisResult`].
//!
//! Models often wrap the requested JSON in prose or code fences. The parser
//! takes the substring from the first `{` to the last `}` (inclusive) and
//! decodes that. The heuristic will mis-extract when a completion carries
//! several brace-delimited objects; that is a known limitation, kept so the
//! output matches what reviewers are used to.
//!
//! Any failure (the call itself, no braces, invalid JSON) yields the
//! sentinel result from [`AnalysisResult::api_error`], so the orchestrator
//! always gets one well-formed result per checklist item.

use crate::error::LlmError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

/// Whether a requirement was found in the documents.
///
/// Serialises as its [`Found::label`] so JSON output matches the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Found {
    #[serde(rename = "Sí")]
    Yes,
    #[serde(rename = "No")]
    No,
    #[serde(rename = "Error")]
    Error,
}

impl Found {
    /// Normalise the model's free-text verdict.
    ///
    /// Affirmatives ("Sí", "si", "yes", "true") map to [`Found::Yes`],
    /// "error" to [`Found::Error`], anything else to [`Found::No`].
    pub fn from_verdict(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "sí" | "si" | "yes" | "true" => Found::Yes,
            "error" => Found::Error,
            _ => Found::No,
        }
    }

    /// Label shown in the "Cumple" column.
    pub fn label(&self) -> &'static str {
        match self {
            Found::Yes => "Sí",
            Found::No => "No",
            Found::Error => "Error",
        }
    }
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured verdict for one checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub found: Found,
    pub source_file: Option<String>,
    pub clause: Option<String>,
    pub relevant_text: Option<String>,
}

impl AnalysisResult {
    /// Sentinel substituted whenever the call or the decode fails.
    pub fn api_error(message: impl Into<String>) -> Self {
        Self {
            found: Found::Error,
            source_file: Some("N/A".to_string()),
            clause: Some("Error en API".to_string()),
            relevant_text: Some(message.into()),
        }
    }
}

/// A checklist requirement paired with its result, in checklist order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistResultEntry {
    pub requirement: String,
    pub result: AnalysisResult,
}

/// The JSON object the requirement prompt asks for.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default, alias = "found", deserialize_with = "lenient_string")]
    encontrado: Option<String>,
    #[serde(default, alias = "file", deserialize_with = "lenient_string")]
    archivo: Option<String>,
    #[serde(default, alias = "clause", deserialize_with = "lenient_string")]
    clausula: Option<String>,
    #[serde(
        default,
        alias = "relevantText",
        alias = "relevant_text",
        deserialize_with = "lenient_string"
    )]
    texto_relevante: Option<String>,
}

/// Accept strings, null, and other scalars (stringified).
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl From<RawVerdict> for AnalysisResult {
    fn from(raw: RawVerdict) -> Self {
        Self {
            found: raw
                .encontrado
                .as_deref()
                .map(Found::from_verdict)
                .unwrap_or(Found::No),
            source_file: raw.archivo,
            clause: raw.clausula,
            relevant_text: raw.texto_relevante,
        }
    }
}

/// Slice from the first `{` to the last `}`, inclusive.
pub fn extract_json_object(completion: &str) -> Option<&str> {
    let start = completion.find('{')?;
    let end = completion.rfind('}')?;
    (start < end).then(|| &completion[start..=end])
}

/// Decode a requirement completion into an [`AnalysisResult`].
pub fn parse_requirement_completion(completion: &str) -> AnalysisResult {
    let Some(object) = extract_json_object(completion.trim()) else {
        warn!("Completion has no JSON object ({} chars)", completion.len());
        return AnalysisResult::api_error(format!(
            "La respuesta del modelo no contiene un objeto JSON: {}",
            preview(completion)
        ));
    };

    match serde_json::from_str::<RawVerdict>(object) {
        Ok(raw) => raw.into(),
        Err(e) => {
            warn!("Completion JSON did not decode: {}", e);
            AnalysisResult::api_error(e.to_string())
        }
    }
}

/// Map the outcome of a requirement call to a result, never failing.
pub fn parse_requirement_response(response: Result<String, LlmError>) -> AnalysisResult {
    match response {
        Ok(text) => parse_requirement_completion(&text),
        Err(e) => AnalysisResult::api_error(e.to_string()),
    }
}

/// Summary completions are used verbatim; a failed call becomes an
/// explanatory sentence so the report still renders.
pub fn summary_text(response: Result<String, LlmError>) -> String {
    match response {
        Ok(text) => text,
        Err(e) => format!("No se pudo generar el resumen debido a un error: {e}"),
    }
}

fn preview(s: &str) -> String {
    const MAX: usize = 120;
    let trimmed = s.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}\u{2026}", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
