//! Error types for the revisor-cgr library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`RevisorError`] (**fatal**): the analysis run cannot proceed at all
//!   (no credential, a missing upload, the LLM client cannot be configured,
//!   a PDF cannot be read). Returned as `Err(RevisorError)` from
//!   [`crate::analyze::Orchestrator::run`].
//!
//! * [`LlmError`] (**non-fatal**): a single LLM call failed. The summary
//!   becomes a placeholder sentence and a checklist item becomes the
//!   sentinel result (see [`crate::pipeline::parse`]); the run still
//!   completes and the defect is visible in the report.
//!
//! * [`ExtractError`]: the PDF extractor's error value. The orchestrator
//!   turns it into [`RevisorError::ReadError`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the revisor-cgr library.
#[derive(Debug, Error)]
pub enum RevisorError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No API credential was supplied.
    #[error("Por favor, ingresa tu Google API Key.")]
    MissingCredential,

    /// One or both PDF uploads are absent.
    #[error("Por favor, sube ambos documentos PDF para continuar.")]
    MissingFiles,

    /// The LLM client could not be configured with the supplied credential.
    #[error("No se pudo configurar la API de Gemini. Verifica tu clave. Error: {detail}")]
    ApiConfiguration { detail: String },

    /// Text extraction failed for one of the documents.
    #[error("{source}")]
    ReadError {
        filename: String,
        #[source]
        source: ExtractError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not materialise the rendered report on disk.
    #[error("Failed to write report file '{path}': {source}")]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RevisorError {
    /// The user-facing category shown as the heading of a blocking error.
    pub fn title(&self) -> &'static str {
        match self {
            RevisorError::MissingCredential => "Error de Autenticación",
            RevisorError::MissingFiles => "Faltan Archivos",
            RevisorError::ApiConfiguration { .. } => "Error de API",
            RevisorError::ReadError { .. } => "Error de Lectura",
            RevisorError::ReportWriteFailed { .. } => "Error de Escritura",
            RevisorError::InvalidConfig(_) => "Error de Configuración",
            RevisorError::Internal(_) => "Error Interno",
        }
    }
}

/// A non-fatal error from a single LLM content-generation call.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// The request could not be sent, or no answer arrived in time.
    #[error("request failed: {0}")]
    Transport(String),

    /// The service rejected the request with a known HTTP status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The provider reported a failure without a status to go with it.
    #[error("provider error: {0}")]
    Provider(String),

    /// The service answered but produced no usable text (safety block,
    /// empty candidate list, ...).
    #[error("empty completion: {0}")]
    EmptyCompletion(String),

    /// The client could not be built from the supplied credential.
    #[error("{0}")]
    Configuration(String),
}

impl From<edgequake_llm::LlmError> for LlmError {
    fn from(e: edgequake_llm::LlmError) -> Self {
        use edgequake_llm::LlmError as E;
        match e {
            E::AuthError(message) => LlmError::Api {
                status: 401,
                message,
            },
            E::RateLimited(message) => LlmError::Api {
                status: 429,
                message,
            },
            E::InvalidRequest(message) => LlmError::Api {
                status: 400,
                message,
            },
            E::ModelNotFound(message) => LlmError::Api {
                status: 404,
                message,
            },
            E::NetworkError(detail) => LlmError::Transport(detail),
            E::Timeout => LlmError::Transport("request timed out".into()),
            E::ConfigError(detail) => LlmError::Configuration(detail),
            other => LlmError::Provider(other.to_string()),
        }
    }
}

/// Why a PDF could not be turned into text.
///
/// The `Display` form always starts with the extraction error marker so it
/// can be shown to the user verbatim.
#[derive(Debug, Clone, Error)]
#[error("Error al leer el archivo PDF: {detail}")]
pub struct ExtractError {
    pub detail: String,
}

impl ExtractError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_titles_name_the_category() {
        assert_eq!(RevisorError::MissingCredential.title(), "Error de Autenticación");
        assert_eq!(RevisorError::MissingFiles.title(), "Faltan Archivos");
        assert_eq!(
            RevisorError::ApiConfiguration {
                detail: "bad key".into()
            }
            .title(),
            "Error de API"
        );
    }

    #[test]
    fn api_configuration_display_includes_detail() {
        let e = RevisorError::ApiConfiguration {
            detail: "invalid header value".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Verifica tu clave"), "got: {msg}");
        assert!(msg.contains("invalid header value"), "got: {msg}");
    }

    #[test]
    fn read_error_display_starts_with_marker() {
        let e = RevisorError::ReadError {
            filename: "cartel.pdf".into(),
            source: ExtractError::new("corrupt xref"),
        };
        assert_eq!(e.title(), "Error de Lectura");
        assert!(e.to_string().starts_with("Error al leer el archivo PDF:"));
        assert!(e.to_string().contains("corrupt xref"));
    }

    #[test]
    fn llm_api_error_display() {
        let e = LlmError::Api {
            status: 400,
            message: "API key not valid".into(),
        };
        assert!(e.to_string().contains("400"));
        assert!(e.to_string().contains("API key not valid"));
    }

    #[test]
    fn provider_errors_keep_their_status() {
        let e: LlmError = edgequake_llm::LlmError::AuthError("API key not valid".into()).into();
        assert!(matches!(e, LlmError::Api { status: 401, .. }));
        assert!(e.to_string().contains("API key not valid"));

        let e: LlmError = edgequake_llm::LlmError::RateLimited("quota".into()).into();
        assert!(matches!(e, LlmError::Api { status: 429, .. }));
    }

    #[test]
    fn provider_network_failures_are_transport_errors() {
        let e: LlmError = edgequake_llm::LlmError::NetworkError("connection reset".into()).into();
        assert!(matches!(e, LlmError::Transport(ref d) if d == "connection reset"));

        let e: LlmError = edgequake_llm::LlmError::Timeout.into();
        assert!(matches!(e, LlmError::Transport(_)));
    }

    #[test]
    fn unclassified_provider_errors_keep_their_message() {
        let e: LlmError = edgequake_llm::LlmError::ApiError("candidate blocked".into()).into();
        assert!(matches!(e, LlmError::Provider(_)));
        assert!(e.to_string().contains("candidate blocked"));
    }
}
