//! In-process stand-ins for the PDF extractor and the LLM service.

#![allow(dead_code)]

use async_trait::async_trait;
use revisor_cgr::prompts::REQUIREMENT_RESPONSE_FORMAT;
use revisor_cgr::{
    AnalysisConfig, AnalysisProgressCallback, ChecklistResultEntry, ExtractError, LlmClient,
    LlmConnector, LlmError, Orchestrator, ProgressEvent, TextExtractor,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A well-formed requirement completion, wrapped in chatter the parser must skip.
pub const FOUND_COMPLETION: &str = "Claro, aquí está:\n```json\n{\"encontrado\": \"Sí\", \"archivo\": \"cartel.pdf\", \"clausula\": \"3.1 Garantía\", \"texto_relevante\": \"Se exige garantía del 5%.\"}\n```";

pub const SUMMARY_COMPLETION: &str = "- Objeto: Compra de equipo médico.\n- Presupuesto: ₡10.000.000";

// ── Extractor ────────────────────────────────────────────────────────────────

/// Returns canned text; any path containing `corrupto` fails.
#[derive(Default)]
pub struct StubExtractor {
    pub calls: AtomicUsize,
}

impl StubExtractor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextExtractor for StubExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path.to_string_lossy();
        if name.contains("corrupto") {
            return Err(ExtractError::new("estructura xref dañada"));
        }
        Ok(format!("Contenido de prueba de {name}"))
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

type Responder = dyn Fn(&str) -> Result<String, LlmError> + Send + Sync;

/// Connector whose client answers through `responder` and records prompts.
pub struct StubConnector {
    pub connects: AtomicUsize,
    pub generates: Arc<AtomicUsize>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub reject_key: bool,
    responder: Arc<Responder>,
}

impl StubConnector {
    pub fn new(
        responder: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            connects: AtomicUsize::new(0),
            generates: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            reject_key: false,
            responder: Arc::new(responder),
        }
    }

    /// Summary → [`SUMMARY_COMPLETION`], every item → [`FOUND_COMPLETION`].
    pub fn happy() -> Self {
        Self::new(|prompt| {
            if is_requirement_prompt(prompt) {
                Ok(FOUND_COMPLETION.to_string())
            } else {
                Ok(SUMMARY_COMPLETION.to_string())
            }
        })
    }

    pub fn rejecting_key() -> Self {
        Self {
            reject_key: true,
            ..Self::happy()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn generates(&self) -> usize {
        self.generates.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl LlmConnector for StubConnector {
    fn connect(&self, _api_key: &str) -> Result<Arc<dyn LlmClient>, LlmError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.reject_key {
            return Err(LlmError::Configuration("API key not valid".into()));
        }
        Ok(Arc::new(StubClient {
            generates: Arc::clone(&self.generates),
            prompts: Arc::clone(&self.prompts),
            responder: Arc::clone(&self.responder),
        }))
    }
}

struct StubClient {
    generates: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
    responder: Arc<Responder>,
}

#[async_trait]
impl LlmClient for StubClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generates.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.responder)(prompt)
    }
}

pub fn is_requirement_prompt(prompt: &str) -> bool {
    prompt.contains(REQUIREMENT_RESPONSE_FORMAT)
}

// ── Progress ─────────────────────────────────────────────────────────────────

/// Records everything the orchestrator reports.
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<ProgressEvent>>,
    pub items: Mutex<Vec<(usize, usize, ChecklistResultEntry)>>,
    pub failure: Mutex<Option<(String, String)>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn failure(&self) -> Option<(String, String)> {
        self.failure.lock().unwrap().clone()
    }
}

impl AnalysisProgressCallback for Recorder {
    fn on_event(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn on_item_complete(&self, index: usize, total: usize, entry: &ChecklistResultEntry) {
        self.items
            .lock()
            .unwrap()
            .push((index, total, entry.clone()));
    }

    fn on_run_failed(&self, title: &str, message: &str) {
        *self.failure.lock().unwrap() = Some((title.to_string(), message.to_string()));
    }
}

// ── Wiring ───────────────────────────────────────────────────────────────────

/// Orchestrator over the stubs with no pacing delay.
pub fn orchestrator(
    connector: Arc<StubConnector>,
    extractor: Arc<StubExtractor>,
    recorder: Option<Arc<Recorder>>,
) -> Orchestrator {
    let mut builder = AnalysisConfig::builder().item_delay_ms(0);
    if let Some(r) = recorder {
        builder = builder.progress_callback(r);
    }
    Orchestrator::new(connector, extractor, builder.build().unwrap())
}

/// Number of body rows in a rendered report.
pub fn tbody_rows(html: &str) -> usize {
    let body = html
        .split_once("<tbody>")
        .and_then(|(_, rest)| rest.split_once("</tbody>"))
        .map(|(body, _)| body)
        .unwrap_or("");
    body.matches("<tr>").count()
}
