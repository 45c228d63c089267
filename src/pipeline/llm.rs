//! LLM interaction: configure a client from the user's credential and send
//! single-prompt generation requests.
//!
//! Two traits form the seam:
//!
//! * [`LlmConnector`] applies a credential and yields a client. A failure
//!   here is fatal for the run.
//! * [`LlmClient`] sends one prompt and returns the raw completion text.
//!   Calls are independent; no conversation state is kept between them.
//!
//! [`GeminiConnector`] is the production implementation. It builds an
//! `edgequake_llm` Gemini provider per credential, so concurrent runs with
//! different keys never share state. Prompt wording lives in
//! [`crate::prompts`]; this module only moves text to and from the provider.

use crate::config::AnalysisConfig;
use crate::error::LlmError;
use async_trait::async_trait;
use edgequake_llm::{CompletionOptions, GeminiProvider, LLMProvider};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Sends one prompt to the model and returns its text completion.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Builds an [`LlmClient`] from a user-supplied credential.
pub trait LlmConnector: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn LlmClient>, LlmError>;
}

/// Connector for Google's Gemini models.
#[derive(Debug, Clone)]
pub struct GeminiConnector {
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl GeminiConnector {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

impl LlmConnector for GeminiConnector {
    /// Build a Gemini provider bound to `api_key` and the configured model.
    ///
    /// An empty key, or one carrying control characters, fails here before
    /// any document is read.
    fn connect(&self, api_key: &str) -> Result<Arc<dyn LlmClient>, LlmError> {
        let key = api_key.trim();
        if key.is_empty() {
            return Err(LlmError::Configuration("la clave de API está vacía".into()));
        }
        if key.chars().any(char::is_control) {
            return Err(LlmError::Configuration(
                "la clave de API contiene caracteres no válidos".into(),
            ));
        }

        let provider = GeminiProvider::new(key).with_model(&self.model);
        Ok(Arc::new(ProviderClient::new(
            Arc::new(provider),
            self.temperature,
            self.timeout,
        )))
    }
}

/// [`LlmClient`] over any `edgequake_llm` provider.
pub struct ProviderClient {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout: Duration,
}

impl ProviderClient {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: Option<f32>, timeout: Duration) -> Self {
        Self {
            provider,
            options: build_options(temperature),
            timeout,
        }
    }
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .field("temperature", &self.options.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl LlmClient for ProviderClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let start = Instant::now();
        let call = self.provider.complete_with_options(prompt, &self.options);

        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("Generation failed on {}: {}", self.provider.model(), e);
                return Err(e.into());
            }
            Err(_) => {
                warn!("Generation timed out after {:?}", self.timeout);
                return Err(LlmError::Transport(format!(
                    "sin respuesta tras {} s",
                    self.timeout.as_secs()
                )));
            }
        };

        if response.content.trim().is_empty() {
            return Err(LlmError::EmptyCompletion("respuesta vacía".into()));
        }

        debug!(
            "Generated {} chars for a {} char prompt in {:?}",
            response.content.len(),
            prompt.len(),
            start.elapsed()
        );
        Ok(response.content)
    }
}

/// Build `CompletionOptions` from the run's sampling settings.
fn build_options(temperature: Option<f32>) -> CompletionOptions {
    CompletionOptions {
        temperature,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgequake_llm::MockProvider;

    fn connector() -> GeminiConnector {
        GeminiConnector::new(&AnalysisConfig::default())
    }

    #[test]
    fn connect_rejects_blank_key() {
        let err = connector().connect("   ").err().unwrap();
        assert!(matches!(err, LlmError::Configuration(_)));
    }

    #[test]
    fn connect_rejects_key_with_control_chars() {
        let err = connector().connect("abc\ndef").err().unwrap();
        assert!(err.to_string().contains("no válidos"));
    }

    #[test]
    fn connect_accepts_plain_key() {
        assert!(connector().connect("AIzaSyTestKey").is_ok());
    }

    #[test]
    fn build_options_carries_temperature_only() {
        let opts = build_options(Some(0.2));
        assert_eq!(opts.temperature, Some(0.2));
        assert!(opts.max_tokens.is_none());
        assert!(build_options(None).temperature.is_none());
    }

    #[tokio::test]
    async fn generate_returns_provider_content() {
        let mock = MockProvider::new();
        mock.add_response("- Objeto: Compra de equipo.").await;
        let client = ProviderClient::new(Arc::new(mock), None, Duration::from_secs(5));

        let text = client.generate("resume").await.unwrap();
        assert_eq!(text, "- Objeto: Compra de equipo.");
    }

    #[tokio::test]
    async fn blank_completion_is_an_error() {
        let mock = MockProvider::new();
        mock.add_response("  \n").await;
        let client = ProviderClient::new(Arc::new(mock), Some(0.0), Duration::from_secs(5));

        let err = client.generate("resume").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyCompletion(_)));
    }
}
