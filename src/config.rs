//! Configuration types for an analysis run and for the HTTP service.
//!
//! All run behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. Service settings live in [`ServerConfig`],
//! which reads its overrides from the environment.

use crate::error::RevisorError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::net::SocketAddr;

/// Default generative model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// The model the checklist prompts were first tuned against. Retired by
/// Google; accounts that still serve it can select it with `--model`.
pub const LEGACY_MODEL: &str = "gemini-1.5-pro-latest";

/// Default listening port for the form service.
pub const DEFAULT_PORT: u16 = 7860;

/// Configuration for one checklist analysis run.
///
/// # Example
/// ```rust
/// use revisor_cgr::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("gemini-2.5-pro")
///     .item_delay_ms(2000)
///     .build()
///     .unwrap();
/// assert_eq!(config.item_delay_ms, 2000);
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Gemini model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Sampling temperature. `None` leaves the service default in place.
    pub temperature: Option<f32>,

    /// Deadline for a single LLM request, in seconds. Default: 120.
    ///
    /// This is the only timeout involved; the run itself has none.
    pub request_timeout_secs: u64,

    /// Pause between consecutive checklist-item requests, in milliseconds. Default: 1000.
    ///
    /// Keeps a run under the per-minute request quota of the free tier.
    /// Set to 0 in tests or against a local stub.
    pub item_delay_ms: u64,

    /// Receives status events as the run advances.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            request_timeout_secs: 120,
            item_delay_ms: 1000,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("item_delay_ms", &self.item_delay_ms)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn AnalysisProgressCallback>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn item_delay_ms(mut self, ms: u64) -> Self {
        self.config.item_delay_ms = ms;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, RevisorError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(RevisorError::InvalidConfig("model must not be empty".into()));
        }
        if c.request_timeout_secs == 0 {
            return Err(RevisorError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Settings for the HTTP form service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address. Fixed to all interfaces so the service is reachable
    /// from outside a container.
    pub host: [u8; 4],

    /// Listening port. Default: 7860, overridable via `PORT`.
    pub port: u16,

    /// Largest accepted multipart body, in bytes. Default: 50 MiB.
    pub max_upload_bytes: usize,

    /// How long a finished job (and its report file) is kept, in seconds. Default: 3600.
    pub job_retention_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: [0, 0, 0, 0],
            port: DEFAULT_PORT,
            max_upload_bytes: 50 * 1024 * 1024,
            job_retention_secs: 3600,
        }
    }
}

impl ServerConfig {
    /// Read `PORT`, `REVISOR_MAX_UPLOAD_MB` and `REVISOR_JOB_RETENTION_SECS`.
    ///
    /// Unparseable values fall back to the defaults with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(port) = parse_env::<u16>("PORT") {
            config.port = port;
        }
        if let Some(mb) = parse_env::<usize>("REVISOR_MAX_UPLOAD_MB") {
            config.max_upload_bytes = mb.max(1) * 1024 * 1024;
        }
        if let Some(secs) = parse_env::<u64>("REVISOR_JOB_RETENTION_SECS") {
            config.job_retention_secs = secs;
        }
        config
    }

    /// The socket address the service binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
