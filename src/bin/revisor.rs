//! CLI binary for revisor-cgr.
//!
//! `revisor serve` starts the web form; `revisor check` runs one analysis
//! from the terminal. Both are thin shims over the library crate.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use revisor_cgr::{
    server, AnalysisConfig, AnalysisProgressCallback, AnalysisRequest, ChecklistResultEntry,
    DocumentInput, Found, Orchestrator, ProgressCallback, ProgressEvent, ServerConfig,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner showing the current status line, plus one log line per
/// checklist item as it completes.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {elapsed:>4}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_event(&self, event: &ProgressEvent) {
        if event.is_terminal() {
            self.bar.finish_and_clear();
            eprintln!("{}", green(&event.status_line()));
        } else {
            self.bar.set_message(event.status_line());
        }
    }

    fn on_item_complete(&self, index: usize, total: usize, entry: &ChecklistResultEntry) {
        let mark = match entry.result.found {
            Found::Yes => green("✓"),
            Found::No => red("✗"),
            Found::Error => yellow("⚠"),
        };
        self.bar.println(format!(
            "  {} {:>2}/{:<2}  {}  {}",
            mark,
            index,
            total,
            entry.requirement,
            dim(entry.result.clause.as_deref().unwrap_or("")),
        ));
    }

    fn on_run_failed(&self, _title: &str, _message: &str) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the web form on port 7860
  revisor serve

  # Review two documents, write the report to a file
  revisor check --api-key AIza... sicop.pdf cartel.pdf -o reporte.html

  # Per-item results as JSON
  GEMINI_API_KEY=AIza... revisor check sicop.pdf cartel.pdf --json

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY              Google AI key used by `check`
  PORT                        Listening port for `serve` (default 7860)
  REVISOR_MAX_UPLOAD_MB       Largest accepted upload for `serve` (default 50)
  REVISOR_JOB_RETENTION_SECS  How long finished web jobs are kept (default 3600)
  REVISOR_MODEL               Gemini model ID (default gemini-2.5-flash)
  PDFIUM_LIB_PATH             Path to an existing libpdfium; skips auto-download
  RUST_LOG                    Log filter, overrides --verbose/--quiet
"#;

/// Checklist review of procurement PDFs with Google Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "revisor",
    version,
    about = "Checklist review of procurement PDFs with Google Gemini",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "REVISOR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "REVISOR_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web form.
    Serve(ServeArgs),
    /// Analyse two PDFs and write the report.
    Check(CheckArgs),
}

/// Options shared by both subcommands.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Gemini model ID [default: gemini-2.5-flash].
    #[arg(long, env = "REVISOR_MODEL")]
    model: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "REVISOR_TEMPERATURE")]
    temperature: Option<f32>,

    /// Pause between consecutive checklist requests, in milliseconds.
    #[arg(long, env = "REVISOR_ITEM_DELAY_MS", default_value_t = 1000)]
    item_delay_ms: u64,

    /// Per-request timeout in seconds.
    #[arg(long, env = "REVISOR_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listening port.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Google AI API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// "Resumen del Sistema (SICOP)" PDF.
    file1: PathBuf,

    /// "Pliego de Condiciones (Cartel)" PDF.
    file2: PathBuf,

    /// Write the HTML report to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the per-item results as JSON instead of the HTML report.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    model: ModelArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers progress in `check`; library INFO logs would only
    // interleave with it.
    let interactive_check = matches!(cli.command, Command::Check(ref a) if !a.json);
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || interactive_check {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Ensure PDFium engine is available ───────────────────────────────
    // With `bundled`, the library was embedded at compile time and only
    // needs extracting. Without it, the first extraction downloads it.
    #[cfg(feature = "bundled")]
    {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_bundled())
            .context("Failed to extract bundled PDFium engine")?;
    }

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Check(args) => check(args, cli.quiet).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }

    let analysis = build_config(&args.model, None)?;
    let state = server::AppState::new(Orchestrator::with_defaults(analysis), config);
    server::serve(state).await.context("Server failed")
}

async fn check(args: CheckArgs, quiet: bool) -> Result<()> {
    let progress: Option<ProgressCallback> = if quiet || args.json {
        None
    } else {
        Some(CliProgressCallback::new() as Arc<dyn AnalysisProgressCallback>)
    };

    let config = build_config(&args.model, progress)?;
    let orchestrator = Orchestrator::with_defaults(config);
    let request = AnalysisRequest {
        api_key: args.api_key,
        file1: Some(DocumentInput::from_path(&args.file1)),
        file2: Some(DocumentInput::from_path(&args.file2)),
    };

    let output = orchestrator
        .run(&request)
        .await
        .map_err(|e| anyhow!("{}: {}", e.title(), e))?;

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if let Some(ref path) = args.output {
        output
            .write_to(path)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.html.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {}/{} encontrados  {} no  {} errores  {}ms{}",
            if stats.error_items == 0 {
                green("✔")
            } else {
                yellow("⚠")
            },
            stats.found_items,
            stats.total_items,
            stats.not_found_items,
            stats.error_items,
            stats.duration_ms,
            args.output
                .as_ref()
                .map(|p| format!("  →  {}", bold(&p.display().to_string())))
                .unwrap_or_default(),
        );
    }

    Ok(())
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(args: &ModelArgs, progress: Option<ProgressCallback>) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder()
        .item_delay_ms(args.item_delay_ms)
        .request_timeout_secs(args.api_timeout);

    if let Some(ref model) = args.model {
        builder = builder.model(model.clone());
    }
    if let Some(t) = args.temperature {
        builder = builder.temperature(t);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
