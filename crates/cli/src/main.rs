//! Redraft CLI - audit AI text and rewrite it until it is safe.

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use redraft_checks::default_registry;
use redraft_core::{AuditConfig, AuditMode, SessionInput};
use redraft_gateway::{GenerationGateway, HttpGateway, ScriptedGateway};
use redraft_orchestrator::{CancellationToken, Orchestrator};
use redraft_storage::{JsonlSink, WebhookSink};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "redraft")]
#[command(about = "Audit AI-generated text and rewrite it until it is safe", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    backend: BackendArgs,
}

#[derive(Args)]
struct BackendArgs {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ollama-compatible generation backend
    #[arg(long, global = true, default_value = "http://localhost:11434")]
    gateway_url: String,

    /// Model name sent to the backend
    #[arg(long, global = true, default_value = "llama3")]
    model: String,

    /// Run without a generation backend (rewrites fall back)
    #[arg(long, global = true)]
    offline: bool,

    /// Enable an extra check category (repeatable)
    #[arg(long = "enable", global = true)]
    enable: Vec<String>,

    /// Append session records to a JSONL file
    #[arg(long, global = true)]
    log_jsonl: Option<PathBuf>,

    /// Notify this webhook about high-risk sessions
    #[arg(long, global = true)]
    webhook: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one text and print the verdict
    Audit {
        /// Text to audit
        text: String,
        /// Context passed to the checks (usually the user prompt)
        #[arg(long, default_value = "")]
        context: String,
        /// Audit mode (input or output)
        #[arg(long)]
        mode: Option<AuditMode>,
    },
    /// Run a full audit-remediate session
    Run {
        /// Prompt to answer (or the question a --candidate answers)
        #[arg(long, required_unless_present = "candidate")]
        prompt: Option<String>,
        /// Existing draft to audit
        #[arg(long)]
        candidate: Option<String>,
        /// Rewrite budget (defaults to the configured value)
        #[arg(long)]
        max_retries: Option<u32>,
        /// Audit mode (input or output)
        #[arg(long)]
        mode: Option<AuditMode>,
    },
    /// Print the effective configuration
    Config,
}

fn load_config(args: &BackendArgs, mode: Option<AuditMode>) -> Result<AuditConfig> {
    let mut config = match &args.config {
        Some(path) => AuditConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AuditConfig::default(),
    };
    config.apply_env_overrides()?;
    for category in &args.enable {
        config.enable(category);
    }
    if let Some(mode) = mode {
        config.mode = mode;
    }
    config.validate()?;
    Ok(config)
}

fn build_orchestrator(args: &BackendArgs, config: &AuditConfig) -> Result<Orchestrator> {
    let gateway: Arc<dyn GenerationGateway> = if args.offline {
        info!("Offline mode, rewrites will fall back");
        Arc::new(ScriptedGateway::new())
    } else {
        Arc::new(HttpGateway::with_timeout(
            &args.gateway_url,
            &args.model,
            config.generation_timeout(),
        ))
    };

    let registry = default_registry(config, Some(Arc::clone(&gateway)));
    let mut orchestrator = Orchestrator::from_registry(config, &registry, gateway)?;

    if let Some(path) = &args.log_jsonl {
        orchestrator = orchestrator.with_sink(Arc::new(JsonlSink::new(path)));
    }
    if let Some(url) = &args.webhook {
        orchestrator = orchestrator.with_sink(Arc::new(WebhookSink::new(url.clone())));
    }
    Ok(orchestrator)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Audit { text, context, mode } => {
            let config = load_config(&cli.backend, mode)?;
            let orchestrator = build_orchestrator(&cli.backend, &config)?;

            let verdict = orchestrator.audit(&text, &context).await;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Commands::Run {
            prompt,
            candidate,
            max_retries,
            mode,
        } => {
            let config = load_config(&cli.backend, mode)?;
            let orchestrator = build_orchestrator(&cli.backend, &config)?;

            let input = match candidate {
                Some(text) => SessionInput::Candidate { prompt, text },
                None => SessionInput::prompt(prompt.unwrap_or_default()),
            };
            let max_retries = max_retries.unwrap_or(orchestrator.max_retries());

            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling session");
                    trigger.cancel();
                }
            });

            let result = orchestrator.run(input, max_retries, &cancel).await;
            orchestrator.drain_sinks().await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Config => {
            let config = load_config(&cli.backend, None)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
