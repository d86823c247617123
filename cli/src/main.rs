//! CLI entrypoint for agora
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use agora_application::{DebateService, NoTranscriptLogger, TranscriptLogger};
use agora_domain::{DebateStatus, OutputFormat};
use agora_infrastructure::{BackendRouter, ConfigLoader, JsonlTranscriptLogger, ToolRegistry};
use agora_presentation::{Cli, ConsoleFormatter, EventPrinter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // Load configuration, then let flags override it
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };

    if let Some(rounds) = cli.rounds {
        config.debate.max_rounds = rounds;
    }
    if let Some(backend) = &cli.backend {
        config.backends.default = backend.clone();
    }
    if let Some(path) = &cli.transcript {
        config.output.transcript = Some(path.display().to_string());
    }
    config.validate().context("invalid configuration")?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    let task = match cli.task {
        Some(task) => task,
        None => bail!("A debate task is required. Pass the question as the first argument."),
    };

    let document = match &cli.document {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read document {}", path.display()))?,
        ),
        None => None,
    };

    // Panel selection: the configured panel, optionally narrowed by -p flags
    let mut personas = config.panel();
    if !cli.persona.is_empty() {
        let available: Vec<&str> = personas.iter().map(|p| p.id.as_str()).collect();
        for id in &cli.persona {
            if !available.contains(&id.as_str()) {
                bail!("Unknown persona \"{}\". Available: {}", id, available.join(", "));
            }
        }
        personas.retain(|p| cli.persona.contains(&p.id));
    }

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();

    info!("Starting agora");

    // === Dependency Injection ===
    let router = Arc::new(
        BackendRouter::from_config(
            config.backends.clone(),
            config.moderator.backend_ref().as_ref(),
        )
        .context("failed to configure backends")?,
    );
    let tools = Arc::new(ToolRegistry::with_builtin_tools());
    let transcript: Arc<dyn TranscriptLogger> = match &config.output.transcript {
        Some(path) => match JsonlTranscriptLogger::new(path) {
            Some(logger) => Arc::new(logger),
            // The logger already warned about the unwritable path
            None => Arc::new(NoTranscriptLogger),
        },
        None => Arc::new(NoTranscriptLogger),
    };

    let service = DebateService::new(router, tools, transcript, config.debate.clone());

    let debate_id = service.create(task, document, personas.clone())?;
    let mut subscription = service.subscribe(&debate_id)?;
    service.start(&debate_id)?;

    let printer = EventPrinter::new(personas, cli.quiet);
    if printer.run(&mut subscription).await.is_none() {
        warn!("Event stream closed before the debate finished");
    }

    let state = service.state(&debate_id)?;
    println!("{}", ConsoleFormatter::format(&state, format));

    if state.status == DebateStatus::Error {
        std::process::exit(1);
    }

    Ok(())
}
