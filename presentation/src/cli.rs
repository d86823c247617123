//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for a finished debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every round and argument, then the summary
    Full,
    /// Only the final summary
    Summary,
    /// JSON output of the final debate state
    Json,
}

impl From<OutputFormat> for agora_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => agora_domain::OutputFormat::Full,
            OutputFormat::Summary => agora_domain::OutputFormat::Summary,
            OutputFormat::Json => agora_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for agora
#[derive(Parser, Debug)]
#[command(name = "agora")]
#[command(author, version, about = "Structured multi-round debates between LLM personas")]
#[command(long_about = r#"
Agora runs a structured debate: a panel of independently configured
personas argues a task over multiple rounds while a non-arguing moderator
decides after each round whether to continue, then synthesizes a final
summary with consensus, agreements, disagreements, and a recommendation.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./agora.toml        Project-level config
3. ~/.config/agora/config.toml   Global config

Example:
  agora "Should we migrate the billing service to Rust?"
  agora --document rfc.md --rounds 4 "Is the proposed architecture sound?"
  agora --backend ollama -p optimist -p skeptic "Ship this week or wait?"
"#)]
pub struct Cli {
    /// The question or proposition to debate
    pub task: Option<String>,

    /// Path to a reference document personas may search and quote
    #[arg(short, long, value_name = "PATH")]
    pub document: Option<PathBuf>,

    /// Maximum number of rounds (overrides configuration)
    #[arg(short, long, value_name = "N")]
    pub rounds: Option<u32>,

    /// Restrict the panel to these persona ids (can be specified multiple times)
    #[arg(short, long, value_name = "ID")]
    pub persona: Vec<String>,

    /// Default backend for this debate (anthropic, openai, gemini, ollama)
    #[arg(short, long, value_name = "NAME")]
    pub backend: Option<String>,

    /// Output format (overrides configuration; default: summary)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress live progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, conflicts_with = "config")]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write a JSONL transcript of the debate to this path
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,
}
