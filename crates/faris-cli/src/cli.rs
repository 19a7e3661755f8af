//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use faris_domain::Domain;
use std::path::PathBuf;

/// FARIS - Analyse LLM answers for failures and score their risk.
#[derive(Debug, Parser)]
#[command(name = "faris")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FARIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one line per result)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyse one question/answer pair
    Analyze(AnalyzeArgs),

    /// Show the failure taxonomy
    Taxonomy,

    /// Print an engine configuration as TOML
    Config(ConfigArgs),

    /// Inspect stored analyses
    Cases(CasesArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// The question that was asked
    #[arg(short, long, required_unless_present = "input")]
    pub question: Option<String>,

    /// The answer under analysis
    #[arg(short, long, required_unless_present = "input")]
    pub answer: Option<String>,

    /// Deployment domain
    #[arg(short, long, value_enum, default_value = "general")]
    pub domain: DomainArg,

    /// Reference context the answer should be grounded in
    #[arg(long)]
    pub context: Option<String>,

    /// JSON file holding the whole request
    #[arg(short, long, conflicts_with_all = ["question", "answer"])]
    pub input: Option<PathBuf>,

    /// Run heuristics only, never calling the reasoning backend
    #[arg(long)]
    pub offline: bool,

    /// Engine preset overriding the configured engine settings
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Backend model overriding the configured one
    #[arg(short, long, env = "FARIS_MODEL")]
    pub model: Option<String>,

    /// SQLite database to persist the result in
    #[arg(long)]
    pub db: Option<PathBuf>,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Print a preset instead of the configured engine settings
    #[arg(short, long, value_enum)]
    pub preset: Option<PresetArg>,
}

/// Arguments for case inspection.
#[derive(Debug, Parser)]
pub struct CasesArgs {
    /// SQLite database holding the cases
    #[arg(long)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub action: CasesAction,
}

/// Case inspection actions.
#[derive(Debug, Subcommand)]
pub enum CasesAction {
    /// List the most recent cases
    List {
        /// Maximum number of cases
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one stored result
    Show {
        /// Case ID
        case_id: String,
    },

    /// Aggregate statistics over all cases
    Stats,
}

/// Domain argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DomainArg {
    /// No domain-specific weighting
    General,
    /// Medical advice
    Medical,
    /// Legal advice
    Legal,
    /// Financial advice
    Finance,
    /// Source code
    Code,
}

/// Engine preset argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Balanced timeouts and limits
    Default,
    /// Short timeouts, fewer claims
    Aggressive,
    /// Long timeouts, more claims
    Lenient,
}

impl PresetArg {
    /// Preset name as understood by the engine
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetArg::Default => "default",
            PresetArg::Aggressive => "aggressive",
            PresetArg::Lenient => "lenient",
        }
    }
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<DomainArg> for Domain {
    fn from(domain: DomainArg) -> Self {
        match domain {
            DomainArg::General => Domain::General,
            DomainArg::Medical => Domain::Medical,
            DomainArg::Legal => Domain::Legal,
            DomainArg::Finance => Domain::Finance,
            DomainArg::Code => Domain::Code,
        }
    }
}
