use crate::adapters::export::ExportFormat;
use crate::domain::model::Language;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const TOKEN_ENV_VAR: &str = "SOC_PROOF_TOKEN";

#[derive(Debug, Clone, Parser)]
#[command(name = "soc-proof")]
#[command(about = "Command-line client for the soc-proof.su order API")]
#[command(version)]
pub struct CliConfig {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API token; overrides the config file and SOC_PROOF_TOKEN
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List services with catalog text
    Services {
        #[arg(long, short, default_value = "en", value_parser = parse_language)]
        language: Language,

        /// Bypass the cache
        #[arg(long)]
        refresh: bool,

        #[arg(long, short, default_value = "json", value_parser = parse_format)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show one service
    Service {
        id: u32,

        #[arg(long, short, default_value = "en", value_parser = parse_language)]
        language: Language,
    },
    /// Show catalog descriptions
    Descriptions {
        #[arg(long, short, default_value = "en", value_parser = parse_language)]
        language: Language,
    },
    /// Place an order
    Add {
        #[arg(long)]
        service: u32,

        #[arg(long)]
        link: String,

        #[arg(long)]
        quantity: u64,
    },
    /// Query order status
    Status {
        /// Order IDs, separated by spaces or commas
        #[arg(required = true, value_delimiter = ',')]
        orders: Vec<String>,
    },
    /// Show account balance
    Balance,
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse().map_err(|e: crate::utils::error::SocProofError| e.to_string())
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse().map_err(|e: crate::utils::error::SocProofError| e.to_string())
}

impl CliConfig {
    /// Token from the flag, falling back to the environment.
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
            .filter(|t| !t.trim().is_empty())
    }
}
