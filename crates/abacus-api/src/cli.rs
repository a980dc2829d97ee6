//! Command-line interface

use crate::config::AbacusConfig;
use abacus_core::EvaluationService;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Abacus expression evaluation service
#[derive(Parser, Debug)]
#[command(name = "abacus")]
#[command(about = "Arithmetic expression evaluation service")]
#[command(version)]
pub struct Cli {
    /// Configuration file (overrides ABACUS_CONFIG_PATH)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start the HTTP server (default)
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,

        /// Bind port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Evaluate expressions and print the records as JSON
    Eval {
        #[arg(required = true)]
        expressions: Vec<String>,
    },

    /// Print the effective configuration
    CheckConfig,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve { host: None, port: None })
    }

    /// Load configuration from the file and apply environment overrides
    pub fn load_config(&self) -> anyhow::Result<AbacusConfig> {
        let config = match &self.config {
            Some(path) => AbacusConfig::load_from(path)?,
            None => AbacusConfig::load()?,
        };
        Ok(config.apply_profile())
    }
}

/// Evaluate expressions in order, one JSON record per line
pub fn eval_command(expressions: &[String]) -> anyhow::Result<Vec<String>> {
    let service = EvaluationService::new();
    let records = service.evaluate_batch(expressions)?;

    records.iter().map(|record| Ok(serde_json::to_string(record)?)).collect()
}
