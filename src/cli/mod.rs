//! Command-line interface.

pub mod check;
pub mod demo;
pub mod keygen;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::config::Config;
use crate::error::Result;

/// Fieldseal - selective field-level encryption for serialized documents.
#[derive(Parser)]
#[command(
    name = "fieldseal",
    about = "Selective field-level encryption for serialized documents",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Generate a key for a local backend
    Keygen {
        #[arg(value_enum)]
        kind: KeyKind,
    },

    /// Load the config and round-trip a sample value through the backend
    Check {
        /// Config file (default: ./fieldseal.toml)
        #[arg(short, long, env = "FIELDSEAL_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Encrypt, store and read back a sample document
    Demo {
        /// Config file; an ephemeral age key is used when none exists
        #[arg(short, long, env = "FIELDSEAL_CONFIG")]
        config: Option<PathBuf>,
    },
}

/// Key types `keygen` can produce.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KeyKind {
    /// Base64 AES-256 master key
    Aes,
    /// age x25519 identity
    Age,
}

/// Execute a command.
pub fn execute(command: Command) -> Result<()> {
    use Command::*;

    match command {
        Keygen { kind } => keygen::execute(kind),
        Check { config } => check::execute(config),
        Demo { config } => demo::execute(config),
    }
}

fn config_path(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(Config::default_path)
}
