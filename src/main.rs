//! Fieldseal - selective field-level encryption for serialized documents.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fieldseal::cli::output;
use fieldseal::cli::{execute, Cli};
use fieldseal::core::constants::LOG_ENV;
use fieldseal::error::{ConfigError, Error};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("fieldseal=debug")
        } else {
            EnvFilter::new("fieldseal=warn")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    if let Err(e) = execute(cli.command) {
        // Format error with suggestion if available
        let error_msg = e.to_string();
        let suggestion = match &e {
            Error::Config(ConfigError::NotFound(_)) => {
                Some("create fieldseal.toml with a [cipher] backend, or pass --config")
            }
            Error::Config(ConfigError::Invalid(_)) => Some("run: fieldseal keygen aes"),
            _ => None,
        };

        output::error(&error_msg);
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
