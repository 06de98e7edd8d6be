use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Settings;

mod cli;
mod invoke;

/// Journalisation sur stderr; stdout reste réservé à la charge utile JSON.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

/// Analyse la ligne de commande, prépare les réglages et exécute la commande.
pub fn run() -> ExitCode {
    let args = cli::Cli::parse();
    setup_logging();

    let settings = Settings::resolve(args.settings_dir);
    if let Err(e) = settings.ensure_dirs() {
        log::error!(
            "Failed to prepare settings directory {}: {}",
            settings.settings_dir.display(),
            e
        );
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(invoke::dispatch(args.command, &settings)) {
        Ok(payload) => match serde_json::to_string_pretty(&payload) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
