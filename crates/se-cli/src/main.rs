//! Shape editor shell entry point

mod command;
mod shell;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use se_core::{EditSession, EditorConfig};
use se_kernel::{MemoryKernel, ModelKernel};

use crate::shell::Shell;

/// Interactive editor for points, curves and faces
#[derive(Debug, Parser)]
#[command(name = "shape-edit", version)]
struct Args {
    /// Editor configuration file (RON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial model to import (RON)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Write the default configuration to this file and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "se_cli=info,se_core=info,se_kernel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Some(path) = &args.write_config {
        return match EditorConfig::default().save(path) {
            Ok(()) => {
                tracing::info!("Wrote default configuration to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("Failed to write configuration: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match &args.config {
        Some(path) => match EditorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to load configuration from {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => EditorConfig::default(),
    };

    let mut kernel = MemoryKernel::new();
    if let Some(path) = &args.model {
        if let Err(e) = kernel.import_model(path) {
            tracing::error!("Failed to import {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        tracing::info!("Imported model from {}", path.display());
    }

    let session = EditSession::new(kernel, config);
    let _trace_events = session.subscribe(|event| tracing::trace!(?event, "editor event"));

    tracing::info!("Starting shape editor shell");
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut shell = Shell::new(session, std::io::stdout());
    match shell.run(stdin.lock(), interactive) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Shell stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}
