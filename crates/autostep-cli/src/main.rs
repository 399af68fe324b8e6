//! `autostep` binary entry point.

#![deny(unsafe_code)]

use std::process::ExitCode;

use autostep_cli::{Cli, Command, ErrorClass, dispatch};
use autostep_core::logging::{init_subscriber, level_for};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let diagnostic = match &cli.command {
        Command::Build(args) | Command::Run(args) => args.diagnostic,
        Command::New { .. } => false,
    };
    init_subscriber(level_for(cli.verbose, diagnostic));

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let _ = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            interrupt.cancel();
        }
    });

    match dispatch(cli, &cancel).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            match err.class() {
                ErrorClass::Configuration => error!("{err}"),
                ErrorClass::Fault => error!("command failed: {err}"),
            }
            ExitCode::FAILURE
        }
    }
}
