// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// qrdetect — command-line host for the QR detector native module.
//
// Entry point. Initialises logging, loads configuration, registers the
// shipped modules, dispatches one detect call, and tears the modules down.
// The settled response goes to stdout, a rejection to stderr.

mod args;
mod host;

use std::process::ExitCode;

use clap::Parser;

use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(?args, "qrdetect starting");

    match host::run(&args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "host setup failed");
            ExitCode::from(host::EXIT_REJECTED)
        }
    }
}
