// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docscan — detect, straighten and save a document page from a photo.
//
// Entry point. Initialises logging, builds the desktop bridge from the
// command line, runs one scan session, and prints where the page went.

mod cli;
mod services;

use std::process::ExitCode;

use clap::Parser;
use docscan_bridge::{DesktopBridge, TempDirStorage};
use docscan_core::error::ScanError;
use docscan_core::human_errors::humanize_error;
use docscan_core::types::ScanSource;
use docscan_session::{ScanOutcome, Scanner};

use cli::Cli;
use services::data_dir::default_scan_dir;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!(image = %cli.image.display(), "docscan starting");

    match run(&cli).await {
        Ok(outcome) => report(&cli, outcome),
        Err(err) => fail(&err),
    }
}

async fn run(cli: &Cli) -> Result<ScanOutcome, ScanError> {
    let config = cli.scan_config()?;
    let out_dir = match &cli.out_dir {
        Some(dir) => dir.clone(),
        None => default_scan_dir()
            .map_err(|err| ScanError::Storage(format!("cannot create the scan directory: {err}")))?,
    };

    let mut bridge = DesktopBridge::new(TempDirStorage::new(out_dir)).with_gallery_image(&cli.image);
    if let Some(corners) = cli.corners {
        bridge = bridge.with_corners(corners);
    }

    let scanner = Scanner::new(bridge, config);
    let source = ScanSource::from(cli.source).to_string();
    let handle = scanner.start_scan(&source)?;
    Ok(handle.outcome().await)
}

fn report(cli: &Cli, outcome: ScanOutcome) -> ExitCode {
    match outcome {
        ScanOutcome::Completed(result) => {
            if cli.json {
                match serde_json::to_string_pretty(&result) {
                    Ok(json) => println!("{json}"),
                    Err(err) => return fail(&err.into()),
                }
            } else {
                println!("{}", result.path.display());
            }
            tracing::info!(
                width = result.width,
                height = result.height,
                auto_detected = result.auto_detected,
                "Page saved"
            );
            ExitCode::SUCCESS
        }
        ScanOutcome::Failed(err) => fail(&err),
        ScanOutcome::Cancelled => {
            eprintln!("Scan cancelled.");
            ExitCode::from(2)
        }
        ScanOutcome::PermissionDenied => {
            eprintln!("docscan was not allowed to use the camera or your files.");
            ExitCode::from(3)
        }
    }
}

fn fail(err: &ScanError) -> ExitCode {
    let human = humanize_error(err);
    tracing::error!(code = err.code(), error = %err, "Scan failed");
    eprintln!("{}", human.message);
    eprintln!("{}", human.suggestion);
    ExitCode::FAILURE
}
