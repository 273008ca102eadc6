//! multipost
//!
//! Reads one payload and POSTs it to every URL given on the command line,
//! concurrently, retrying each target on its own.
//!
//! ```text
//!   input (file | stdin)
//!        │
//!        ▼
//!   payload (optional form encoding)          deadline (time limit)
//!        │                                          │
//!        ▼                                          ▼
//!   ┌──────────┐   one task per URL   ┌──────────────────────────┐
//!   │  fanout  │ ───────────────────▶ │ delivery worker (retry)  │ ──▶ target
//!   │ collect  │ ◀─── outcome (mpsc) ─│ attempt → backoff → ...  │
//!   └──────────┘                      └──────────────────────────┘
//!        │
//!        ▼
//!   exit 0 (all delivered) | exit 1 (failures, deadline, fatal) | exit 64 (usage)
//! ```

use std::process::ExitCode;

use clap::Parser;

use multipost::cli::Cli;
use multipost::error::EXIT_USAGE;
use multipost::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let resolved = cli.resolve();
    let verbose = resolved
        .as_ref()
        .map_or(cli.verbose, |config| config.delivery.verbose);
    logging::init(verbose);

    let config = match resolved {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(multipost::MultipostError::from(e).exit_code());
        }
    };

    match multipost::run(&config, &cli.targets).await {
        Ok(report) => {
            tracing::info!(delivered = report.total(), "All deliveries succeeded");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "multipost failed");
            // Runtime shutdown would block on a stdin read abandoned at the
            // deadline, so leave without dropping it.
            std::process::exit(i32::from(e.exit_code()))
        }
    }
}
