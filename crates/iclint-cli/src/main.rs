//! iclint entry point.
//!
//! ```bash
//! iclint /etc/icinga2/conf.d
//! ```
//!
//! Exit code 0 on a clean tree, 1 when issues were found or the path is
//! unusable, the same contract the daemon-side tooling expects.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use iclint_cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    // --debug turns everything up; otherwise RUST_LOG decides
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match iclint_cli::run(&args, &mut std::io::stdout()) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
