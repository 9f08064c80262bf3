//! graphsync CLI Binary
//!
//! Command-line interface for synchronizing agent graphs with a control plane.

use clap::Parser;
use graphsync::logging::init_logging;
use graphsync::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let mut config = match CliContext::load_config(&cli.workspace, cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };
    cli.apply_logging_overrides(&mut config);

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let context = match CliContext::new(config, cli.dry_run) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error initializing control plane client: {}", e);
            process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting async runtime: {}", e);
            process::exit(1);
        }
    };

    match runtime.block_on(context.execute(&cli.command)) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
