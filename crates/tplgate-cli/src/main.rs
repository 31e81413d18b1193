//! # tplgate CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;

/// Element template registration gate.
///
/// Checks element template descriptors for schema-version compatibility,
/// id/version uniqueness, and schema compliance.
#[derive(Parser, Debug)]
#[command(name = "tplgate", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate element template files.
    Validate(tplgate_cli::validate::ValidateArgs),
}

/// Check if JSON log output is requested via the `TPLGATE_LOG_JSON` env var.
/// Defaults to `false` when the variable is absent or set to anything other than `"true"`.
fn json_logs_enabled() -> bool {
    std::env::var("TPLGATE_LOG_JSON")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    if json_logs_enabled() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => {
            let report = tplgate_cli::validate::validate_files(&args)?;
            println!("{}", tplgate_cli::validate::render(&report, args.format)?);
            if report.is_clean() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
