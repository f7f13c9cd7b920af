use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
use commands::audit::AuditArgs;

#[derive(Parser)]
#[command(name = "verisecure")]
#[command(about = "Heuristic security audit for Solidity smart contracts")]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a contract file or every `.sol` file under a directory
    Audit(AuditArgs),

    /// List the available detectors
    Detectors {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Audit(args) => commands::audit::execute(args),
        Commands::Detectors { json } => commands::detectors::execute(json),
    }
}
