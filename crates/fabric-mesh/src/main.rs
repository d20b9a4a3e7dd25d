//! CLI entry point for the fabric-mesh orchestrator.
//!
//! Reads a JSON array of operations from stdin and writes one JSON outcome
//! per line to stdout. Logs go to stderr.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use fabric_core::FabricConfig;
use fabric_mesh::ops::{self, Operation};
use fabric_mesh::FabricRegistry;

#[derive(Parser)]
#[command(name = "fabric-mesh")]
#[command(about = "Policy-gated knowledge mesh linking entities across subsystems")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: fabric).
    #[arg(short, long, default_value = "fabric", global = true)]
    config: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a batch of register/link/query/stats operations (reads JSON from stdin).
    Apply,
    /// Print the configured policy table.
    Policies,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if cli.json_logs {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }

    let config = FabricConfig::load(&cli.config)?;

    match cli.command {
        Command::Apply => {
            let input = std::io::read_to_string(std::io::stdin())?;
            let operations: Vec<Operation> = serde_json::from_str(&input)?;
            tracing::info!(count = operations.len(), "Applying operations");

            let mut registry = FabricRegistry::new(config);
            for op in operations {
                let outcome = ops::apply(&mut registry, op);
                println!("{}", serde_json::to_string(&outcome)?);
            }
        }
        Command::Policies => {
            println!("{}", serde_json::to_string_pretty(&config.policies)?);
        }
    }

    Ok(())
}
