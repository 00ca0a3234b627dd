// Purpose: Provides the command-line interface for the banker simulation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::config::SimulationConfig;
use crate::controller::SimulationController;
use crate::ledger::Ledger;
use crate::report::StateReport;
use crate::safety::safe_sequence;

/// Banker's Algorithm simulation CLI
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario with concurrent customers
    Run(RunArgs),

    /// Audit a scenario's configured state without running customers
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Scenario file path
    #[clap(required = true)]
    scenario_path: PathBuf,

    /// Override the scenario's RNG seed
    #[clap(long)]
    seed: Option<u64>,

    /// Override the scenario's cycle count
    #[clap(long)]
    cycles: Option<u32>,

    /// Disable pacing pauses between operations
    #[clap(long)]
    fast: bool,

    /// Print the final summary as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Scenario file path
    #[clap(required = true)]
    scenario_path: PathBuf,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_scenario(args).await,
        Command::Check(args) => check_scenario(args),
    }
}

async fn run_scenario(args: RunArgs) -> Result<()> {
    let mut config = load_scenario(&args.scenario_path)?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(cycles) = args.cycles {
        config.cycles = cycles;
    }
    if args.fast {
        config.time_scale = 0.0;
    }

    let controller = SimulationController::new(config)?;
    let summary = controller.run().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Run complete: {} granted, {} denied (seed {})",
            summary.granted, summary.denied, summary.seed
        );
        println!("{}", summary.final_report);
    }
    Ok(())
}

fn check_scenario(args: CheckArgs) -> Result<()> {
    let config = load_scenario(&args.scenario_path)?;
    let ledger = Ledger::new(&config)?;
    let snapshot = ledger.snapshot();

    let order = safe_sequence(&snapshot);
    match &order {
        Some(order) => println!("State is safe; completion order: {order:?}"),
        None => println!("State is unsafe: no completion order exists"),
    }
    println!("{}", StateReport::committed(snapshot, order.is_some()));
    Ok(())
}

fn load_scenario(path: &PathBuf) -> Result<SimulationConfig> {
    SimulationConfig::from_toml_path(path)
        .with_context(|| format!("failed to load scenario {}", path.display()))
}

//-----------------------------------------------------------------------------
// Tests
//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_arguments_parse() {
        let cli = Cli::try_parse_from([
            "banker-sim",
            "run",
            "scenarios/textbook.toml",
            "--seed",
            "7",
            "--fast",
        ])
        .unwrap();

        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.seed, Some(7));
                assert!(args.fast);
                assert!(!args.json);
            }
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn test_check_requires_scenario_path() {
        assert!(Cli::try_parse_from(["banker-sim", "check"]).is_err());
        assert!(Cli::try_parse_from(["banker-sim", "check", "s.toml"]).is_ok());
    }
}
