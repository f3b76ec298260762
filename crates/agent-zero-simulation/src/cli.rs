// Purpose: Provides the command-line interface for validating packs and running simulations.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::packs::write_csv;
use crate::runner::{resolve_inputs, run_simulation, RunRequest};
use crate::validate::validate_pack;
use crate::years::parse_years;

/// Agent Zero energy transition simulator
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[clap(long, env = "AGENT_ZERO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an assumptions or scenario pack
    Validate(ValidateArgs),

    /// Write the resolved assumptions table for a pack and optional scenario
    Build(BuildArgs),

    /// Run a simulation and write its result bundle
    Run(RunArgs),

    /// List existing run bundles
    Runs,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Pack directory
    #[clap(required = true)]
    pack_path: PathBuf,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Assumptions pack name
    #[clap(long)]
    assum: String,

    /// Scenario pack name
    #[clap(long)]
    scen: Option<String>,

    /// Output CSV path
    #[clap(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Assumptions pack name
    #[clap(long)]
    assum: String,

    /// Scenario pack name
    #[clap(long)]
    scen: Option<String>,

    /// Years to simulate, e.g. 2025:2050, 2025:5:2050 or 2025,2030
    #[clap(long)]
    years: String,

    /// Seed recorded with the run
    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Output directory; defaults to the configured runs directory
    #[clap(long)]
    out: Option<PathBuf>,
}

/// Parse arguments and dispatch to the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = SimulationConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Command::Validate(args) => validate(args),
        Command::Build(args) => build(&config, args),
        Command::Run(args) => run_command(&config, args),
        Command::Runs => list_runs(&config),
    }
}

fn validate(args: ValidateArgs) -> Result<()> {
    let errors = validate_pack(&args.pack_path);
    if errors.is_empty() {
        println!("Pack is valid: {}", args.pack_path.display());
        return Ok(());
    }
    for error in &errors {
        println!("ERROR: {error}");
    }
    bail!(
        "{} validation error(s) in {}",
        errors.len(),
        args.pack_path.display()
    )
}

fn build(config: &SimulationConfig, args: BuildArgs) -> Result<()> {
    let inputs = resolve_inputs(config, &args.assum, args.scen.as_deref())
        .with_context(|| format!("Failed to resolve assumptions pack {}", args.assum))?;
    write_csv(&args.out, inputs.assumptions.rows())
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    info!(rows = inputs.assumptions.len(), out = %args.out.display(), "built assumptions");
    println!("Wrote {} rows to {}", inputs.assumptions.len(), args.out.display());
    Ok(())
}

fn run_command(config: &SimulationConfig, args: RunArgs) -> Result<()> {
    let years = parse_years(&args.years).context("Failed to parse --years")?;
    let request = RunRequest {
        assumptions: args.assum,
        scenario: args.scen,
        years,
        seed: args.seed,
        out_dir: args.out,
    };
    let outcome = run_simulation(config, &request).context("Simulation run failed")?;

    println!("Run {} written to {}", outcome.run_id, outcome.run_dir.display());
    println!(
        "{}",
        serde_json::to_string_pretty(&outcome.summary).context("Failed to render summary")?
    );
    Ok(())
}

fn list_runs(config: &SimulationConfig) -> Result<()> {
    if !config.runs_dir.is_dir() {
        warn!(dir = %config.runs_dir.display(), "runs directory does not exist");
        println!("No runs found.");
        return Ok(());
    }
    let mut runs = Vec::new();
    for entry in fs::read_dir(&config.runs_dir)
        .with_context(|| format!("Failed to read {}", config.runs_dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            runs.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    runs.sort();
    if runs.is_empty() {
        println!("No runs found.");
    }
    for run in runs {
        println!("{run}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "agent-zero",
            "run",
            "--assum",
            "base",
            "--scen",
            "fast",
            "--years",
            "2025:2030",
            "--seed",
            "7",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.assum, "base");
                assert_eq!(args.scen.as_deref(), Some("fast"));
                assert_eq!(args.years, "2025:2030");
                assert_eq!(args.seed, 7);
                assert!(args.out.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_build_requires_out() {
        assert!(Cli::try_parse_from(["agent-zero", "build", "--assum", "base"]).is_err());
    }

    #[test]
    fn test_parse_validate_and_runs() {
        let cli = Cli::try_parse_from(["agent-zero", "validate", "data/assumptions_packs/base"])
            .unwrap();
        assert!(matches!(cli.command, Command::Validate(_)));

        let cli = Cli::try_parse_from(["agent-zero", "runs"]).unwrap();
        assert!(matches!(cli.command, Command::Runs));
    }
}
