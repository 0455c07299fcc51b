//! Command-line parsing for the `sesamme` SSP fitter.
//!
//! Argument parsing and command dispatch stay separate from the modeling code:
//! this module only describes the surface, `app` acts on it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Theta;
use crate::models::extinction::ExtinctionLaw;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sesamme",
    version,
    about = "SSP fitting of star cluster spectra: grid snapping, nebular continuum, dust, posterior evaluation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load grid, ionization table, observation and configuration; print the fit context.
    Check(InputArgs),
    /// Evaluate prior / likelihood / posterior for one or more parameter vectors.
    Evaluate(EvaluateArgs),
    /// Write the forward-model spectrum for one parameter vector to CSV.
    Model(ModelArgs),
    /// Write seeded initial walker positions to CSV.
    Init(InitArgs),
    /// Print 16/50/84 percentiles of a flattened posterior sample CSV.
    Summarize(SummarizeArgs),
    /// Build the run plan, confirm it, and hand it to the sampler.
    Run(RunArgs),
}

/// Inputs shared by every command that needs a fit context.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// SSP model grid (FITS). Defaults to $SESAMME_GRID.
    #[arg(long, value_name = "FITS")]
    pub grid: Option<PathBuf>,

    /// Ionizing photon table for the nebular continuum. Defaults to $SESAMME_ION_TABLE.
    #[arg(long = "ion-table", value_name = "TABLE")]
    pub ion_table: Option<PathBuf>,

    /// Observed spectrum CSV (wavelength, flux, error).
    #[arg(short = 'o', long, value_name = "CSV")]
    pub observation: PathBuf,

    /// Fit configuration JSON (prior bounds, mask windows, law, run plan).
    #[arg(short = 'c', long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Override the extinction law from the configuration.
    #[arg(long, value_enum)]
    pub law: Option<ExtinctionLaw>,

    /// Fit the stellar continuum only.
    #[arg(long)]
    pub no_nebular: bool,
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Parameter vector `log_age,log_z,ebv,log_amp`.
    #[arg(
        long,
        allow_hyphen_values = true,
        value_name = "LOG_AGE,LOG_Z,EBV,LOG_AMP",
        conflicts_with = "thetas",
        required_unless_present = "thetas"
    )]
    pub theta: Option<Theta>,

    /// CSV of parameter vectors (columns log_age, log_z, ebv, log_amp).
    #[arg(long, value_name = "CSV")]
    pub thetas: Option<PathBuf>,

    /// Export the evaluation table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ModelArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Parameter vector `log_age,log_z,ebv,log_amp`.
    #[arg(long, allow_hyphen_values = true, value_name = "LOG_AGE,LOG_Z,EBV,LOG_AMP")]
    pub theta: Theta,

    /// Output CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Fit configuration JSON (walkers, seed, initial_center).
    #[arg(short = 'c', long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Override the number of walkers.
    #[arg(long)]
    pub walkers: Option<usize>,

    /// Override the random seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    /// Flattened samples CSV (columns log_age, log_z, ebv, log_amp).
    #[arg(long, value_name = "CSV")]
    pub samples: PathBuf,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Directory the run plan and initial positions are written to.
    #[arg(long, value_name = "DIR", default_value = "sesamme-run")]
    pub out_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_theta_components_parse() {
        let cli = Cli::try_parse_from([
            "sesamme", "evaluate", "-o", "obs.csv", "--theta", "-7.0,-2.0,0.2,-2.0",
        ])
        .unwrap();
        let Command::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(args.theta, Some(Theta::new(-7.0, -2.0, 0.2, -2.0)));
    }

    #[test]
    fn law_names_match_the_registry() {
        let cli = Cli::try_parse_from(["sesamme", "check", "-o", "obs.csv", "--law", "Calzetti"]).unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.law, Some(ExtinctionLaw::Calzetti));
        assert!(Cli::try_parse_from(["sesamme", "check", "-o", "obs.csv", "--law", "MilkyWay"]).is_err());
    }

    #[test]
    fn evaluate_needs_a_theta_source() {
        assert!(Cli::try_parse_from(["sesamme", "evaluate", "-o", "obs.csv"]).is_err());
    }
}
