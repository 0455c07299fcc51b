//! Shared loading logic used by every command that evaluates posteriors.
//!
//! config -> overrides -> grid / ionization table / observation -> `FitContext`

use std::path::{Path, PathBuf};

use crate::cli::InputArgs;
use crate::domain::FitSpec;
use crate::error::AppError;
use crate::fit::FitContext;
use crate::io::{read_ionization_table, read_model_grid, read_observation};
use crate::models::extinction::ExtinctionEngine;

/// Environment variable naming the default model grid.
pub const GRID_ENV: &str = "SESAMME_GRID";

/// Environment variable naming the default ionization table.
pub const ION_TABLE_ENV: &str = "SESAMME_ION_TABLE";

/// Resolved configuration and the context built from it.
#[derive(Debug, Clone)]
pub struct LoadedFit {
    pub spec: FitSpec,
    pub context: FitContext,
}

/// Read the fit configuration, or take the defaults when none is given.
pub fn load_spec(path: Option<&Path>) -> Result<FitSpec, AppError> {
    match path {
        Some(p) => Ok(FitSpec::from_json_file(p)?),
        None => Ok(FitSpec::default()),
    }
}

/// Load every input named by `args` and build the fit context.
pub fn load_fit(args: &InputArgs) -> Result<LoadedFit, AppError> {
    let mut spec = load_spec(args.config.as_deref())?;
    apply_overrides(&mut spec, args);

    let grid_path = resolve_path(args.grid.as_deref(), GRID_ENV, "--grid")?;
    let grid = read_model_grid(&grid_path)?;
    log::info!(
        "Loaded model grid '{}' ({} metallicities)",
        grid_path.display(),
        grid.extensions().len()
    );

    let ionization = if spec.nebular {
        let path = resolve_path(args.ion_table.as_deref(), ION_TABLE_ENV, "--ion-table")?;
        Some(read_ionization_table(&path)?)
    } else {
        None
    };

    let observation = read_observation(&args.observation)?;
    log::info!(
        "Loaded observation '{}' ({} bins)",
        args.observation.display(),
        observation.len()
    );

    let context = FitContext::build(grid, ionization, observation, &spec)?;
    Ok(LoadedFit { spec, context })
}

/// Command-line flags take precedence over the configuration file.
/// The resulting law is announced once, when the context is built.
fn apply_overrides(spec: &mut FitSpec, args: &InputArgs) {
    if let Some(law) = args.law {
        spec.extinction_law = ExtinctionEngine::new(law);
    }
    if args.no_nebular {
        spec.nebular = false;
    }
}

/// Explicit path first, then the environment (including `.env`).
fn resolve_path(explicit: Option<&Path>, var: &str, flag: &str) -> Result<PathBuf, AppError> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| AppError::new(2, format!("Missing input: pass {flag} or set {var} (.env).")))
}
