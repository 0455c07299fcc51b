//! Fit configuration surface.
//!
//! A `FitSpec` is everything the operator decides before sampling starts. It is
//! read from JSON, optionally overridden from the command line, and then frozen
//! inside a `FitContext`.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{PriorBounds, Theta};
use crate::error::FitError;
use crate::models::extinction::ExtinctionEngine;

/// Default ensemble size.
pub const DEFAULT_WALKERS: usize = 128;

/// Default chain length.
pub const DEFAULT_STEPS: usize = 10_000;

/// Default seed for walker initialization.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitSpec {
    /// Active extinction curve, by name.
    pub extinction_law: ExtinctionEngine,
    pub prior_bounds: PriorBounds,
    /// Add the nebular continuum to the stellar model before reddening.
    pub nebular: bool,
    /// Wavelength windows `[lo, hi]` excluded from the likelihood.
    pub mask_windows: Vec<[f64; 2]>,

    pub walkers: usize,
    pub steps: usize,
    /// Center of the initial walker ball.
    pub initial_center: Theta,
    pub seed: u64,
}

impl Default for FitSpec {
    fn default() -> Self {
        Self {
            extinction_law: ExtinctionEngine::default(),
            prior_bounds: PriorBounds::default(),
            nebular: true,
            mask_windows: Vec::new(),
            walkers: DEFAULT_WALKERS,
            steps: DEFAULT_STEPS,
            initial_center: Theta::new(7.0, -2.0, 0.2, -2.0),
            seed: DEFAULT_SEED,
        }
    }
}

impl FitSpec {
    /// Read a JSON fit configuration. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, FitError> {
        let file = File::open(path).map_err(|e| FitError::io(path, e))?;
        serde_json::from_reader(file)
            .map_err(|e| FitError::Parse(format!("invalid fit configuration '{}': {e}", path.display())))
    }
}
