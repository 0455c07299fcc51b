//! Initial ensemble positions.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{NDIM, Theta};
use crate::error::FitError;

/// Standard deviation of the initial ball around the center, per axis.
pub const INITIAL_SPREAD: f64 = 0.1;

/// `center + 0.1 · N(0, 1)` per axis for each walker, reproducible from `seed`.
///
/// Affine-invariant ensembles need at least `2 · NDIM` walkers.
pub fn initial_positions(center: &Theta, walkers: usize, seed: u64) -> Result<Vec<Theta>, FitError> {
    if walkers < 2 * NDIM {
        return Err(FitError::InvalidConfiguration(format!(
            "walker count must be at least {}, got {walkers}",
            2 * NDIM
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, INITIAL_SPREAD)
        .map_err(|e| FitError::InvalidConfiguration(format!("walker spread distribution error: {e}")))?;

    Ok((0..walkers)
        .map(|_| {
            let mut p = center.0;
            for v in p.iter_mut() {
                *v += normal.sample(&mut rng);
            }
            Theta(p)
        })
        .collect())
}
