//! Gaussian log-likelihood with an aggregate normalization term.
//!
//! ```text
//! ln L = -0.5 · ( Σ r_i²  +  ln Σ (√(2π) σ_i)² ),   r_i = (y_i - m_i) / σ_i
//! ```
//!
//! Both sums run over unmasked bins only. The normalization is the log of a
//! sum, not the usual `Σ ln(2π σ_i²)`. It is constant in θ for fixed errors,
//! so posterior shape is unaffected, but absolute values differ from a
//! per-bin Gaussian and must not be compared against one.

use std::f64::consts::PI;

use crate::domain::Observation;
use crate::fit::Mask;

pub fn log_likelihood(observation: &Observation, model: &[f64], mask: &Mask) -> f64 {
    let mut chi2 = 0.0;
    let mut norm = 0.0;
    for (i, ((&y, &sigma), &m)) in observation
        .flux()
        .iter()
        .zip(observation.error())
        .zip(model)
        .enumerate()
    {
        if !mask.is_included(i) {
            continue;
        }
        let r = (y - m) / sigma;
        chi2 += r * r;
        norm += 2.0 * PI * sigma * sigma;
    }
    -0.5 * (chi2 + norm.ln())
}
