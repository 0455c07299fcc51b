//! Calzetti et al. (2000) starburst attenuation.

use crate::error::FitError;
use crate::models::extinction::ExtinctionCurve;

const R_V: f64 = 4.05;

/// Calzetti et al. (2000), R_V = 4.05.
///
/// The polynomial is extended as-is outside 0.12–2.2 µm, so the curve accepts
/// any wavelength.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calzetti00;

impl Calzetti00 {
    /// `k(λ)` for `λ` in µm.
    fn k(lambda: f64) -> f64 {
        let inv = 1.0 / lambda;
        if lambda < 0.63 {
            2.659 * (-2.156 + 1.509 * inv - 0.198 * inv * inv + 0.011 * inv.powi(3)) + R_V
        } else {
            2.659 * (-1.857 + 1.040 * inv) + R_V
        }
    }
}

impl ExtinctionCurve for Calzetti00 {
    fn r_v(&self) -> f64 {
        R_V
    }

    fn x_range(&self) -> Option<(f64, f64)> {
        None
    }

    fn relative_extinction(&self, x: &[f64]) -> Result<Vec<f64>, FitError> {
        Ok(x.iter().map(|&xi| Self::k(1.0 / xi) / R_V).collect())
    }
}
