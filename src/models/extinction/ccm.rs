//! Cardelli, Clayton & Mathis (1989) and the O'Donnell (1994) optical update.
//!
//! Both share the IR and UV pieces and differ only in the optical polynomials
//! (1.1 ≤ x < 3.3 µm⁻¹). `A(λ)/A(V) = a(x) + b(x)/R_V`.

use crate::error::FitError;
use crate::math::horner;
use crate::models::extinction::ExtinctionCurve;

const R_V: f64 = 3.1;
const X_RANGE: (f64, f64) = (0.3, 10.0);

const CCM_OPT_A: [f64; 8] = [1.0, 0.17699, -0.50447, -0.02427, 0.72085, 0.01979, -0.77530, 0.32999];
const CCM_OPT_B: [f64; 8] = [0.0, 1.41338, 2.28305, 1.07233, -5.38434, -0.62251, 5.30260, -2.09002];

const ODONNELL_OPT_A: [f64; 9] = [1.0, 0.104, -0.609, 0.701, 1.137, -1.718, -0.827, 1.647, -0.505];
const ODONNELL_OPT_B: [f64; 9] = [0.0, 1.952, 2.908, -3.989, -7.985, 11.102, 5.491, -10.805, 3.347];

/// Cardelli, Clayton & Mathis (1989), R_V = 3.1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ccm89;

/// O'Donnell (1994), R_V = 3.1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ODonnell94;

impl ExtinctionCurve for Ccm89 {
    fn r_v(&self) -> f64 {
        R_V
    }

    fn x_range(&self) -> Option<(f64, f64)> {
        Some(X_RANGE)
    }

    fn relative_extinction(&self, x: &[f64]) -> Result<Vec<f64>, FitError> {
        Ok(x.iter()
            .map(|&xi| {
                let (a, b) = ab(xi, &CCM_OPT_A, &CCM_OPT_B);
                a + b / R_V
            })
            .collect())
    }
}

impl ExtinctionCurve for ODonnell94 {
    fn r_v(&self) -> f64 {
        R_V
    }

    fn x_range(&self) -> Option<(f64, f64)> {
        Some(X_RANGE)
    }

    fn relative_extinction(&self, x: &[f64]) -> Result<Vec<f64>, FitError> {
        Ok(x.iter()
            .map(|&xi| {
                let (a, b) = ab(xi, &ODONNELL_OPT_A, &ODONNELL_OPT_B);
                a + b / R_V
            })
            .collect())
    }
}

/// `(a(x), b(x))` with the given optical polynomials.
fn ab(x: f64, opt_a: &[f64], opt_b: &[f64]) -> (f64, f64) {
    if x < 1.1 {
        // IR power law
        let p = x.powf(1.61);
        (0.574 * p, -0.527 * p)
    } else if x < 3.3 {
        let y = x - 1.82;
        (horner(opt_a, y), horner(opt_b, y))
    } else if x < 8.0 {
        let (fa, fb) = if x >= 5.9 {
            let y = x - 5.9;
            (
                -0.04473 * y * y - 0.009779 * y * y * y,
                0.2130 * y * y + 0.1207 * y * y * y,
            )
        } else {
            (0.0, 0.0)
        };
        let a = 1.752 - 0.316 * x - 0.104 / ((x - 4.67).powi(2) + 0.341) + fa;
        let b = -3.090 + 1.825 * x + 1.206 / ((x - 4.62).powi(2) + 0.263) + fb;
        (a, b)
    } else {
        // far UV
        let y = x - 8.0;
        (
            horner(&[-1.073, -0.628, 0.137, -0.070], y),
            horner(&[13.670, 4.257, -0.420, 0.374], y),
        )
    }
}
