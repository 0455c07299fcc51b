//! Fitzpatrick (1999) and Fitzpatrick & Massa (2007) Milky Way curves.
//!
//! Both use the FM90 parameterisation in the UV and a cubic spline through
//! optical/IR anchor points, with the last two spline knots taken from the
//! UV function so the two pieces join smoothly near 2700 Å.

use crate::error::FitError;
use crate::math::NaturalCubicSpline;
use crate::models::extinction::ExtinctionCurve;

const R_V: f64 = 3.1;
const X_RANGE: (f64, f64) = (0.0, 1e4 / 910.0);
const X_UV_SPLINE: [f64; 2] = [1e4 / 2700.0, 1e4 / 2600.0];

/// Lorentzian-like 2175 Å bump.
fn bump(x: f64, x0: f64, gamma: f64) -> f64 {
    let x2 = x * x;
    x2 / ((x2 - x0 * x0).powi(2) + x2 * gamma * gamma)
}

/// Far-UV curvature term of FM90, zero below 5.9 µm⁻¹.
pub(crate) fn fm90_curvature(x: f64) -> f64 {
    if x >= 5.9 {
        let y = x - 5.9;
        0.5392 * y * y + 0.05644 * y * y * y
    } else {
        0.0
    }
}

/// `E(λ-V)/E(B-V)` from the FM90 function.
pub(crate) fn fm90(x: f64, c1: f64, c2: f64, c3: f64, c4: f64, x0: f64, gamma: f64) -> f64 {
    c1 + c2 * x + c3 * bump(x, x0, gamma) + c4 * fm90_curvature(x)
}

/// Fitzpatrick (1999), R_V = 3.1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fitzpatrick99;

impl Fitzpatrick99 {
    fn uv(x: f64) -> f64 {
        let c2 = -0.824 + 4.717 / R_V;
        let c1 = 2.030 - 3.007 * c2;
        fm90(x, c1, c2, 3.23, 0.41, 4.596, 0.99)
    }

    fn spline() -> Result<NaturalCubicSpline, FitError> {
        let r = R_V;
        let xs = [
            0.0,
            1e4 / 26500.0,
            1e4 / 12200.0,
            1e4 / 6000.0,
            1e4 / 5470.0,
            1e4 / 4670.0,
            1e4 / 4110.0,
            X_UV_SPLINE[0],
            X_UV_SPLINE[1],
        ];
        let ys = [
            0.0,
            0.26469 * r / 3.1,
            0.82925 * r / 3.1,
            -0.422809 + 1.00270 * r + 2.13572e-4 * r * r,
            -5.13540e-2 + 1.00216 * r - 7.35778e-5 * r * r,
            0.700127 + 1.00184 * r - 3.32598e-5 * r * r,
            1.19456 + 1.01707 * r - 5.46959e-3 * r * r + 7.97809e-4 * r.powi(3)
                - 4.45636e-5 * r.powi(4),
            Self::uv(X_UV_SPLINE[0]) + r,
            Self::uv(X_UV_SPLINE[1]) + r,
        ];
        NaturalCubicSpline::new(&xs, &ys)
    }
}

impl ExtinctionCurve for Fitzpatrick99 {
    fn r_v(&self) -> f64 {
        R_V
    }

    fn x_range(&self) -> Option<(f64, f64)> {
        Some(X_RANGE)
    }

    fn relative_extinction(&self, x: &[f64]) -> Result<Vec<f64>, FitError> {
        let spline = Self::spline()?;
        Ok(x.iter()
            .map(|&xi| {
                if xi >= X_UV_SPLINE[0] {
                    (Self::uv(xi) + R_V) / R_V
                } else {
                    spline.eval(xi) / R_V
                }
            })
            .collect())
    }
}

/// Fitzpatrick & Massa (2007) average Milky Way curve, R_V = 3.1.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitzMassa07;

impl FitzMassa07 {
    /// `E(λ-V)/E(B-V)` in the UV.
    fn uv(x: f64) -> f64 {
        const C5: f64 = 6.097;
        let far = if x > C5 { 0.319 * (x - C5).powi(2) } else { 0.0 };
        -0.175 + 0.807 * x + 2.991 * bump(x, 4.592, 0.922) + far
    }

    fn spline() -> Result<NaturalCubicSpline, FitError> {
        let r = R_V;
        let ir = |x: f64| (-0.83 + 0.63 * r) * x.powf(1.84) - r;
        let xs = [
            0.0,
            0.25,
            0.5,
            0.75,
            1e4 / 5530.0,
            1e4 / 4000.0,
            1e4 / 3300.0,
            X_UV_SPLINE[0],
            X_UV_SPLINE[1],
        ];
        let ys = [
            -r,
            ir(0.25),
            ir(0.5),
            ir(0.75),
            0.0,
            1.322,
            2.055,
            Self::uv(X_UV_SPLINE[0]),
            Self::uv(X_UV_SPLINE[1]),
        ];
        NaturalCubicSpline::new(&xs, &ys)
    }
}

impl ExtinctionCurve for FitzMassa07 {
    fn r_v(&self) -> f64 {
        R_V
    }

    fn x_range(&self) -> Option<(f64, f64)> {
        Some(X_RANGE)
    }

    fn relative_extinction(&self, x: &[f64]) -> Result<Vec<f64>, FitError> {
        let spline = Self::spline()?;
        Ok(x.iter()
            .map(|&xi| {
                let k = if xi >= X_UV_SPLINE[0] {
                    Self::uv(xi)
                } else {
                    spline.eval(xi)
                };
                1.0 + k / R_V
            })
            .collect())
    }
}
