//! Gordon et al. extinction curves.
//!
//! - `Gordon23`: Milky Way average from the far-UV to the mid-IR, R_V = 3.1.
//!   Separate IR, optical and UV pieces are blended linearly across two
//!   overlap windows (0.9–1.1 µm and 0.30–0.33 µm).
//! - `G03Smc` / `G03Lmc`: Gordon et al. (2003) SMC Bar and LMC average.
//!   These carry their own R_V, which is also used to convert E(B-V) to A_V.

use crate::error::FitError;
use crate::math::{NaturalCubicSpline, horner};
use crate::models::extinction::ExtinctionCurve;
use crate::models::extinction::fitzpatrick::fm90;

/// Gordon et al. (2023), R_V = 3.1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gordon23;

/// Drude profile in wavenumber.
fn drude(x: f64, amp: f64, center: f64, width: f64) -> f64 {
    let w = width / center;
    amp * w * w / ((x / center - center / x).powi(2) + w * w)
}

/// Asymmetric Drude profile in wavelength (µm), used for the silicate features.
fn modified_drude(wave: f64, amp: f64, center: f64, fwhm: f64, asym: f64) -> f64 {
    let gamma = 2.0 * fwhm / (1.0 + (asym * (wave - center)).exp());
    let g = gamma / center;
    amp * g * g / ((wave / center - center / wave).powi(2) + g * g)
}

/// `3t² - 2t³` with `t` clamped to `[0, 1]`.
fn smoothstep(v: f64, lo: f64, hi: f64) -> f64 {
    let t = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

impl Gordon23 {
    const R_V: f64 = 3.1;

    fn infrared(x: f64) -> f64 {
        const SCALE: f64 = 0.38526;
        const ALPHA: f64 = 1.68467;
        const ALPHA2: f64 = 0.78791;
        const SWAVE: f64 = 4.30578;
        const SWIDTH: f64 = 4.78338;

        let wave = 1.0 / x;
        let pow1 = SCALE * wave.powf(-ALPHA);
        let ratio = SWAVE.powf(-ALPHA) / SWAVE.powf(-ALPHA2);
        let pow2 = SCALE * ratio * wave.powf(-ALPHA2);
        let w = smoothstep(wave, SWAVE - SWIDTH / 2.0, SWAVE + SWIDTH / 2.0);

        pow1 * (1.0 - w)
            + pow2 * w
            + modified_drude(wave, 0.06652, 9.8434, 2.21205, -0.24703)
            + modified_drude(wave, 0.0267, 19.58294, 17.0, -0.27)
    }

    fn optical(x: f64) -> f64 {
        horner(&[-0.35848, 0.7122, 0.08746, -0.05403, 0.00674], x)
            + drude(x, 0.03893, 2.288, 0.243)
            + drude(x, 0.02965, 2.054, 0.179)
            + drude(x, 0.01747, 1.587, 0.243)
    }

    fn ultraviolet(x: f64) -> f64 {
        fm90(x, 0.81297, 0.2775, 1.06295, 0.11303, 4.60, 0.99)
    }

    fn eval(x: f64) -> f64 {
        let wave = 1.0 / x;
        if wave > 1.1 {
            Self::infrared(x)
        } else if wave >= 0.9 {
            let w = (wave - 0.9) / 0.2;
            w * Self::infrared(x) + (1.0 - w) * Self::optical(x)
        } else if wave > 0.33 {
            Self::optical(x)
        } else if wave >= 0.3 {
            let w = (wave - 0.3) / 0.03;
            w * Self::optical(x) + (1.0 - w) * Self::ultraviolet(x)
        } else {
            Self::ultraviolet(x)
        }
    }
}

impl ExtinctionCurve for Gordon23 {
    fn r_v(&self) -> f64 {
        Self::R_V
    }

    fn x_range(&self) -> Option<(f64, f64)> {
        Some((1.0 / 32.0, 1.0 / 0.0912))
    }

    fn relative_extinction(&self, x: &[f64]) -> Result<Vec<f64>, FitError> {
        Ok(x.iter().map(|&xi| Self::eval(xi)).collect())
    }
}

/// FM90 UV coefficients plus optical/IR anchors for one G03 sample.
struct G03Params {
    r_v: f64,
    c1: f64,
    c2: f64,
    c3: f64,
    c4: f64,
    x0: f64,
    gamma: f64,
    anchors: [f64; 8],
}

/// Anchor wavelengths (µm) of the G03 optical/IR photometry.
const G03_ANCHOR_WAVE: [f64; 8] = [2.198, 1.65, 1.25, 0.81, 0.65, 0.55, 0.44, 0.37];
const G03_UV_EDGE: f64 = 1.0 / 0.27;
const G03_RANGE: (f64, f64) = (0.3, 10.0);

impl G03Params {
    fn uv(&self, x: f64) -> f64 {
        fm90(x, self.c1, self.c2, self.c3, self.c4, self.x0, self.gamma) / self.r_v + 1.0
    }

    fn relative_extinction(&self, x: &[f64]) -> Result<Vec<f64>, FitError> {
        let uv_knots = [1e4 / 2700.0, 1e4 / 2600.0];
        let mut xs = vec![0.0];
        xs.extend(G03_ANCHOR_WAVE.iter().map(|w| 1.0 / w));
        xs.extend(uv_knots);
        let mut ys = vec![0.0];
        ys.extend(self.anchors);
        ys.extend(uv_knots.iter().map(|&k| self.uv(k)));
        let spline = NaturalCubicSpline::new(&xs, &ys)?;

        Ok(x.iter()
            .map(|&xi| {
                if xi >= G03_UV_EDGE {
                    self.uv(xi)
                } else {
                    spline.eval(xi)
                }
            })
            .collect())
    }
}

const SMC_BAR: G03Params = G03Params {
    r_v: 2.74,
    c1: -4.959,
    c2: 2.264,
    c3: 0.389,
    c4: 0.461,
    x0: 4.6,
    gamma: 1.0,
    anchors: [0.11, 0.169, 0.25, 0.567, 0.801, 1.00, 1.374, 1.672],
};

const LMC_AVG: G03Params = G03Params {
    r_v: 3.41,
    c1: -0.890,
    c2: 0.998,
    c3: 2.719,
    c4: 0.400,
    x0: 4.579,
    gamma: 0.934,
    anchors: [0.10, 0.186, 0.257, 0.566, 0.799, 1.00, 1.293, 1.518],
};

/// Gordon et al. (2003) SMC Bar, R_V = 2.74.
#[derive(Debug, Clone, Copy, Default)]
pub struct G03Smc;

/// Gordon et al. (2003) LMC average, R_V = 3.41.
#[derive(Debug, Clone, Copy, Default)]
pub struct G03Lmc;

impl ExtinctionCurve for G03Smc {
    fn r_v(&self) -> f64 {
        SMC_BAR.r_v
    }

    fn x_range(&self) -> Option<(f64, f64)> {
        Some(G03_RANGE)
    }

    fn relative_extinction(&self, x: &[f64]) -> Result<Vec<f64>, FitError> {
        SMC_BAR.relative_extinction(x)
    }
}

impl ExtinctionCurve for G03Lmc {
    fn r_v(&self) -> f64 {
        LMC_AVG.r_v
    }

    fn x_range(&self) -> Option<(f64, f64)> {
        Some(G03_RANGE)
    }

    fn relative_extinction(&self, x: &[f64]) -> Result<Vec<f64>, FitError> {
        LMC_AVG.relative_extinction(x)
    }
}
