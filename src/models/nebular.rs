//! Nebular continuum emission.
//!
//! A coarse case-B recombination continuum (H I free-free, bound-free and
//! two-photon, plus He I at He/H = 0.1; T = 1e4 K, no photon escape) is
//! tabulated at 24 anchor wavelengths for an ionizing photon rate of 10^52 s⁻¹.
//! The curve is interpolated onto the target wavelengths and rescaled by the
//! ionizing output of the snapped SSP.

use crate::error::FitError;
use crate::grid::{IonizationTable, Q_REFERENCE};
use crate::math::interp_linear;

/// Anchor wavelengths (Å), Lyman limit to ~4.5 µm.
const ANCHOR_WAVELENGTH: [f64; 24] = [
    912.0, 913.0, 1300.0, 1500.0, 1800.0, 2200.0, 2855.0, 3331.0, 3421.0, 3422.0, 3642.0, 3648.0,
    5700.0, 7000.0, 8207.0, 8209.0, 14583.0, 14585.0, 22787.0, 22789.0, 32813.0, 32815.0, 44680.0,
    44682.0,
];

/// Emission coefficients γ in units of 1e-40 erg cm³ s⁻¹ Hz⁻¹.
const ANCHOR_GAMMA: [f64; 24] = [
    0.0, 2.11e-4, 5.647, 9.35, 9.847, 10.582, 16.101, 24.681, 26.736, 24.883, 29.979, 6.519, 8.773,
    11.545, 13.585, 6.333, 10.444, 7.023, 9.361, 7.59, 9.35, 8.32, 9.53, 8.87,
];

const GAMMA_UNIT: f64 = 1e-40;

/// Speed of light in Å/s.
const SPEED_OF_LIGHT: f64 = 2.998e18;

/// Case-B recombination coefficient (cm³ s⁻¹).
const ALPHA_B: f64 = 2.6e-13;

/// Solar luminosity (erg/s).
pub const L_SUN: f64 = 3.83e33;

#[derive(Debug, Clone)]
pub struct NebularContinuumModel {
    /// L_λ at the anchors for Q = 10^52, erg s⁻¹ Å⁻¹.
    anchors: [f64; 24],
}

impl Default for NebularContinuumModel {
    fn default() -> Self {
        let q = 10f64.powf(Q_REFERENCE);
        let mut anchors = [0.0; 24];
        for (out, (&x, &g)) in anchors
            .iter_mut()
            .zip(ANCHOR_WAVELENGTH.iter().zip(ANCHOR_GAMMA.iter()))
        {
            *out = SPEED_OF_LIGHT * g * GAMMA_UNIT * q / (ALPHA_B * x * x);
        }
        Self { anchors }
    }
}

impl NebularContinuumModel {
    /// Reference continuum on `wavelengths`, in L_sun Å⁻¹.
    ///
    /// Outside 912–44682 Å the end segments are extended linearly; the result is
    /// not clamped and may go negative far blueward of the Lyman limit.
    pub fn continuum(&self, wavelengths: &[f64]) -> Vec<f64> {
        wavelengths
            .iter()
            .map(|&w| interp_linear(&ANCHOR_WAVELENGTH, &self.anchors, w) / L_SUN)
            .collect()
    }

    /// Rescale a reference continuum to the snapped SSP and amplitude.
    pub fn scale(
        &self,
        continuum: &[f64],
        metallicity_label: &str,
        age_label: &str,
        table: &IonizationTable,
        log_amplitude: f64,
    ) -> Result<Vec<f64>, FitError> {
        let factor = scale_factor(table.log_q(metallicity_label, age_label)?, log_amplitude);
        Ok(continuum.iter().map(|c| c * factor).collect())
    }
}

/// `10^(log_q - 52 + log_amplitude)`.
pub fn scale_factor(log_q: f64, log_amplitude: f64) -> f64 {
    10f64.powf(log_q - Q_REFERENCE + log_amplitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuum_hits_the_anchor_values() {
        let model = NebularContinuumModel::default();
        let out = model.continuum(&[1300.0, 5700.0]);
        let expected = SPEED_OF_LIGHT * 5.647e-40 * 1e52 / (ALPHA_B * 1300.0 * 1300.0) / L_SUN;
        assert!((out[0] / expected - 1.0).abs() < 1e-12);
        assert!(out[1] > 0.0);
    }

    #[test]
    fn continuum_extrapolates_past_the_last_anchor() {
        let model = NebularContinuumModel::default();
        let out = model.continuum(&[44680.0, 44682.0, 44684.0]);
        let slope = out[1] - out[0];
        assert!((out[2] - (out[1] + slope)).abs() < 1e-9 * out[1].abs().max(1.0));
    }

    #[test]
    fn scale_uses_photon_rate_and_amplitude() {
        let model = NebularContinuumModel::default();
        let table = IonizationTable::new(
            vec!["6.0".into()],
            vec![("Z014".into(), vec![53.0])],
        )
        .unwrap();
        let base = model.continuum(&[5000.0]);
        let scaled = model.scale(&base, "Z014", "6.0", &table, -1.0).unwrap();
        // 10^(53 - 52 - 1) = 1
        assert!((scaled[0] - base[0]).abs() < 1e-12 * base[0]);

        let err = model.scale(&base, "Z020", "6.0", &table, 0.0).unwrap_err();
        assert!(matches!(err, FitError::Lookup(_)));
    }
}
