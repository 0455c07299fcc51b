//! Dust extinction / attenuation curves.
//!
//! Every curve reduces to a per-wavelength profile `A(λ)/A(V)`, so reddening a
//! spectrum is
//!
//! ```text
//! F_red(λ) = F(λ) · 10^(-0.4 · A_V · A(λ)/A(V)),   A_V = R_V · E(B-V)
//! ```
//!
//! The profile depends only on the wavelength array, which lets a fit context
//! compute it once and reuse it for every proposal.
//!
//! Curves are registered by name in `ExtinctionLaw`; `ExtinctionEngine` holds
//! the active selection.

use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

pub mod calzetti;
pub mod ccm;
pub mod fitzpatrick;
pub mod gordon;

pub use calzetti::Calzetti00;
pub use ccm::{Ccm89, ODonnell94};
pub use fitzpatrick::{FitzMassa07, Fitzpatrick99};
pub use gordon::{G03Lmc, G03Smc, Gordon23};

/// A single extinction curve with a fixed R_V.
pub trait ExtinctionCurve: Send + Sync {
    /// Total-to-selective extinction ratio this curve is evaluated at.
    fn r_v(&self) -> f64;

    /// Supported wavenumber range in µm⁻¹, if the curve is bounded.
    fn x_range(&self) -> Option<(f64, f64)>;

    /// `A(λ)/A(V)` at each wavenumber in `x` (µm⁻¹). Inputs are within `x_range`.
    fn relative_extinction(&self, x: &[f64]) -> Result<Vec<f64>, FitError>;

    /// `A(λ)/A(V)` for wavelengths in Å, after checking coverage.
    fn profile(&self, wavelength: &[f64]) -> Result<Vec<f64>, FitError> {
        let x: Vec<f64> = wavelength.iter().map(|&w| inverse_microns(w)).collect();
        if let Some((lo, hi)) = self.x_range() {
            if let Some(i) = x.iter().position(|&v| !(lo <= v && v <= hi)) {
                return Err(FitError::InvalidConfiguration(format!(
                    "wavelength {:.1} Å is outside the curve's range {:.1}–{:.1} Å",
                    wavelength[i],
                    1e4 / hi,
                    1e4 / lo
                )));
            }
        }
        self.relative_extinction(&x)
    }

    /// Redden `flux` by `ebv`.
    fn redden(&self, wavelength: &[f64], ebv: f64, flux: &[f64]) -> Result<Vec<f64>, FitError> {
        let profile = self.profile(wavelength)?;
        Ok(attenuate(flux, &profile, self.r_v() * ebv))
    }
}

/// Apply `10^(-0.4 · a_v · profile)` bin by bin.
pub fn attenuate(flux: &[f64], profile: &[f64], a_v: f64) -> Vec<f64> {
    flux.iter()
        .zip(profile.iter())
        .map(|(&f, &p)| f * 10f64.powf(-0.4 * a_v * p))
        .collect()
}

/// Å → µm⁻¹.
pub fn inverse_microns(wavelength_aa: f64) -> f64 {
    1e4 / wavelength_aa
}

/// Registered extinction curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum ExtinctionLaw {
    #[serde(rename = "CCM")]
    #[value(name = "CCM")]
    Ccm,
    #[serde(rename = "Fitzpatrick99")]
    #[value(name = "Fitzpatrick99")]
    Fitzpatrick99,
    #[serde(rename = "ODonnell")]
    #[value(name = "ODonnell")]
    ODonnell,
    #[serde(rename = "FitzMassa07")]
    #[value(name = "FitzMassa07")]
    FitzMassa07,
    #[serde(rename = "Gordon23")]
    #[value(name = "Gordon23")]
    Gordon23,
    #[serde(rename = "Calzetti")]
    #[value(name = "Calzetti")]
    Calzetti,
    #[serde(rename = "SMC")]
    #[value(name = "SMC")]
    Smc,
    #[serde(rename = "LMC")]
    #[value(name = "LMC")]
    Lmc,
}

impl ExtinctionLaw {
    pub const ALL: [ExtinctionLaw; 8] = [
        ExtinctionLaw::Ccm,
        ExtinctionLaw::Fitzpatrick99,
        ExtinctionLaw::ODonnell,
        ExtinctionLaw::FitzMassa07,
        ExtinctionLaw::Gordon23,
        ExtinctionLaw::Calzetti,
        ExtinctionLaw::Smc,
        ExtinctionLaw::Lmc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExtinctionLaw::Ccm => "CCM",
            ExtinctionLaw::Fitzpatrick99 => "Fitzpatrick99",
            ExtinctionLaw::ODonnell => "ODonnell",
            ExtinctionLaw::FitzMassa07 => "FitzMassa07",
            ExtinctionLaw::Gordon23 => "Gordon23",
            ExtinctionLaw::Calzetti => "Calzetti",
            ExtinctionLaw::Smc => "SMC",
            ExtinctionLaw::Lmc => "LMC",
        }
    }

    /// Line logged whenever a fit commits to this law.
    pub fn confirmation(self) -> String {
        format!("Model spectra will now be reddened assuming the {self} extinction curve")
    }

    /// The curve implementation registered under this name.
    pub fn curve(self) -> &'static dyn ExtinctionCurve {
        match self {
            ExtinctionLaw::Ccm => &Ccm89,
            ExtinctionLaw::Fitzpatrick99 => &Fitzpatrick99,
            ExtinctionLaw::ODonnell => &ODonnell94,
            ExtinctionLaw::FitzMassa07 => &FitzMassa07,
            ExtinctionLaw::Gordon23 => &Gordon23,
            ExtinctionLaw::Calzetti => &Calzetti00,
            ExtinctionLaw::Smc => &G03Smc,
            ExtinctionLaw::Lmc => &G03Lmc,
        }
    }
}

impl std::fmt::Display for ExtinctionLaw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExtinctionLaw {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExtinctionLaw::ALL
            .into_iter()
            .find(|law| law.name() == s)
            .ok_or_else(|| {
                let accepted: Vec<&str> = ExtinctionLaw::ALL.iter().map(|l| l.name()).collect();
                FitError::InvalidArgument(format!(
                    "'{s}' is not a valid choice of extinction law; accepted values are {}",
                    accepted.join(", ")
                ))
            })
    }
}

/// The active extinction curve of a fit, stored by name.
///
/// The name is only trusted after validation: `select` checks it up front and
/// `apply` re-checks it, so a selection read from a configuration file fails
/// the same way as a bad `select` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtinctionEngine {
    active: String,
}

impl Default for ExtinctionEngine {
    fn default() -> Self {
        Self {
            active: ExtinctionLaw::Ccm.name().to_string(),
        }
    }
}

impl ExtinctionEngine {
    pub fn new(law: ExtinctionLaw) -> Self {
        Self {
            active: law.name().to_string(),
        }
    }

    /// Make `name` the active curve.
    pub fn select(&mut self, name: &str) -> Result<ExtinctionLaw, FitError> {
        let law: ExtinctionLaw = name.parse()?;
        self.active = law.name().to_string();
        log::info!("{}", law.confirmation());
        Ok(law)
    }

    /// Name as stored (possibly unvalidated).
    pub fn active_name(&self) -> &str {
        &self.active
    }

    pub fn active_law(&self) -> Result<ExtinctionLaw, FitError> {
        self.active.parse()
    }

    /// Redden `flux` with the active curve.
    pub fn apply(&self, wavelength: &[f64], ebv: f64, flux: &[f64]) -> Result<Vec<f64>, FitError> {
        self.active_law()?.curve().redden(wavelength, ebv, flux)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wavelengths() -> Vec<f64> {
        (0..40).map(|i| 1250.0 + 500.0 * i as f64).collect()
    }

    #[test]
    fn zero_reddening_is_identity_for_every_curve() {
        let wl = wavelengths();
        let flux: Vec<f64> = wl.iter().map(|w| 1.0 + 1e-4 * w).collect();
        for law in ExtinctionLaw::ALL {
            let out = law.curve().redden(&wl, 0.0, &flux).unwrap();
            for (a, b) in out.iter().zip(flux.iter()) {
                assert!((a - b).abs() <= 1e-12 * b.abs(), "{law}: {a} != {b}");
            }
        }
    }

    #[test]
    fn every_curve_is_unity_near_v_band() {
        let v = [5500.0];
        for law in ExtinctionLaw::ALL {
            let p = law.curve().profile(&v).unwrap()[0];
            assert!((p - 1.0).abs() < 0.05, "{law}: A(V)/A(V) = {p}");
        }
    }

    #[test]
    fn every_curve_reddens() {
        let wl = [2000.0, 4400.0, 5500.0, 9000.0];
        for law in ExtinctionLaw::ALL {
            let p = law.curve().profile(&wl).unwrap();
            assert!(p.iter().all(|v| v.is_finite()), "{law}: {p:?}");
            assert!(p[1] > p[2] && p[2] > p[3], "{law}: {p:?}");
            assert!(p[0] > p[2], "{law}: {p:?}");
        }
    }

    #[test]
    fn names_round_trip_through_the_registry() {
        for law in ExtinctionLaw::ALL {
            assert_eq!(law.name().parse::<ExtinctionLaw>().unwrap(), law);
        }
        assert!(matches!(
            "ccm".parse::<ExtinctionLaw>(),
            Err(FitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn bad_select_and_bad_apply_fail_the_same_way() {
        let mut engine = ExtinctionEngine::default();
        let select_err = engine.select("NotARealCurve").unwrap_err();
        assert!(matches!(select_err, FitError::InvalidArgument(_)));
        assert_eq!(engine.active_name(), "CCM");

        let broken: ExtinctionEngine = serde_json::from_str("\"NotARealCurve\"").unwrap();
        let apply_err = broken.apply(&[5000.0], 0.1, &[1.0]).unwrap_err();
        assert!(matches!(apply_err, FitError::InvalidArgument(_)));
        assert_eq!(select_err.to_string(), apply_err.to_string());
    }

    #[test]
    fn confirmation_names_the_curve() {
        assert_eq!(
            ExtinctionLaw::Lmc.confirmation(),
            "Model spectra will now be reddened assuming the LMC extinction curve"
        );
    }

    #[test]
    fn selected_calzetti_matches_direct_computation() {
        let mut engine = ExtinctionEngine::default();
        assert_eq!(engine.select("Calzetti").unwrap(), ExtinctionLaw::Calzetti);

        let wl = wavelengths();
        let flux = vec![2.5; wl.len()];
        let via_engine = engine.apply(&wl, 0.3, &flux).unwrap();
        let direct = Calzetti00.redden(&wl, 0.3, &flux).unwrap();
        assert_eq!(via_engine, direct);

        let x: Vec<f64> = wl.iter().map(|&w| inverse_microns(w)).collect();
        let profile = Calzetti00.relative_extinction(&x).unwrap();
        assert_eq!(via_engine, attenuate(&flux, &profile, 4.05 * 0.3));
    }

    #[test]
    fn out_of_range_wavelengths_are_configuration_errors() {
        let err = Ccm89.profile(&[500.0]).unwrap_err();
        assert!(matches!(err, FitError::InvalidConfiguration(_)));
        assert!(Calzetti00.profile(&[500.0, 50_000.0]).is_ok());
    }
}
