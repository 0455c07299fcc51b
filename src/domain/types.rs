//! Shared domain types.
//!
//! These are the values every stage of the pipeline agrees on:
//!
//! - the 4-parameter vector proposed by the sampler (`Theta`)
//! - the hard prior support (`PriorBounds`)
//! - the observed spectrum (`Observation`)

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Number of model parameters. The order is fixed: log age, log Z, E(B-V), log amplitude.
pub const NDIM: usize = 4;

/// One axis of the parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Age,
    Metallicity,
    Ebv,
    Amplitude,
}

impl Axis {
    pub const ALL: [Axis; NDIM] = [Axis::Age, Axis::Metallicity, Axis::Ebv, Axis::Amplitude];

    /// Position of this axis inside a `Theta`.
    pub fn index(self) -> usize {
        match self {
            Axis::Age => 0,
            Axis::Metallicity => 1,
            Axis::Ebv => 2,
            Axis::Amplitude => 3,
        }
    }

    /// Short key used in configuration files.
    pub fn key(self) -> &'static str {
        match self {
            Axis::Age => "age",
            Axis::Metallicity => "met",
            Axis::Ebv => "ebv",
            Axis::Amplitude => "amp",
        }
    }

    /// Human-readable label for terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Axis::Age => "log(age/yr)",
            Axis::Metallicity => "log(Z/Zsun)",
            Axis::Ebv => "E(B-V)",
            Axis::Amplitude => "log(A)",
        }
    }

    /// Column name used in CSV files.
    pub fn column(self) -> &'static str {
        match self {
            Axis::Age => "log_age",
            Axis::Metallicity => "log_z",
            Axis::Ebv => "ebv",
            Axis::Amplitude => "log_amp",
        }
    }
}

/// A parameter vector proposed by the sampler.
///
/// The arity is part of the type, so a vector with the wrong number of
/// components cannot reach the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Theta(pub [f64; NDIM]);

impl Theta {
    pub fn new(log_age: f64, log_z: f64, ebv: f64, log_amp: f64) -> Self {
        Theta([log_age, log_z, ebv, log_amp])
    }

    pub fn log_age(&self) -> f64 {
        self.0[0]
    }

    pub fn log_z(&self) -> f64 {
        self.0[1]
    }

    pub fn ebv(&self) -> f64 {
        self.0[2]
    }

    pub fn log_amp(&self) -> f64 {
        self.0[3]
    }

    pub fn get(&self, axis: Axis) -> f64 {
        self.0[axis.index()]
    }
}

impl From<[f64; NDIM]> for Theta {
    fn from(value: [f64; NDIM]) -> Self {
        Theta(value)
    }
}

impl std::fmt::Display for Theta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.4}, {:.4}, {:.4}, {:.4}]",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Parse `"7.0,-2.0,0.2,-2.0"` (commas and/or whitespace).
impl FromStr for Theta {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() != NDIM {
            return Err(FitError::Parse(format!(
                "expected {NDIM} comma-separated values (log_age, log_z, ebv, log_amp), got {}",
                parts.len()
            )));
        }
        let mut out = [0.0; NDIM];
        for (slot, part) in out.iter_mut().zip(parts) {
            *slot = part
                .parse::<f64>()
                .map_err(|e| FitError::Parse(format!("invalid parameter value '{part}': {e}")))?;
        }
        Ok(Theta(out))
    }
}

/// A closed or open interval `[lo, hi]`; which one depends on the axis (see `fit::prior`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn contains_inclusive(&self, v: f64) -> bool {
        self.lo <= v && v <= self.hi
    }

    pub fn contains_exclusive(&self, v: f64) -> bool {
        self.lo < v && v < self.hi
    }

    /// `lo <= hi`, with NaN endpoints counted as out of order.
    pub fn is_ordered(&self) -> bool {
        self.lo <= self.hi
    }
}

impl From<[f64; 2]> for Interval {
    fn from(value: [f64; 2]) -> Self {
        Interval::new(value[0], value[1])
    }
}

impl From<Interval> for [f64; 2] {
    fn from(value: Interval) -> Self {
        [value.lo, value.hi]
    }
}

/// Flat-prior support, one interval per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorBounds {
    pub age: Interval,
    pub met: Interval,
    pub ebv: Interval,
    pub amp: Interval,
}

impl Default for PriorBounds {
    fn default() -> Self {
        Self {
            age: Interval::new(6.0, 7.5),
            met: Interval::new(-3.0, -1.5),
            ebv: Interval::new(0.01, 1.0),
            amp: Interval::new(-20.0, 1.0),
        }
    }
}

impl PriorBounds {
    pub fn get(&self, axis: Axis) -> Interval {
        match axis {
            Axis::Age => self.age,
            Axis::Metallicity => self.met,
            Axis::Ebv => self.ebv,
            Axis::Amplitude => self.amp,
        }
    }

    /// Fail if any axis has `lo > hi`.
    pub fn validate(&self) -> Result<(), FitError> {
        for axis in Axis::ALL {
            if !self.get(axis).is_ordered() {
                return Err(FitError::InvalidConfiguration(format!(
                    "prior boundaries are out of order for variable '{}'",
                    axis.key()
                )));
            }
        }
        Ok(())
    }

    /// Consistent-but-implausible bounds, reported as warnings at configuration time.
    pub fn advisories(&self) -> Vec<String> {
        let outside = |iv: Interval, lo: f64, hi: f64| {
            iv.lo < lo || iv.hi < lo || iv.lo > hi || iv.hi > hi
        };

        let mut out = Vec::new();
        if outside(self.age, 5.0, 11.0) {
            out.push(
                "age prior may extend to unphysically young and/or old values; double check before running"
                    .to_string(),
            );
        }
        if outside(self.met, -5.0, -1.3) {
            out.push("metallicity prior may extend to unphysical values; double check before running".to_string());
        }
        if outside(self.ebv, 0.0, 100.0) {
            out.push("E(B-V) prior may extend to unphysical values; double check before running".to_string());
        }
        out
    }
}

/// An observed spectrum: aligned wavelength (Å), flux, and 1-sigma error arrays.
#[derive(Debug, Clone)]
pub struct Observation {
    wavelength: Vec<f64>,
    flux: Vec<f64>,
    error: Vec<f64>,
}

impl Observation {
    pub fn new(wavelength: Vec<f64>, flux: Vec<f64>, error: Vec<f64>) -> Result<Self, FitError> {
        if wavelength.is_empty() {
            return Err(FitError::InvalidConfiguration("observation has no wavelength bins".into()));
        }
        if flux.len() != wavelength.len() || error.len() != wavelength.len() {
            return Err(FitError::InvalidConfiguration(format!(
                "observation arrays differ in length: wavelength={}, flux={}, error={}",
                wavelength.len(),
                flux.len(),
                error.len()
            )));
        }
        if let Some(i) = wavelength.iter().position(|w| !(w.is_finite() && *w > 0.0)) {
            return Err(FitError::InvalidConfiguration(format!(
                "observation wavelength at bin {i} must be finite and > 0"
            )));
        }
        if let Some(i) = flux.iter().position(|f| !f.is_finite()) {
            return Err(FitError::InvalidConfiguration(format!(
                "observation flux at bin {i} is not finite"
            )));
        }
        if let Some(i) = error.iter().position(|e| !(e.is_finite() && *e > 0.0)) {
            return Err(FitError::InvalidConfiguration(format!(
                "observation error at bin {i} must be finite and > 0"
            )));
        }
        Ok(Self {
            wavelength,
            flux,
            error,
        })
    }

    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    pub fn wavelength(&self) -> &[f64] {
        &self.wavelength
    }

    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    pub fn error(&self) -> &[f64] {
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theta_parses_commas_and_negative_values() {
        let theta: Theta = "7.0,-2.0, 0.2 ,-2.5".parse().unwrap();
        assert_eq!(theta, Theta::new(7.0, -2.0, 0.2, -2.5));
        assert!("7.0,-2.0,0.2".parse::<Theta>().is_err());
        assert!("7.0,x,0.2,1".parse::<Theta>().is_err());
    }

    #[test]
    fn out_of_order_bounds_name_the_axis() {
        let bounds = PriorBounds {
            ebv: Interval::new(1.0, 0.1),
            ..PriorBounds::default()
        };
        let err = bounds.validate().unwrap_err();
        assert!(matches!(err, FitError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("'ebv'"));
    }

    #[test]
    fn nan_bound_counts_as_out_of_order() {
        let bounds = PriorBounds {
            amp: Interval::new(f64::NAN, 1.0),
            ..PriorBounds::default()
        };
        assert!(bounds.validate().is_err());
    }

    #[test]
    fn default_bounds_are_plausible() {
        assert!(PriorBounds::default().advisories().is_empty());

        let wide = PriorBounds {
            age: Interval::new(4.0, 10.0),
            ebv: Interval::new(-0.5, 1.0),
            ..PriorBounds::default()
        };
        assert_eq!(wide.advisories().len(), 2);
    }

    #[test]
    fn observation_rejects_mismatched_and_non_positive_errors() {
        assert!(Observation::new(vec![1.0, 2.0], vec![1.0], vec![1.0, 1.0]).is_err());
        assert!(Observation::new(vec![1.0, 2.0], vec![1.0, 1.0], vec![1.0, 0.0]).is_err());
        assert!(Observation::new(vec![], vec![], vec![]).is_err());
        assert!(Observation::new(vec![1.0, 2.0], vec![1.0, 1.0], vec![0.1, 0.1]).is_ok());
    }

    #[test]
    fn bounds_deserialize_from_pairs() {
        let json = r#"{"age":[6.0,7.0],"met":[-3.0,-1.5],"ebv":[0.0,0.5],"amp":[-10.0,0.0]}"#;
        let bounds: PriorBounds = serde_json::from_str(json).unwrap();
        assert_eq!(bounds.age, Interval::new(6.0, 7.0));
        assert_eq!(bounds.amp, Interval::new(-10.0, 0.0));
    }
}
