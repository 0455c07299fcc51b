//! Percentile summary of flattened posterior samples.

use crate::domain::{Axis, Theta};
use crate::error::FitError;

/// Percentiles reported per axis: 1-sigma band around the median.
pub const PERCENTILES: [f64; 3] = [16.0, 50.0, 84.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSummary {
    pub axis: Axis,
    pub p16: f64,
    pub median: f64,
    pub p84: f64,
}

impl AxisSummary {
    /// Distance from the median down to the 16th percentile.
    pub fn minus(&self) -> f64 {
        self.median - self.p16
    }

    /// Distance from the median up to the 84th percentile.
    pub fn plus(&self) -> f64 {
        self.p84 - self.median
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorSummary {
    pub n_samples: usize,
    pub axes: Vec<AxisSummary>,
}

/// Summarize a flattened chain (all walkers, all kept steps).
pub fn summarize(samples: &[Theta]) -> Result<PosteriorSummary, FitError> {
    if samples.is_empty() {
        return Err(FitError::InvalidConfiguration("cannot summarize an empty sample set".into()));
    }

    let axes = Axis::ALL
        .iter()
        .map(|&axis| {
            let mut values: Vec<f64> = samples.iter().map(|t| t.get(axis)).collect();
            values.sort_by(f64::total_cmp);
            AxisSummary {
                axis,
                p16: percentile(&values, PERCENTILES[0]),
                median: percentile(&values, PERCENTILES[1]),
                p84: percentile(&values, PERCENTILES[2]),
            }
        })
        .collect();

    Ok(PosteriorSummary {
        n_samples: samples.len(),
        axes,
    })
}

/// `q`-th percentile of ascending `sorted`, interpolating linearly between
/// order statistics at rank `q/100 · (n - 1)`.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&v, 50.0), 3.0);
        assert!((percentile(&v, 16.0) - 1.64).abs() < 1e-12);
        assert!((percentile(&v, 84.0) - 4.36).abs() < 1e-12);
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 100.0), 5.0);
    }

    #[test]
    fn summary_reports_every_axis_in_order() {
        let samples: Vec<Theta> = (0..101)
            .map(|i| {
                let f = i as f64;
                Theta::new(6.0 + 0.01 * f, -3.0 + 0.01 * f, 0.5, -f)
            })
            .collect();
        let summary = summarize(&samples).unwrap();
        assert_eq!(summary.n_samples, 101);
        assert_eq!(summary.axes.len(), 4);

        let age = summary.axes[0];
        assert_eq!(age.axis, Axis::Age);
        assert!((age.median - 6.5).abs() < 1e-12);
        assert!((age.minus() - 0.34).abs() < 1e-9);
        assert!((age.plus() - 0.34).abs() < 1e-9);

        let ebv = summary.axes[2];
        assert_eq!((ebv.minus(), ebv.plus()), (0.0, 0.0));

        // Unsorted input is handled.
        assert!((summary.axes[3].median + 50.0).abs() < 1e-12);
    }

    #[test]
    fn empty_samples_are_rejected() {
        assert!(matches!(summarize(&[]), Err(FitError::InvalidConfiguration(_))));
    }
}
