//! Natural cubic spline.
//!
//! Several extinction curves are defined in the optical/IR by a cubic spline
//! through a handful of anchor points. We solve for the knot second derivatives
//! once per curve evaluation:
//!
//! ```text
//! h[i-1] M[i-1] + 2 (h[i-1] + h[i]) M[i] + h[i] M[i+1] = 6 (d[i] - d[i-1])
//! M[0] = M[n-1] = 0
//! ```
//!
//! where `h[i] = x[i+1] - x[i]` and `d[i]` is the secant slope. The system is
//! tiny (≤ 12 knots), so a dense LU solve is fine.

use nalgebra::{DMatrix, DVector};

use crate::error::FitError;
use crate::math::segment_index;

#[derive(Debug, Clone)]
pub struct NaturalCubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    second: Vec<f64>,
}

impl NaturalCubicSpline {
    /// Build a spline through strictly increasing knots `xs`.
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, FitError> {
        let n = xs.len();
        if n < 3 || ys.len() != n {
            return Err(FitError::InvalidConfiguration(format!(
                "spline needs >= 3 matching knots, got x={}, y={}",
                n,
                ys.len()
            )));
        }
        if xs.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(FitError::InvalidConfiguration(
                "spline knots must be strictly increasing".into(),
            ));
        }

        let mut a = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);
        a[(0, 0)] = 1.0;
        a[(n - 1, n - 1)] = 1.0;
        for i in 1..n - 1 {
            let h0 = xs[i] - xs[i - 1];
            let h1 = xs[i + 1] - xs[i];
            a[(i, i - 1)] = h0;
            a[(i, i)] = 2.0 * (h0 + h1);
            a[(i, i + 1)] = h1;
            rhs[i] = 6.0 * ((ys[i + 1] - ys[i]) / h1 - (ys[i] - ys[i - 1]) / h0);
        }

        let second = a
            .lu()
            .solve(&rhs)
            .filter(|m| m.iter().all(|v| v.is_finite()))
            .ok_or_else(|| FitError::InvalidConfiguration("spline system is singular".into()))?;

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            second: second.iter().copied().collect(),
        })
    }

    /// Evaluate at `x`. Outside the knots the end cubic pieces are extended.
    pub fn eval(&self, x: f64) -> f64 {
        let i = segment_index(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let t = x - self.xs[i];
        let (m0, m1) = (self.second[i], self.second[i + 1]);
        let slope = (self.ys[i + 1] - self.ys[i]) / h - h * (2.0 * m0 + m1) / 6.0;
        self.ys[i] + slope * t + 0.5 * m0 * t * t + (m1 - m0) / (6.0 * h) * t * t * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spline_passes_through_knots() {
        let xs = [0.0, 0.5, 1.3, 2.0, 3.1];
        let ys = [0.0, 0.8, 1.1, 2.5, 2.0];
        let s = NaturalCubicSpline::new(&xs, &ys).unwrap();
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            assert!((s.eval(x) - y).abs() < 1e-10, "spline({x}) != {y}");
        }
    }

    #[test]
    fn spline_reproduces_straight_lines() {
        let xs = [0.0, 1.0, 2.5, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x - 1.0).collect();
        let s = NaturalCubicSpline::new(&xs, &ys).unwrap();
        for &x in &[0.3, 1.7, 3.9, 5.0] {
            assert!((s.eval(x) - (2.0 * x - 1.0)).abs() < 1e-10);
        }
    }

    #[test]
    fn spline_rejects_unsorted_knots() {
        assert!(NaturalCubicSpline::new(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]).is_err());
    }
}
