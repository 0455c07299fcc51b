//! Small array helpers shared by the grid, mask, and nebular code.

/// Index of the element of `values` nearest to `target`.
///
/// Ties resolve to the first minimal element. Returns `None` for an empty slice.
pub fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        let d = (v - target).abs();
        match best {
            Some((_, best_d)) if !(d < best_d) => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Piecewise-linear interpolation of `(xs, ys)` at `x`.
///
/// `xs` must be strictly increasing with at least two knots. Outside the knot
/// range the first/last segment is extended linearly (no clamping).
pub fn interp_linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert!(xs.len() >= 2 && xs.len() == ys.len());
    let seg = segment_index(xs, x);
    let (x0, x1) = (xs[seg], xs[seg + 1]);
    let (y0, y1) = (ys[seg], ys[seg + 1]);
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Segment `i` such that `xs[i] <= x < xs[i + 1]`, clamped to the end segments.
pub fn segment_index(xs: &[f64], x: f64) -> usize {
    let upper = xs.partition_point(|&k| k <= x);
    upper.saturating_sub(1).min(xs.len() - 2)
}

/// Evaluate a polynomial with ascending coefficients (`c[0] + c[1] y + ...`).
pub fn horner(coeffs: &[f64], y: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * y + c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_index_prefers_first_on_ties() {
        let values = [6.0, 6.5, 7.0];
        assert_eq!(nearest_index(&values, 6.2), Some(0));
        assert_eq!(nearest_index(&values, 6.75), Some(1));
        assert_eq!(nearest_index(&[7.0, 6.5, 6.0], 6.75), Some(0));
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    #[test]
    fn interp_extrapolates_linearly() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 10.0, 30.0];
        assert!((interp_linear(&xs, &ys, 0.5) - 5.0).abs() < 1e-12);
        assert!((interp_linear(&xs, &ys, 1.5) - 20.0).abs() < 1e-12);
        assert!((interp_linear(&xs, &ys, -1.0) + 10.0).abs() < 1e-12);
        assert!((interp_linear(&xs, &ys, 3.0) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn horner_matches_direct_evaluation() {
        let c = [1.0, -2.0, 0.5, 3.0];
        let y: f64 = 1.7;
        let direct = 1.0 - 2.0 * y + 0.5 * y * y + 3.0 * y.powi(3);
        assert!((horner(&c, y) - direct).abs() < 1e-12);
    }
}
