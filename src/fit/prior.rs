//! Flat prior over a rectangular support.

use crate::domain::{PriorBounds, Theta};
use crate::error::FitError;

/// `0` inside the support, `-inf` outside.
///
/// Age and metallicity bounds are inclusive; E(B-V) and log amplitude bounds
/// are exclusive. The bounds are re-validated on every call, so a support
/// that became inconsistent after configuration still surfaces as an error
/// rather than as a silent rejection.
pub fn log_prior(bounds: &PriorBounds, theta: &Theta) -> Result<f64, FitError> {
    bounds.validate()?;
    let inside = bounds.age.contains_inclusive(theta.log_age())
        && bounds.met.contains_inclusive(theta.log_z())
        && bounds.ebv.contains_exclusive(theta.ebv())
        && bounds.amp.contains_exclusive(theta.log_amp());
    Ok(if inside { 0.0 } else { f64::NEG_INFINITY })
}
