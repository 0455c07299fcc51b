//! Wavelength-window masking.

use crate::math::nearest_index;

/// Per-bin inclusion flags; `true` bins contribute to the likelihood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask(Vec<bool>);

impl Mask {
    /// Include every bin.
    pub fn all(n: usize) -> Self {
        Mask(vec![true; n])
    }

    /// Exclude every bin inside any of `windows`.
    ///
    /// Each window edge is first moved to the nearest actual bin wavelength,
    /// then bins with `lo <= λ <= hi` are excluded. Windows combine as a union,
    /// so their order does not matter.
    pub fn build(windows: &[[f64; 2]], wavelength: &[f64]) -> Self {
        let mut keep = vec![true; wavelength.len()];
        for &[lo, hi] in windows {
            let (Some(i_lo), Some(i_hi)) = (nearest_index(wavelength, lo), nearest_index(wavelength, hi))
            else {
                continue;
            };
            let (lo, hi) = (wavelength[i_lo], wavelength[i_hi]);
            for (k, &w) in keep.iter_mut().zip(wavelength) {
                if lo <= w && w <= hi {
                    *k = false;
                }
            }
        }
        Mask(keep)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of bins that contribute to the likelihood.
    pub fn included(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }

    pub fn is_included(&self, bin: usize) -> bool {
        self.0.get(bin).copied().unwrap_or(false)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}
