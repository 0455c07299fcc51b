//! Precomputed SSP model grid and its lookup tables.
//!
//! - `model_grid`: metallicity extensions with wavelength + per-age flux columns
//! - `index`: grid snapping (continuous parameters → nearest grid point)
//! - `ionization`: ionizing photon rates used to scale the nebular continuum

pub mod index;
pub mod ionization;
pub mod model_grid;

pub use index::*;
pub use ionization::*;
pub use model_grid::*;
