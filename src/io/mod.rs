//! Input/output helpers.
//!
//! - FITS model grid reader (`fits`)
//! - ionizing-photon table reader (`ion_table`)
//! - observed spectrum reader (`observation`)
//! - parameter-vector CSV reader (`samples`)
//! - CSV exports (`export`)

pub mod export;
pub mod fits;
pub mod ion_table;
pub mod observation;
pub mod samples;

pub use export::*;
pub use fits::*;
pub use ion_table::*;
pub use observation::*;
pub use samples::*;
