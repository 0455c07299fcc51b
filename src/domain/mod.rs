//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the parameter vector and its axes (`Theta`, `Axis`)
//! - prior support (`Interval`, `PriorBounds`)
//! - the observed spectrum (`Observation`)
//! - the fit configuration surface (`FitSpec`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
