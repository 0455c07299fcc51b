//! Posterior evaluation for a single observed spectrum.
//!
//! Responsibilities:
//!
//! - freeze the grid, observation, mask and extinction profile into a `FitContext`
//! - build the forward model for a parameter vector
//! - evaluate prior / likelihood / posterior (single vectors or parallel batches)
//! - seed the initial walker ensemble

pub mod context;
pub mod forward;
pub mod likelihood;
pub mod mask;
pub mod posterior;
pub mod prior;
pub mod walkers;

pub use context::*;
pub use forward::*;
pub use likelihood::*;
pub use mask::*;
pub use posterior::*;
pub use prior::*;
pub use walkers::*;
