//! `sesamme` library crate.
//!
//! The binary (`sesamme`) is a thin wrapper around this library so that:
//!
//! - the posterior can be driven by any sampler without spawning processes
//! - core logic is testable in isolation
//! - loading, evaluation and reporting stay in separate modules

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod grid;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
