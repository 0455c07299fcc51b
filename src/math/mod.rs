//! Mathematical utilities: nearest-neighbor search, linear interpolation, and
//! natural cubic splines.

pub mod interp;
pub mod spline;

pub use interp::*;
pub use spline::*;
