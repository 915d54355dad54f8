//! Utility modules shared across the crate.
//!
//! - Constants (unit conversions, fixed check defaults, vendor encodings)
//! - Percentage arithmetic and JSON number helpers

pub mod constants;
pub mod math;

pub use constants::*;
pub use math::*;
