//! Core invoice types, line validation, and totals.
//!
//! Everything in this module is pure: no I/O, no clocks, no stores.

mod error;
mod totals;
mod types;
mod validation;

pub use error::*;
pub use totals::*;
pub use types::*;
pub use validation::{validate_draft, validate_lines, validated_lines};
