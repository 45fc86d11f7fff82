//! Analysis modules.
//!
//! Turns raw model output into structured plant records.

pub mod parser;

pub use parser::{parse_plant_response, validate_analysis};
