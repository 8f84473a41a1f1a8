//! Text-level helpers shared by the layout and extraction stages.
//!
//! - [`numeric`]: the single entry point for turning numeric-looking strings
//!   into signed values
//! - [`bidi`]: direction-tolerant keyword matching for right-to-left documents

pub mod bidi;
pub mod numeric;

pub use bidi::{contains_either_direction, find_keyword, find_whole_keyword, normalize_for_match};
pub use numeric::{is_dash, is_percent_sign, looks_numeric, looks_percentage, normalize};
