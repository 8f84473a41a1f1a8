//! Spatial layout analysis for positioned text.
//!
//! This module turns a flat bag of tokens into document structure:
//! - [`Token`]: positioned text as delivered by the parser
//! - Line clustering (tokens → lines) with running-average tolerance
//! - Section segmentation (lines → table regions), column-aware
//! - Reading direction detection

pub mod direction;
pub mod line_clusterer;
pub mod section;
pub mod token;

// Re-export main types
pub use direction::TextDirection;
pub use line_clusterer::{cluster_tokens_into_lines, render_lines, Line};
pub use section::{segment_sections, AnchorSet, DocPosition, Section, SectionId};
pub use token::Token;
