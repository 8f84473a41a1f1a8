// Test-only helpers are not used by every test module
#![cfg_attr(test, allow(dead_code))]

//! # Spatial Tables
//!
//! Reconstruct typed tables from positioned text: a flat list of
//! `(text, bounding box, page)` tokens goes in, five fixed-schema tables of a
//! pension statement come out.
//!
//! ## Core Features
//!
//! - **Line Clustering**: running-average vertical clustering tolerant to
//!   baseline drift, right-to-left aware token ordering
//! - **Section Segmentation**: keyword anchors matched in natural and
//!   reversed character order, column-scoped sections for multi-column pages
//! - **Numeric Normalization**: thousands separators, parenthesized and
//!   trailing-minus negatives, placeholder dashes
//! - **Row Extraction**: pluggable [`extractors::RowExtractor`] per table,
//!   with wrapped-label continuation and employer carry-over
//! - **Self-Correction**: ledger summary column-shift repair with a
//!   confidence flag
//! - **Cross-Validation**: account-movement deposits vs. ledger total
//!
//! ## Tables
//!
//! | Id | Table                         | Row type                   |
//! |----|-------------------------------|----------------------------|
//! | A  | Expected payments             | [`extractors::PaymentRow`] |
//! | B  | Account movements             | [`extractors::PaymentRow`] |
//! | C  | Management fees               | [`extractors::FeeRow`]     |
//! | D  | Investment tracks and returns | [`extractors::TrackRow`]   |
//! | E  | Monthly deposit ledger        | [`extractors::LedgerRow`]  |
//!
//! ## Quick Start
//!
//! ```no_run
//! use spatial_tables::document::TokenDocument;
//! use spatial_tables::pipeline::TablePipeline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = TokenDocument::load("statement.tokens.json")?;
//! let tables = TablePipeline::new().process_document(document);
//!
//! for row in &tables.deposit_ledger {
//!     println!("{:?}", row);
//! }
//! println!("B/E reconciliation: {:?}", tables.validation.status);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Input model
pub mod document;
pub mod geometry;

// Layout analysis
pub mod layout;
pub mod text;

// Table extraction
pub mod extractors;
pub mod pipeline;

pub use document::TokenDocument;
pub use error::{Error, Result};
pub use extractors::{FeeRow, LedgerRow, PaymentRow, Row, TrackRow};
pub use layout::{Line, Section, SectionId, TextDirection, Token};
pub use pipeline::{CrossValidation, DocumentTables, PipelineConfig, TablePipeline};

// Internal utilities
pub(crate) mod utils {
    //! Internal utility functions for the library.

    use std::cmp::Ordering;

    /// Safely compare two floating point numbers, handling NaN cases.
    ///
    /// NaN values are treated as equal to each other and greater than all other values.
    /// This ensures that sorting operations never panic due to NaN comparisons.
    #[inline]
    pub fn safe_float_cmp(a: f32, b: f32) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater, // NaN > all numbers
            (false, true) => Ordering::Less,    // all numbers < NaN
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

}

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
