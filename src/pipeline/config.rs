//! Unified configuration for the table reconstruction pipeline.
//!
//! Every stage reads its thresholds and keyword lists from here:
//! - [`LineConfig`]: vertical tolerance for line clustering
//! - [`SectionConfig`]: section anchors and column scoping
//! - [`ExtractionConfig`]: row-level markers and sanity limits
//! - [`ValidationConfig`]: cross-table reconciliation
//!
//! All types deserialize with `#[serde(default)]`, so a JSON override file
//! only needs to name the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::section::AnchorSet;
use crate::layout::TextDirection;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Line clustering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// Maximum distance between a token's vertical center and the running
    /// average center of the line it joins.
    pub y_tolerance: f32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self { y_tolerance: 3.0 }
    }
}

/// Section segmentation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    /// Keyword lists locating each section's header line.
    pub anchors: AnchorSet,

    /// A header narrower than this fraction of the page's text extent bounds
    /// its section to one column.
    pub column_scope_ratio: f32,

    /// Horizontal whitespace wider than this splits a line into separate
    /// clusters (column gutter).
    pub column_gap: f32,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            anchors: AnchorSet::default(),
            column_scope_ratio: 0.6,
            column_gap: 50.0,
        }
    }
}

/// Row extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Regulatory ceiling (percent) for management fees charged on deposits.
    pub deposit_fee_ceiling: f64,

    /// Descriptions identifying a fee charged on deposits.
    pub deposit_fee_keywords: Vec<String>,

    /// Markers identifying the ledger's summary ("total") line.
    pub total_markers: Vec<String>,

    /// Ledger column-header vocabulary; text-only lines containing one of
    /// these are never taken as an employer name.
    pub ledger_header_words: Vec<String>,

    /// Two percentages closer than this are considered the same value when
    /// checking track returns against fee rates.
    pub conflation_epsilon: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            deposit_fee_ceiling: 6.0,
            deposit_fee_keywords: strings(&[
                "מהפקדה",
                "מהפקדות",
                "מההפקדות",
                "from deposit",
                "on deposit",
            ]),
            total_markers: strings(&["סה\"כ", "סהכ", "total"]),
            ledger_header_words: strings(&[
                "מועד",
                "שכר",
                "תגמולי",
                "פיצויים",
                "חודש",
                "salary",
                "severance",
                "month",
                "employee",
            ]),
            conflation_epsilon: 1e-9,
        }
    }
}

/// Cross-table reconciliation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Descriptions in the account-movements table that carry total deposits.
    pub deposit_keywords: Vec<String>,

    /// Absolute floor of the comparison tolerance.
    pub min_tolerance: f64,

    /// Tolerance relative to the movements-table value.
    pub relative_tolerance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            deposit_keywords: strings(&["הפקדות", "הפקדה", "deposits", "deposit", "קרן", "כולל"]),
            min_tolerance: 1.0,
            relative_tolerance: 0.01,
        }
    }
}

/// Configuration for the whole pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Reading direction; `None` detects it from the document text.
    pub direction: Option<TextDirection>,

    /// Line clustering parameters
    pub lines: LineConfig,

    /// Section segmentation parameters
    pub sections: SectionConfig,

    /// Row extraction parameters
    pub extraction: ExtractionConfig,

    /// Cross-table reconciliation parameters
    pub validation: ValidationConfig,
}

impl PipelineConfig {
    /// Create configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a reading direction instead of detecting it.
    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Set the line clustering tolerance.
    pub fn with_y_tolerance(mut self, tolerance: f32) -> Self {
        self.lines.y_tolerance = tolerance;
        self
    }

    /// Replace the section anchors.
    pub fn with_anchors(mut self, anchors: AnchorSet) -> Self {
        self.sections.anchors = anchors;
        self
    }

    /// Set the deposit-fee ceiling used to flag suspicious fee rows.
    pub fn with_deposit_fee_ceiling(mut self, ceiling: f64) -> Self {
        self.extraction.deposit_fee_ceiling = ceiling;
        self
    }

    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a (possibly partial) JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check numeric parameters for values that would break the pipeline.
    pub fn validate(&self) -> Result<()> {
        if !(self.lines.y_tolerance.is_finite() && self.lines.y_tolerance >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "lines.y_tolerance must be a non-negative number, got {}",
                self.lines.y_tolerance
            )));
        }
        if !(self.sections.column_scope_ratio > 0.0 && self.sections.column_scope_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "sections.column_scope_ratio must be in (0, 1], got {}",
                self.sections.column_scope_ratio
            )));
        }
        if !(self.sections.column_gap.is_finite() && self.sections.column_gap > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "sections.column_gap must be positive, got {}",
                self.sections.column_gap
            )));
        }
        if self.validation.min_tolerance < 0.0 || self.validation.relative_tolerance < 0.0 {
            return Err(Error::InvalidConfig("validation tolerances must not be negative".into()));
        }
        Ok(())
    }
}
