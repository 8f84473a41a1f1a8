//! Table reconstruction pipeline.
//!
//! ```text
//! Token[] (positioned text, any order)
//!     ↓
//! [cluster_tokens_into_lines] (running-average vertical clustering)
//!     ↓
//! Line[] (reading order per direction)
//!     ↓
//! [segment_sections] (anchor keywords, column scoping)
//!     ↓
//! Section[] (at most one per table)
//!     ↓
//! [RowExtractor] per table → Row[]
//!     ↓
//! [correct_summary_shift] + [validate]
//!     ↓
//! DocumentTables
//! ```
//!
//! # Key Design Principles
//!
//! 1. **Never fatal**: a missing section yields an empty table, a document
//!    without tokens yields five empty tables and an indeterminate
//!    validation. Errors only exist where bytes enter the crate.
//!
//! 2. **Single numeric entry point**: every number passes through
//!    [`crate::text::normalize`].
//!
//! 3. **Unified Configuration**: all thresholds live in [`PipelineConfig`].

pub mod config;
pub mod validation;

pub use config::{ExtractionConfig, LineConfig, PipelineConfig, SectionConfig, ValidationConfig};
pub use validation::{validate, CrossValidation, ValidationStatus};

use serde::Serialize;

use crate::document::TokenDocument;
use crate::extractors::{correct_summary_shift, create_extractor, ExtractionContext, Row};
use crate::layout::{cluster_tokens_into_lines, segment_sections, Line, Section, SectionId};
use crate::layout::{TextDirection, Token};

/// Tables reconstructed from one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTables {
    /// Reading direction used for line ordering
    pub direction: TextDirection,
    /// Sections that were found, in document order
    pub sections: Vec<Section>,
    /// Table A rows
    pub expected_payments: Vec<Row>,
    /// Table B rows
    pub account_movements: Vec<Row>,
    /// Table C rows
    pub management_fees: Vec<Row>,
    /// Table D rows
    pub investment_tracks: Vec<Row>,
    /// Table E rows, summary last
    pub deposit_ledger: Vec<Row>,
    /// B/E reconciliation
    pub validation: CrossValidation,
}

impl DocumentTables {
    /// Result for a document with no usable content.
    pub fn empty(direction: TextDirection) -> Self {
        Self {
            direction,
            sections: vec![],
            expected_payments: vec![],
            account_movements: vec![],
            management_fees: vec![],
            investment_tracks: vec![],
            deposit_ledger: vec![],
            validation: CrossValidation::indeterminate(),
        }
    }

    /// Rows of one table.
    pub fn rows(&self, id: SectionId) -> &[Row] {
        match id {
            SectionId::ExpectedPayments => &self.expected_payments,
            SectionId::AccountMovements => &self.account_movements,
            SectionId::ManagementFees => &self.management_fees,
            SectionId::InvestmentTracks => &self.investment_tracks,
            SectionId::DepositLedger => &self.deposit_ledger,
        }
    }

    fn rows_mut(&mut self, id: SectionId) -> &mut Vec<Row> {
        match id {
            SectionId::ExpectedPayments => &mut self.expected_payments,
            SectionId::AccountMovements => &mut self.account_movements,
            SectionId::ManagementFees => &mut self.management_fees,
            SectionId::InvestmentTracks => &mut self.investment_tracks,
            SectionId::DepositLedger => &mut self.deposit_ledger,
        }
    }

    /// The section descriptor of one table, if its anchor was found.
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        SectionId::ALL.iter().map(|id| self.rows(*id).len()).sum()
    }
}

/// The table reconstruction pipeline.
///
/// Stateless apart from its configuration; one instance can process any
/// number of documents, from any number of threads.
///
/// # Examples
///
/// ```
/// use spatial_tables::layout::Token;
/// use spatial_tables::pipeline::{TablePipeline, ValidationStatus};
///
/// let tokens = vec![
///     Token::from_corners("Account movements", 0.0, 0.0, 500.0, 10.0, 0),
///     Token::from_corners("Deposits", 0.0, 20.0, 100.0, 30.0, 0),
///     Token::from_corners("12,000", 400.0, 20.0, 500.0, 30.0, 0),
/// ];
///
/// let tables = TablePipeline::new().process(tokens, None);
/// assert_eq!(tables.account_movements.len(), 1);
/// assert_eq!(tables.validation.status, ValidationStatus::Indeterminate);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TablePipeline {
    config: PipelineConfig,
}

impl TablePipeline {
    /// Create a new pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Get the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Reading direction for a set of tokens: configured, or detected.
    pub fn direction_for(&self, tokens: &[Token]) -> TextDirection {
        self.config.direction.unwrap_or_else(|| {
            let sample: String = tokens
                .iter()
                .map(Token::text)
                .collect::<Vec<_>>()
                .join(" ");
            TextDirection::detect_from_sample(&sample)
        })
    }

    /// Cluster tokens into lines using the configured direction and tolerance.
    pub fn lines(&self, tokens: Vec<Token>) -> Vec<Line> {
        let direction = self.direction_for(&tokens);
        cluster_tokens_into_lines(tokens, self.config.lines.y_tolerance, direction)
    }

    /// Reconstruct all tables of a document.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Every token of the document, in any order
    /// * `header_employer` - Fallback employer for ledger rows that omit one
    pub fn process(&self, tokens: Vec<Token>, header_employer: Option<&str>) -> DocumentTables {
        let direction = self.direction_for(&tokens);
        let lines = cluster_tokens_into_lines(tokens, self.config.lines.y_tolerance, direction);
        self.process_lines(&lines, direction, header_employer)
    }

    /// Reconstruct all tables of a loaded [`TokenDocument`].
    pub fn process_document(&self, document: TokenDocument) -> DocumentTables {
        let TokenDocument {
            tokens,
            header_employer,
        } = document;
        self.process(tokens, header_employer.as_deref())
    }

    /// Reconstruct all tables from lines that are already clustered.
    pub fn process_lines(
        &self,
        lines: &[Line],
        direction: TextDirection,
        header_employer: Option<&str>,
    ) -> DocumentTables {
        let mut tables = DocumentTables::empty(direction);
        if lines.is_empty() {
            log::info!("Document has no text; returning empty tables");
            return tables;
        }

        tables.sections = segment_sections(lines, &self.config.sections);

        let mut fee_percentages: Vec<f64> = vec![];
        for id in SectionId::ALL {
            let Some(section) = tables.section(id).cloned() else {
                continue;
            };
            let section_lines = section.select_lines(lines);
            let context = ExtractionContext::new(&self.config.extraction)
                .with_header_employer(header_employer)
                .with_fee_percentages(&fee_percentages);

            let extractor = create_extractor(id);
            let rows = extractor.extract(&section_lines, &context);
            log::debug!(
                "{} extracted {} rows from {} lines",
                extractor.name(),
                rows.len(),
                section_lines.len()
            );

            if id == SectionId::ManagementFees {
                fee_percentages = rows.iter().filter_map(Row::fee_percentage).collect();
            }
            *tables.rows_mut(id) = rows;
        }

        for row in tables.deposit_ledger.iter_mut().filter_map(Row::as_ledger_mut) {
            correct_summary_shift(row);
        }

        tables.validation = validate(
            &tables.account_movements,
            &tables.deposit_ledger,
            &self.config.validation,
        );

        log::info!(
            "Extracted {} rows from {} lines in {} of 5 sections",
            tables.row_count(),
            lines.len(),
            tables.sections.len()
        );
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str, x0: f32, x1: f32, y: f32) -> Token {
        Token::from_corners(text, x0, y, x1, y + 10.0, 0)
    }

    #[test]
    fn test_empty_document() {
        let tables = TablePipeline::new().process(vec![], None);
        assert_eq!(tables.row_count(), 0);
        assert!(tables.sections.is_empty());
        assert_eq!(tables.validation.status, ValidationStatus::Indeterminate);
    }

    #[test]
    fn test_document_without_anchors() {
        let tokens = vec![tok("Annual", 0.0, 100.0, 0.0), tok("report", 120.0, 200.0, 0.0)];
        let tables = TablePipeline::new().process(tokens, None);
        assert_eq!(tables.row_count(), 0);
        assert_eq!(tables.validation.status, ValidationStatus::Indeterminate);
    }

    #[test]
    fn test_direction_detection_and_override() {
        let tokens = vec![tok("פירוט", 0.0, 100.0, 0.0), tok("הפקדות", 120.0, 200.0, 0.0)];
        assert_eq!(TablePipeline::new().direction_for(&tokens), TextDirection::RightToLeft);

        let config = PipelineConfig::new().with_direction(TextDirection::LeftToRight);
        let pipeline = TablePipeline::with_config(config);
        assert_eq!(pipeline.direction_for(&tokens), TextDirection::LeftToRight);
    }

    #[test]
    fn test_fee_values_reach_track_extractor() {
        let tokens = vec![
            tok("Management fees", 0.0, 500.0, 0.0),
            tok("Fee on savings", 0.0, 200.0, 20.0),
            tok("0.22%", 400.0, 500.0, 20.0),
            tok("Investment tracks", 0.0, 500.0, 40.0),
            tok("General", 0.0, 200.0, 60.0),
            tok("0.22%", 400.0, 500.0, 60.0),
        ];
        let tables = TablePipeline::new().process(tokens, None);
        assert_eq!(tables.management_fees.len(), 1);
        match &tables.investment_tracks[..] {
            [Row::Track(track)] => assert!(track.conflated_with_fees),
            other => panic!("unexpected tracks: {:?}", other),
        }
    }

    #[test]
    fn test_summary_is_shift_corrected() {
        let tokens = vec![
            tok("Deposit details", 0.0, 500.0, 0.0),
            tok("Total", 0.0, 60.0, 20.0),
            tok("1,000", 100.0, 150.0, 20.0),
            tok("1,500", 200.0, 250.0, 20.0),
            tok("5,500", 300.0, 350.0, 20.0),
            tok("3,000", 400.0, 450.0, 20.0),
        ];
        let tables = TablePipeline::new().process(tokens, None);
        let summary = tables.deposit_ledger[0].as_ledger().unwrap();
        assert_eq!(summary.total, Some(5_500.0));
        assert!(summary.shift.is_some());
    }
}
