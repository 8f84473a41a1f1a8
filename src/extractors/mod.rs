//! Schema row extractors.
//!
//! Each of the five tables has its own extractor turning the lines of its
//! section into typed [`Row`]s. Extractors are deterministic and never
//! fail: malformed lines are skipped and logged at debug level.
//!
//! # Available Extractors
//!
//! - [`PaymentExtractor`]: description + amount rows (tables A and B)
//! - [`FeeExtractor`]: description + percentage rows (table C)
//! - [`TrackExtractor`]: multi-line track names + returns (table D)
//! - [`LedgerExtractor`]: dated deposit rows + summary row (table E)

mod fee;
mod ledger;
mod payment;
pub mod row;
pub mod shift;
mod track;

pub use fee::FeeExtractor;
pub use ledger::LedgerExtractor;
pub use payment::PaymentExtractor;
pub use row::{
    FeeRow, LedgerRow, PaymentRow, Row, ShiftConfidence, ShiftOutcome, ShiftReport, TrackRow,
};
pub use shift::correct_summary_shift;
pub use track::TrackExtractor;

use crate::layout::{Line, SectionId, Token};
use crate::pipeline::config::ExtractionConfig;
use crate::text::{is_dash, is_percent_sign, looks_numeric, looks_percentage, normalize};

/// Trait for turning the lines of one section into rows.
pub trait RowExtractor: Send + Sync {
    /// Extract rows from the section's lines.
    ///
    /// # Arguments
    ///
    /// * `lines` - Lines of the section in document order
    /// * `context` - Configuration and values gathered from other sections
    fn extract(&self, lines: &[Line], context: &ExtractionContext<'_>) -> Vec<Row>;

    /// Return the name of this extractor for debugging.
    fn name(&self) -> &'static str;
}

/// Context shared by the extractors of one document.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    /// Row-level markers and sanity limits.
    pub config: &'a ExtractionConfig,

    /// Employer name from the document header, used when ledger rows omit one.
    pub header_employer: Option<&'a str>,

    /// Percentages found in the fee table, for the track conflation check.
    pub fee_percentages: &'a [f64],
}

impl<'a> ExtractionContext<'a> {
    /// Create a context with no header employer and no fee values.
    pub fn new(config: &'a ExtractionConfig) -> Self {
        Self {
            config,
            header_employer: None,
            fee_percentages: &[],
        }
    }

    /// Set the header employer.
    pub fn with_header_employer(mut self, employer: Option<&'a str>) -> Self {
        self.header_employer = employer;
        self
    }

    /// Set the fee percentages seen so far.
    pub fn with_fee_percentages(mut self, values: &'a [f64]) -> Self {
        self.fee_percentages = values;
        self
    }
}

/// Create the extractor for a section.
pub fn create_extractor(id: SectionId) -> Box<dyn RowExtractor> {
    match id {
        SectionId::ExpectedPayments => Box::new(PaymentExtractor::new("expected_payments")),
        SectionId::AccountMovements => Box::new(PaymentExtractor::new("account_movements")),
        SectionId::ManagementFees => Box::new(FeeExtractor),
        SectionId::InvestmentTracks => Box::new(TrackExtractor),
        SectionId::DepositLedger => Box::new(LedgerExtractor),
    }
}

/// A numeric token of a line together with its signed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NumericCell {
    /// Position of the token in the line
    pub index: usize,
    /// Normalized value, sign included
    pub value: f64,
}

/// Negate `value` when the token right before `index` is a lone dash.
///
/// Some renderers emit the minus sign of a negative number as its own glyph
/// run.
pub(crate) fn apply_detached_sign(tokens: &[Token], index: usize, value: f64) -> f64 {
    let detached = index > 0 && is_dash(tokens[index - 1].text());
    if detached && value > 0.0 {
        -value
    } else {
        value
    }
}

/// Every numeric token of a line that normalizes to a value.
pub(crate) fn numeric_cells(line: &Line) -> Vec<NumericCell> {
    let tokens = line.tokens();
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| looks_numeric(t.text()))
        .filter_map(|(index, t)| {
            normalize(t.text()).map(|value| NumericCell {
                index,
                value: apply_detached_sign(tokens, index, value),
            })
        })
        .collect()
}

/// A percentage found on a line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PercentCell {
    /// Signed value in percent
    pub value: f64,
    /// Token positions that make up the percentage
    pub consumed: Vec<usize>,
}

/// Find the first percentage on a line.
///
/// Accepts `N%` and `%N` in one token, or a numeric token next to a
/// standalone `%` token.
pub(crate) fn find_percentage(line: &Line) -> Option<PercentCell> {
    let tokens = line.tokens();
    for (index, token) in tokens.iter().enumerate() {
        let text = token.text();
        if looks_percentage(text) {
            if let Some(value) = normalize(text) {
                return Some(PercentCell {
                    value: apply_detached_sign(tokens, index, value),
                    consumed: vec![index],
                });
            }
        }

        if looks_numeric(text) {
            let sign = [index.checked_sub(1), Some(index + 1)]
                .into_iter()
                .flatten()
                .find(|&i| tokens.get(i).is_some_and(|t| is_percent_sign(t.text())));
            if let (Some(sign), Some(value)) = (sign, normalize(text)) {
                return Some(PercentCell {
                    value: apply_detached_sign(tokens, index.min(sign), value),
                    consumed: vec![index, sign],
                });
            }
        }
    }
    None
}

/// Join the text tokens of a line, skipping `consumed` positions and any
/// numeric, dash or percent-sign token.
pub(crate) fn text_without(line: &Line, consumed: &[usize]) -> String {
    line.tokens()
        .iter()
        .enumerate()
        .filter(|(i, _)| !consumed.contains(i))
        .map(|(_, t)| t.text().trim())
        .filter(|t| !looks_numeric(t) && !is_dash(t) && !is_percent_sign(t) && !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a line carries no numeric token at all.
pub(crate) fn is_text_only(line: &Line) -> bool {
    !line.tokens().iter().any(|t| looks_numeric(t.text()))
}

/// Text carried from earlier lines into the next row (wrapped labels).
#[derive(Debug, Default)]
pub(crate) struct PendingText {
    parts: Vec<String>,
}

impl PendingText {
    /// Append a fragment.
    pub fn push(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.trim().is_empty() {
            self.parts.push(text);
        }
    }

    /// Replace the buffer with a single fragment.
    pub fn replace(&mut self, text: impl Into<String>) {
        self.parts.clear();
        self.push(text);
    }

    /// Current contents joined with spaces, if any.
    pub fn peek(&self) -> Option<String> {
        if self.parts.is_empty() {
            None
        } else {
            Some(self.parts.join(" "))
        }
    }

    /// Take the contents, leaving the buffer empty.
    pub fn take(&mut self) -> Option<String> {
        let text = self.peek();
        self.parts.clear();
        text
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::layout::{cluster_tokens_into_lines, Line, TextDirection, Token};

    /// Build a single line from `(text, x)` cells at the given height.
    pub fn line_at(cells: &[(&str, f32)], y: f32, page: usize) -> Vec<Token> {
        cells
            .iter()
            .map(|(text, x)| Token::from_corners(*text, *x, y, *x + 30.0, y + 10.0, page))
            .collect()
    }

    /// Build lines from rows of `(text, x)` cells, 20 units apart.
    pub fn lines(rows: &[&[(&str, f32)]]) -> Vec<Line> {
        let tokens = rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| line_at(row, i as f32 * 20.0, 0))
            .collect();
        cluster_tokens_into_lines(tokens, 3.0, TextDirection::LeftToRight)
    }
}
