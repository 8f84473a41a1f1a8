//! Description + amount rows (expected payments, account movements).

use super::{numeric_cells, text_without, ExtractionContext, PaymentRow, Row, RowExtractor};
use crate::layout::Line;

/// Extracts rows where the largest number on a line is its amount.
#[derive(Debug, Clone, Copy)]
pub struct PaymentExtractor {
    name: &'static str,
}

impl PaymentExtractor {
    /// Create an extractor reporting itself as `name`.
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }

    fn extract_line(line: &Line) -> Option<PaymentRow> {
        let cells = numeric_cells(line);
        let amount = cells
            .iter()
            .copied()
            .reduce(|best, cell| {
                if cell.value.abs() > best.value.abs() {
                    cell
                } else {
                    best
                }
            })?
            .value;

        let description = text_without(line, &[]);
        if description.is_empty() {
            log::debug!("Skipping line without description: {:?}", line.text());
            return None;
        }

        Some(PaymentRow {
            description,
            amount,
        })
    }
}

impl Default for PaymentExtractor {
    fn default() -> Self {
        Self::new("payments")
    }
}

impl RowExtractor for PaymentExtractor {
    fn extract(&self, lines: &[Line], _context: &ExtractionContext<'_>) -> Vec<Row> {
        lines
            .iter()
            .filter_map(Self::extract_line)
            .map(Row::Payment)
            .collect()
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
