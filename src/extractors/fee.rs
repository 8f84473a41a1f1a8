//! Management fee rows.

use super::{find_percentage, text_without, ExtractionContext, FeeRow, Row, RowExtractor};
use crate::layout::Line;
use crate::text::find_keyword;

/// Extracts one fee row per line carrying a percentage.
///
/// A fee on deposits above the configured ceiling is flagged with
/// [`FeeRow::exceeds_ceiling`]; the value itself is kept as read.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeExtractor;

impl RowExtractor for FeeExtractor {
    fn extract(&self, lines: &[Line], context: &ExtractionContext<'_>) -> Vec<Row> {
        let config = context.config;
        let mut rows = vec![];

        for line in lines {
            let Some(percent) = find_percentage(line) else {
                log::debug!("No percentage on fee line: {:?}", line.text());
                continue;
            };

            let description = text_without(line, &percent.consumed);
            let on_deposits = find_keyword(&description, &config.deposit_fee_keywords).is_some();
            let exceeds_ceiling = on_deposits && percent.value > config.deposit_fee_ceiling;
            if exceeds_ceiling {
                log::warn!(
                    "Deposit fee {}% exceeds the {}% ceiling: {:?}",
                    percent.value,
                    config.deposit_fee_ceiling,
                    description
                );
            }

            rows.push(Row::Fee(FeeRow {
                description,
                percentage: percent.value,
                exceeds_ceiling,
            }));
        }

        rows
    }

    fn name(&self) -> &'static str {
        "management_fees"
    }
}
