//! Investment track rows.
//!
//! Track names often wrap: the first part sits alone on a line without any
//! number and the rest shares a line with the return percentage. Text-only
//! lines are buffered and prepended to the name of the next percentage line.

use super::{
    find_percentage, is_text_only, text_without, ExtractionContext, PendingText, Row,
    RowExtractor, TrackRow,
};
use crate::layout::Line;

/// Extracts investment tracks and their returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackExtractor;

impl RowExtractor for TrackExtractor {
    fn extract(&self, lines: &[Line], context: &ExtractionContext<'_>) -> Vec<Row> {
        let mut pending = PendingText::default();
        let mut rows = vec![];

        for line in lines {
            let Some(percent) = find_percentage(line) else {
                if is_text_only(line) {
                    pending.push(line.text());
                } else {
                    log::debug!("Skipping track line without percentage: {:?}", line.text());
                }
                continue;
            };

            let own = text_without(line, &percent.consumed);
            let track_name = match pending.take() {
                Some(prefix) if own.is_empty() => prefix,
                Some(prefix) => format!("{} {}", prefix, own),
                None => own,
            };
            if track_name.is_empty() {
                log::debug!("Percentage without track name: {:?}", line.text());
                continue;
            }

            let conflated_with_fees = context
                .fee_percentages
                .iter()
                .any(|fee| (fee - percent.value).abs() <= context.config.conflation_epsilon);
            if conflated_with_fees {
                log::warn!(
                    "Track return {}% of {:?} equals a management fee rate",
                    percent.value,
                    track_name
                );
            }

            rows.push(Row::Track(TrackRow {
                track_name,
                return_percentage: percent.value,
                conflated_with_fees,
            }));
        }

        if let Some(leftover) = pending.take() {
            log::debug!("Dropping unterminated track name {:?}", leftover);
        }
        rows
    }

    fn name(&self) -> &'static str {
        "investment_tracks"
    }
}
