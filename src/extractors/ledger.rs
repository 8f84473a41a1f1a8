//! Monthly deposit ledger rows.
//!
//! Two kinds of lines carry data:
//! - detail lines: an employer (inline, carried over from a preceding line or
//!   taken from the document header), a value date, a salary month and up to
//!   five amounts;
//! - the summary line: a "total" marker and at least three positive amounts.
//!
//! Amounts of a detail line are read from the end of the line:
//! total, severance, employer contribution, employee contribution, salary.
//! A lone dash in the amount columns is an empty cell: it takes its slot
//! but carries no value. Ledger amounts never take a detached sign.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use super::{is_text_only, ExtractionContext, LedgerRow, PendingText, Row, RowExtractor};
use crate::layout::{Line, Token};
use crate::pipeline::config::ExtractionConfig;
use crate::text::{find_keyword, find_whole_keyword, is_dash, looks_numeric, normalize};

lazy_static! {
    /// Day, month and year separated by `.`, `/` or `-`.
    static ref RE_FULL_DATE: Regex =
        Regex::new(r"^(\d{1,2})[./-](\d{1,2})[./-](\d{4}|\d{2})$").unwrap();

    /// Month and four-digit year in either order.
    static ref RE_MONTH_YEAR: Regex =
        Regex::new(r"^(?:(\d{1,2})[./-](\d{4})|(\d{4})[./-](\d{1,2}))$").unwrap();
}

/// Parse a full date token; two-digit years are taken as 20xx.
fn parse_full_date(text: &str) -> Option<NaiveDate> {
    let caps = RE_FULL_DATE.captures(text.trim())?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;
    if caps[3].len() == 2 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a salary month token into `MM/YYYY`.
fn parse_month_year(text: &str) -> Option<String> {
    let caps = RE_MONTH_YEAR.captures(text.trim())?;
    let (month, year) = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
        (Some(m), Some(y), _, _) => (m.as_str(), y.as_str()),
        (_, _, Some(y), Some(m)) => (m.as_str(), y.as_str()),
        _ => return None,
    };
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(format!("{:02}/{}", month, year))
}

/// Amount slots of a ledger line in line order.
///
/// Numeric tokens fill a slot; a lone dash at or after `start` is an empty
/// slot. Positions in `skip` (date columns) are ignored.
fn amount_slots(tokens: &[Token], start: usize, skip: &[usize]) -> Vec<Option<f64>> {
    tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| !skip.contains(i))
        .filter_map(|(i, t)| {
            let text = t.text();
            if i >= start && is_dash(text) {
                Some(None)
            } else if looks_numeric(text) {
                normalize(text).map(Some)
            } else {
                None
            }
        })
        .collect()
}

/// Extracts the deposit ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerExtractor;

impl LedgerExtractor {
    fn is_summary_line(line: &Line, config: &ExtractionConfig) -> bool {
        let tokens = line.tokens();
        !tokens.iter().any(|t| parse_full_date(t.text()).is_some())
            && find_whole_keyword(&line.text(), &config.total_markers).is_some()
            && amount_slots(tokens, 0, &[]).iter().flatten().filter(|v| **v > 0.0).count() >= 3
    }

    fn detail_row(line: &Line, employer: Option<String>) -> Option<LedgerRow> {
        let tokens = line.tokens();
        let date_index = tokens.iter().position(|t| parse_full_date(t.text()).is_some())?;
        let deposit_date = parse_full_date(tokens[date_index].text());

        let month_index = tokens
            .iter()
            .enumerate()
            .find(|(i, t)| *i != date_index && parse_month_year(t.text()).is_some())
            .map(|(i, _)| i);
        let salary_month = month_index.and_then(|i| parse_month_year(tokens[i].text()));

        let inline_employer = tokens[..date_index]
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != month_index)
            .map(|(_, t)| t.text().trim())
            .filter(|t| !t.is_empty() && !looks_numeric(t) && !is_dash(t))
            .collect::<Vec<_>>()
            .join(" ");
        let employer = if inline_employer.is_empty() {
            employer
        } else {
            Some(inline_employer)
        };

        let skip: Vec<usize> = std::iter::once(date_index).chain(month_index).collect();
        let mut amounts = amount_slots(tokens, date_index, &skip);

        let mut row = LedgerRow {
            employer,
            deposit_date,
            salary_month,
            ..Default::default()
        };
        row.total = amounts.pop().flatten();
        row.severance = amounts.pop().flatten();
        row.employer_contribution = amounts.pop().flatten();
        row.employee_contribution = amounts.pop().flatten();
        row.salary = amounts.pop().flatten();
        Some(row)
    }

    /// Build the summary row from the amount slots of its line.
    ///
    /// Without empty cells the values are assigned in descending order.
    /// With an empty cell the columns are read from the end like a detail
    /// line, so the gap stays where it was printed.
    fn summary_row(mut slots: Vec<Option<f64>>, salary_sum: Option<f64>) -> LedgerRow {
        for slot in slots.iter_mut() {
            if slot.is_some_and(|v| v <= 0.0) {
                *slot = None;
            }
        }

        // A fifth amount is usually the salary column's total; it is
        // recomputed from the details instead.
        if slots.len() > 4 {
            if let Some(sum) = salary_sum {
                let tolerance = (sum.abs() * 0.005).max(1.0);
                if let Some(pos) = slots
                    .iter()
                    .position(|v| v.is_some_and(|v| (v - sum).abs() <= tolerance))
                {
                    slots.remove(pos);
                }
            }
        }

        let mut row = LedgerRow {
            salary: salary_sum,
            is_summary: true,
            ..Default::default()
        };

        if slots.iter().any(Option::is_none) {
            row.total = slots.pop().flatten();
            row.severance = slots.pop().flatten();
            row.employer_contribution = slots.pop().flatten();
            row.employee_contribution = slots.pop().flatten();
        } else {
            let mut values: Vec<f64> = slots.into_iter().flatten().collect();
            values.sort_by(|a, b| b.total_cmp(a));
            let mut values = values.into_iter();
            row.total = values.next();
            row.severance = values.next();
            row.employer_contribution = values.next();
            row.employee_contribution = values.next();
        }
        row
    }
}

impl RowExtractor for LedgerExtractor {
    fn extract(&self, lines: &[Line], context: &ExtractionContext<'_>) -> Vec<Row> {
        let config = context.config;
        let mut pending = PendingText::default();
        let mut details: Vec<LedgerRow> = vec![];
        let mut summary: Option<Vec<Option<f64>>> = None;

        for line in lines {
            let text = line.text();

            if Self::is_summary_line(line, config) {
                if summary.is_some() {
                    log::debug!("Later summary line replaces earlier one: {:?}", text);
                }
                summary = Some(amount_slots(line.tokens(), 0, &[]));
                continue;
            }

            let employer = pending
                .peek()
                .or_else(|| context.header_employer.map(str::to_string));
            if let Some(row) = Self::detail_row(line, employer) {
                details.push(row);
                continue;
            }

            if is_text_only(line) {
                let is_header = find_keyword(&text, &config.ledger_header_words).is_some()
                    || find_whole_keyword(&text, &config.total_markers).is_some();
                if is_header {
                    log::debug!("Ledger header line: {:?}", text);
                } else {
                    log::debug!("Pending employer: {:?}", text);
                    pending.replace(text);
                }
                continue;
            }

            log::debug!("Skipping ledger line: {:?}", text);
        }

        let salary_sum = details
            .iter()
            .filter_map(|r| r.salary)
            .fold(None, |acc: Option<f64>, s| Some(acc.unwrap_or(0.0) + s));

        let mut rows: Vec<Row> = details.into_iter().map(Row::Ledger).collect();
        if let Some(values) = summary {
            rows.push(Row::Ledger(Self::summary_row(values, salary_sum)));
        }
        rows
    }

    fn name(&self) -> &'static str {
        "deposit_ledger"
    }
}
