//! Cross-table reconciliation.
//!
//! The deposits line of the account-movements table (B) should agree with
//! the total of the deposit ledger (E). Disagreement usually means one of the
//! two tables was read incorrectly.

use serde::Serialize;

use crate::extractors::Row;
use crate::pipeline::config::ValidationConfig;
use crate::text::find_keyword;

/// Outcome of the B/E comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Both values found and within tolerance
    Match,
    /// Both values found but they differ
    Mismatch,
    /// One of the values could not be located
    Indeterminate,
}

/// Result of cross-table validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidation {
    /// Comparison outcome
    pub status: ValidationStatus,
    /// Deposits according to the account-movements table
    pub b_value: Option<f64>,
    /// Deposits according to the ledger
    pub e_value: Option<f64>,
    /// `b_value - e_value` when both are known
    pub delta: Option<f64>,
    /// Absolute tolerance used for the comparison
    pub tolerance: Option<f64>,
}

impl CrossValidation {
    /// Result for a document where nothing could be compared.
    pub fn indeterminate() -> Self {
        Self {
            status: ValidationStatus::Indeterminate,
            b_value: None,
            e_value: None,
            delta: None,
            tolerance: None,
        }
    }
}

/// Deposits reported by the account-movements table.
fn deposits_from_movements(b_rows: &[Row], config: &ValidationConfig) -> Option<f64> {
    b_rows.iter().find_map(|row| {
        let description = row.description()?;
        find_keyword(description, &config.deposit_keywords)?;
        row.amount()
    })
}

/// Deposits reported by the ledger: the summary total, otherwise the sum of
/// detail totals.
fn deposits_from_ledger(e_rows: &[Row]) -> Option<f64> {
    let ledger = e_rows.iter().filter_map(Row::as_ledger);

    if let Some(total) = ledger.clone().filter(|r| r.is_summary).find_map(|r| r.total) {
        return Some(total);
    }

    ledger
        .filter(|r| !r.is_summary)
        .filter_map(|r| r.total)
        .fold(None, |acc: Option<f64>, t| Some(acc.unwrap_or(0.0) + t))
}

/// Compare deposits between the account-movements and ledger tables.
///
/// The tolerance is `max(min_tolerance, relative_tolerance * |b_value|)`.
///
/// # Examples
///
/// ```
/// use spatial_tables::extractors::{LedgerRow, PaymentRow, Row};
/// use spatial_tables::pipeline::config::ValidationConfig;
/// use spatial_tables::pipeline::validation::{validate, ValidationStatus};
///
/// let b = vec![Row::Payment(PaymentRow { description: "Deposits".into(), amount: 10_000.0 })];
/// let e = vec![Row::Ledger(LedgerRow {
///     total: Some(10_050.0),
///     is_summary: true,
///     ..Default::default()
/// })];
///
/// let result = validate(&b, &e, &ValidationConfig::default());
/// assert_eq!(result.status, ValidationStatus::Match);
/// assert_eq!(result.tolerance, Some(100.0));
/// ```
pub fn validate(b_rows: &[Row], e_rows: &[Row], config: &ValidationConfig) -> CrossValidation {
    let b_value = deposits_from_movements(b_rows, config);
    let e_value = deposits_from_ledger(e_rows);

    let (Some(b), Some(e)) = (b_value, e_value) else {
        log::info!(
            "Cross-validation indeterminate (b: {:?}, e: {:?})",
            b_value,
            e_value
        );
        return CrossValidation {
            b_value,
            e_value,
            ..CrossValidation::indeterminate()
        };
    };

    let tolerance = (b.abs() * config.relative_tolerance).max(config.min_tolerance);
    let delta = b - e;
    let status = if delta.abs() <= tolerance {
        ValidationStatus::Match
    } else {
        ValidationStatus::Mismatch
    };
    log::info!(
        "Cross-validation {:?}: b={} e={} delta={} tolerance={}",
        status,
        b,
        e,
        delta,
        tolerance
    );

    CrossValidation {
        status,
        b_value: Some(b),
        e_value: Some(e),
        delta: Some(delta),
        tolerance: Some(tolerance),
    }
}
