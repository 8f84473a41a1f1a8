//! Typed rows produced by the extractors.

use chrono::NaiveDate;
use serde::Serialize;

/// Table A: an expected future payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRow {
    /// Payment kind, e.g. old-age pension
    pub description: String,
    /// Monthly amount
    pub amount: f64,
}

/// Table C: a management fee rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeRow {
    /// Fee kind, e.g. fee on deposits
    pub description: String,
    /// Rate in percent
    pub percentage: f64,
    /// The rate is a fee on deposits above the regulatory ceiling, which
    /// usually means the value was read from the wrong column.
    pub exceeds_ceiling: bool,
}

/// Table D: an investment track and its return.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRow {
    /// Track name, possibly assembled from several printed lines
    pub track_name: String,
    /// Return in percent (may be negative)
    pub return_percentage: f64,
    /// The return equals one of the fee rates of the same document.
    pub conflated_with_fees: bool,
}

/// How the summary-shift correction treated a ledger summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShiftOutcome {
    /// The maximum already sat in the total slot.
    Unchanged,
    /// Four slots were present; values from `from` onward moved one slot left.
    Rotated {
        /// Slot index (0 = employee .. 3 = total) where the maximum was found
        from: usize,
    },
    /// Fewer than four slots were present. A missing severance was set to
    /// zero and employee, employer and total were rotated from `from` onward.
    Reduced {
        /// Slot index (0 = employee, 1 = employer) of the maximum
        from: usize,
    },
}

/// How much the corrected summary can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftConfidence {
    /// All parts present and non-zero, and they add up to the total.
    High,
    /// Some part is zero or absent, or the parts do not add up.
    Low,
}

/// Result of summary-shift correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftReport {
    /// What was done to the row
    pub outcome: ShiftOutcome,
    /// Trust in the resulting values
    pub confidence: ShiftConfidence,
}

/// Table E: one monthly deposit, or the summary line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerRow {
    /// Employer name; `None` on the summary row
    pub employer: Option<String>,
    /// Value date of the deposit
    pub deposit_date: Option<NaiveDate>,
    /// Salary month as `MM/YYYY`
    pub salary_month: Option<String>,
    /// Insured salary
    pub salary: Option<f64>,
    /// Employee contribution
    pub employee_contribution: Option<f64>,
    /// Employer contribution
    pub employer_contribution: Option<f64>,
    /// Severance component
    pub severance: Option<f64>,
    /// Deposit total
    pub total: Option<f64>,
    /// This is the table's "total" line
    pub is_summary: bool,
    /// Set on the summary row once shift correction ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<ShiftReport>,
}

/// A row of any of the five tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Row {
    /// Table A or B row
    Payment(PaymentRow),
    /// Table C row
    Fee(FeeRow),
    /// Table D row
    Track(TrackRow),
    /// Table E row
    Ledger(LedgerRow),
}

impl Row {
    /// Description of a payment, fee or track row.
    pub fn description(&self) -> Option<&str> {
        match self {
            Row::Payment(r) => Some(&r.description),
            Row::Fee(r) => Some(&r.description),
            Row::Track(r) => Some(&r.track_name),
            Row::Ledger(_) => None,
        }
    }

    /// The ledger row, if this is one.
    pub fn as_ledger(&self) -> Option<&LedgerRow> {
        match self {
            Row::Ledger(r) => Some(r),
            _ => None,
        }
    }

    /// Mutable access to the ledger row, if this is one.
    pub fn as_ledger_mut(&mut self) -> Option<&mut LedgerRow> {
        match self {
            Row::Ledger(r) => Some(r),
            _ => None,
        }
    }

    /// The amount of a payment or movement row.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Row::Payment(r) => Some(r.amount),
            _ => None,
        }
    }

    /// The percentage of a fee row.
    pub fn fee_percentage(&self) -> Option<f64> {
        match self {
            Row::Fee(r) => Some(r.percentage),
            _ => None,
        }
    }
}
