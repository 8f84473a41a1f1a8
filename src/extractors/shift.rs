//! Summary-shift correction for the deposit ledger.
//!
//! The summary line of the ledger is sometimes read one column off: the
//! grand total lands in the severance slot and every later value moves one
//! slot right. The total is always the largest of the four contribution
//! fields, so the slot holding the maximum tells how far the row shifted.
//! Rotating the slots from there onward puts the maximum back in the total
//! slot and keeps the other values in their relative order.

use super::row::{LedgerRow, ShiftConfidence, ShiftOutcome, ShiftReport};

/// Move the first maximum to the last slot by rotating the tail left.
///
/// Returns the index the maximum was found at, or `None` when every slot
/// is empty.
fn rotate_max_to_end(slots: &mut [Option<f64>]) -> Option<usize> {
    let (from, _) = slots
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })?;
    slots[from..].rotate_left(1);
    Some(from)
}

/// Trust in the corrected fields.
fn confidence(row: &LedgerRow) -> ShiftConfidence {
    let parts = [
        row.employee_contribution,
        row.employer_contribution,
        row.severance,
        row.total,
    ];
    if parts.iter().any(|p| p.map_or(true, |v| v == 0.0)) {
        return ShiftConfidence::Low;
    }

    let total = row.total.unwrap_or_default();
    let sum: f64 = parts[..3].iter().flatten().sum();
    if (total - sum).abs() > (total.abs() * 0.01).max(1.0) {
        ShiftConfidence::Low
    } else {
        ShiftConfidence::High
    }
}

/// Repair a shifted ledger summary row in place.
///
/// Non-summary rows are never touched and yield `None`. With all four
/// contribution fields present the maximum is rotated into `total`;
/// otherwise a missing severance is set to zero and the same rule runs
/// over employee, employer and total. The report is also stored in
/// [`LedgerRow::shift`].
///
/// # Examples
///
/// ```
/// use spatial_tables::extractors::{correct_summary_shift, LedgerRow, ShiftOutcome};
///
/// let mut row = LedgerRow {
///     employee_contribution: Some(1000.0),
///     employer_contribution: Some(1500.0),
///     severance: Some(3000.0),
///     total: Some(2500.0),
///     is_summary: true,
///     ..Default::default()
/// };
///
/// let report = correct_summary_shift(&mut row).unwrap();
/// assert_eq!(report.outcome, ShiftOutcome::Rotated { from: 2 });
/// assert_eq!(row.severance, Some(2500.0));
/// assert_eq!(row.total, Some(3000.0));
/// ```
pub fn correct_summary_shift(row: &mut LedgerRow) -> Option<ShiftReport> {
    if !row.is_summary {
        return None;
    }

    let complete = row.employee_contribution.is_some()
        && row.employer_contribution.is_some()
        && row.severance.is_some()
        && row.total.is_some();

    let outcome = if complete {
        let mut slots = [
            row.employee_contribution,
            row.employer_contribution,
            row.severance,
            row.total,
        ];
        let from = rotate_max_to_end(&mut slots);
        [
            row.employee_contribution,
            row.employer_contribution,
            row.severance,
            row.total,
        ] = slots;
        match from {
            Some(from) if from < 3 => ShiftOutcome::Rotated { from },
            _ => ShiftOutcome::Unchanged,
        }
    } else {
        row.severance.get_or_insert(0.0);
        let mut slots = [row.employee_contribution, row.employer_contribution, row.total];
        let from = rotate_max_to_end(&mut slots);
        [row.employee_contribution, row.employer_contribution, row.total] = slots;
        match from {
            Some(from) if from < 2 => ShiftOutcome::Reduced { from },
            _ => ShiftOutcome::Unchanged,
        }
    };

    let report = ShiftReport {
        outcome,
        confidence: confidence(row),
    };
    match (report.outcome, report.confidence) {
        (_, ShiftConfidence::Low) => {
            log::warn!("Ledger summary corrected with low confidence: {:?}", report.outcome)
        },
        (ShiftOutcome::Unchanged, _) => {},
        (outcome, _) => log::debug!("Ledger summary corrected: {:?}", outcome),
    }
    row.shift = Some(report);
    Some(report)
}
