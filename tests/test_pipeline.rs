//! Integration tests for the table reconstruction pipeline.
//!
//! These tests build mock token grids simulating realistic pension
//! statements (right-to-left Hebrew, multi-column pages, missing tables) and
//! run them through the complete pipeline.

use chrono::NaiveDate;
use spatial_tables::document::TokenDocument;
use spatial_tables::extractors::{LedgerRow, Row, ShiftConfidence, ShiftOutcome};
use spatial_tables::layout::{SectionId, TextDirection, Token};
use spatial_tables::pipeline::{PipelineConfig, TablePipeline, ValidationStatus};

// ============================================================================
// Helper Functions for Creating Mock Data
// ============================================================================

const CELL_WIDTH: f32 = 50.0;
const CELL_PITCH: f32 = 70.0;
const RIGHT_EDGE: f32 = 560.0;

/// Lay out cells right to left, starting at the right margin.
fn rtl_row(cells: &[&str], y: f32, page: usize) -> Vec<Token> {
    cells
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let x1 = RIGHT_EDGE - i as f32 * CELL_PITCH;
            Token::from_corners(*text, x1 - CELL_WIDTH, y, x1, y + 10.0, page)
        })
        .collect()
}

/// A full-width section title.
fn title(text: &str, y: f32, page: usize) -> Vec<Token> {
    vec![Token::from_corners(text, 40.0, y, RIGHT_EDGE, y + 10.0, page)]
}

/// A complete right-to-left statement with all five tables.
fn hebrew_statement() -> Vec<Token> {
    let rows: Vec<Vec<Token>> = vec![
        title("דוח שנתי לעמית", 20.0, 0),
        title("תשלומים צפויים", 50.0, 0),
        rtl_row(&["קצבת זקנה", "4,200"], 70.0, 0),
        rtl_row(&["קצבת שארים", "2,800"], 90.0, 0),
        title("תנועות בקרן", 120.0, 0),
        rtl_row(&["יתרה לתחילת השנה", "150,000"], 140.0, 0),
        rtl_row(&["הפקדות", "4,160"], 160.0, 0),
        rtl_row(&["דמי ניהול", "350-"], 180.0, 0),
        title("דמי ניהול והוצאות", 210.0, 0),
        rtl_row(&["דמי ניהול מהפקדה", "1.49%"], 230.0, 0),
        rtl_row(&["דמי ניהול מצבירה", "0.22%"], 250.0, 0),
        title("מסלולי השקעה", 280.0, 0),
        rtl_row(&["מסלול מניות"], 300.0, 0),
        rtl_row(&["עולמי", "12.5%"], 320.0, 0),
        rtl_row(&["מסלול כללי", "7.1%"], 340.0, 0),
        title("פירוט הפקדות", 20.0, 1),
        rtl_row(
            &[
                "שם המעסיק",
                "מועד",
                "חודש שכר",
                "שכר",
                "תגמולי עובד",
                "תגמולי מעסיק",
                "פיצויים",
                "סה\"כ",
            ],
            40.0,
            1,
        ),
        rtl_row(
            &["אקמה בע\"מ", "10/02/2024", "01/2024", "10,000", "600", "650", "830", "2,080"],
            60.0,
            1,
        ),
        rtl_row(
            &["10/03/2024", "02/2024", "10,000", "600", "650", "830", "2,080"],
            80.0,
            1,
        ),
        rtl_row(&["סה\"כ", "20,000", "1,200", "1,300", "1,660", "4,160"], 100.0, 1),
    ];
    rows.into_iter().flatten().collect()
}

fn descriptions(rows: &[Row]) -> Vec<&str> {
    rows.iter().filter_map(Row::description).collect()
}

fn ledger(rows: &[Row]) -> Vec<&LedgerRow> {
    rows.iter().filter_map(Row::as_ledger).collect()
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_full_hebrew_statement() {
    let tables = TablePipeline::new().process(hebrew_statement(), Some("מעסיק מהכותרת"));

    assert_eq!(tables.direction, TextDirection::RightToLeft);
    assert_eq!(tables.sections.len(), 5);

    // Table A
    assert_eq!(descriptions(&tables.expected_payments), vec!["קצבת זקנה", "קצבת שארים"]);
    let amounts: Vec<f64> = tables.expected_payments.iter().filter_map(Row::amount).collect();
    assert_eq!(amounts, vec![4200.0, 2800.0]);

    // Table B, trailing-minus negative
    let movements: Vec<f64> = tables.account_movements.iter().filter_map(Row::amount).collect();
    assert_eq!(movements, vec![150_000.0, 4_160.0, -350.0]);

    // Table C
    let fees: Vec<f64> = tables
        .management_fees
        .iter()
        .filter_map(Row::fee_percentage)
        .collect();
    assert_eq!(fees, vec![1.49, 0.22]);

    // Table D, wrapped track name
    match &tables.investment_tracks[..] {
        [Row::Track(first), Row::Track(second)] => {
            assert_eq!(first.track_name, "מסלול מניות עולמי");
            assert_eq!(first.return_percentage, 12.5);
            assert!(!first.conflated_with_fees);
            assert_eq!(second.track_name, "מסלול כללי");
            assert_eq!(second.return_percentage, 7.1);
        },
        other => panic!("unexpected tracks: {:?}", other),
    }

    // Table E
    let rows = ledger(&tables.deposit_ledger);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].employer.as_deref(), Some("אקמה בע\"מ"));
    assert_eq!(rows[0].deposit_date, NaiveDate::from_ymd_opt(2024, 2, 10));
    assert_eq!(rows[0].salary_month.as_deref(), Some("01/2024"));
    assert_eq!(rows[0].salary, Some(10_000.0));
    assert_eq!(rows[0].total, Some(2_080.0));
    assert_eq!(rows[1].employer.as_deref(), Some("מעסיק מהכותרת"));

    let summary = rows[2];
    assert!(summary.is_summary);
    assert_eq!(summary.total, Some(4_160.0));
    assert_eq!(summary.severance, Some(1_660.0));
    assert_eq!(summary.employer_contribution, Some(1_300.0));
    assert_eq!(summary.employee_contribution, Some(1_200.0));
    assert_eq!(summary.salary, Some(20_000.0));
    let shift = summary.shift.unwrap();
    assert_eq!(shift.outcome, ShiftOutcome::Unchanged);
    assert_eq!(shift.confidence, ShiftConfidence::High);

    // Cross-validation
    assert_eq!(tables.validation.status, ValidationStatus::Match);
    assert_eq!(tables.validation.b_value, Some(4_160.0));
    assert_eq!(tables.validation.e_value, Some(4_160.0));
}

#[test]
fn test_sections_have_distinct_starts() {
    let tables = TablePipeline::new().process(hebrew_statement(), None);
    let sections = &tables.sections;
    assert_eq!(sections.len(), 5);

    for (i, a) in sections.iter().enumerate() {
        for b in &sections[i + 1..] {
            assert!(a.start.is_before(&b.start), "{:?} and {:?} overlap", a.id, b.id);
        }
    }

    let ids: Vec<SectionId> = sections.iter().map(|s| s.id).collect();
    assert_eq!(ids, SectionId::ALL.to_vec());
    assert_eq!(sections[3].end, Some(sections[4].start));
}

#[test]
fn test_input_order_does_not_change_result() {
    let tokens = hebrew_statement();
    let mut reversed = tokens.clone();
    reversed.reverse();

    let pipeline = TablePipeline::new();
    assert_eq!(pipeline.process(tokens, None), pipeline.process(reversed, None));
}

// ============================================================================
// Multi-column layout
// ============================================================================

#[test]
fn test_side_by_side_fee_and_track_tables() {
    let cell =
        |text: &str, x0: f32, x1: f32, y: f32| Token::from_corners(text, x0, y, x1, y + 10.0, 0);
    let tokens = vec![
        // Right column: fees. Left column: tracks.
        cell("דמי ניהול והוצאות", 330.0, 560.0, 0.0),
        cell("מסלולי השקעה", 20.0, 250.0, 0.0),
        cell("דמי ניהול מהפקדה", 430.0, 560.0, 20.0),
        cell("1.49%", 330.0, 380.0, 20.0),
        cell("מסלול מניות", 120.0, 250.0, 20.0),
        cell("12.5%", 20.0, 70.0, 20.0),
        cell("דמי ניהול מצבירה", 430.0, 560.0, 40.0),
        cell("0.22%", 330.0, 380.0, 40.0),
        cell("מסלול אג\"ח", 120.0, 250.0, 40.0),
        cell("3.4%", 20.0, 70.0, 40.0),
        // Full-width ledger below both columns
        cell("פירוט הפקדות", 20.0, 560.0, 80.0),
        cell("סה\"כ", 430.0, 560.0, 100.0),
        cell("300", 330.0, 380.0, 100.0),
        cell("200", 230.0, 280.0, 100.0),
        cell("100", 120.0, 170.0, 100.0),
    ];

    let tables = TablePipeline::new().process(tokens, None);

    let fees = tables.section(SectionId::ManagementFees).unwrap();
    let tracks = tables.section(SectionId::InvestmentTracks).unwrap();
    assert!(fees.x_band.is_some());
    assert!(tracks.x_band.is_some());
    let ledger_start = tables.section(SectionId::DepositLedger).unwrap().start;
    assert_eq!(fees.end, Some(ledger_start));
    assert_eq!(tracks.end, Some(ledger_start));

    assert_eq!(
        descriptions(&tables.management_fees),
        vec!["דמי ניהול מהפקדה", "דמי ניהול מצבירה"]
    );
    assert_eq!(descriptions(&tables.investment_tracks), vec!["מסלול מניות", "מסלול אג\"ח"]);
    assert_eq!(tables.deposit_ledger.len(), 1);
}

// ============================================================================
// Page breaks
// ============================================================================

#[test]
fn test_wrapped_labels_carry_over_page_breaks() {
    let rows: Vec<Vec<Token>> = vec![
        title("מסלולי השקעה", 20.0, 0),
        rtl_row(&["מסלול כללי", "7.1%"], 40.0, 0),
        // Track name at the bottom of page 0, its return at the top of page 1
        rtl_row(&["מסלול מניות"], 760.0, 0),
        rtl_row(&["עולמי", "12.5%"], 20.0, 1),
        title("פירוט הפקדות", 60.0, 1),
        rtl_row(
            &["אקמה בע\"מ", "10/02/2024", "01/2024", "10,000", "600", "650", "830", "2,080"],
            80.0,
            1,
        ),
        // Employer at the bottom of page 1, its deposit at the top of page 2
        rtl_row(&["גלובקס בע\"מ"], 760.0, 1),
        rtl_row(
            &["10/03/2024", "02/2024", "10,000", "600", "650", "830", "2,080"],
            20.0,
            2,
        ),
        rtl_row(&["סה\"כ", "20,000", "1,200", "1,300", "1,660", "4,160"], 40.0, 2),
    ];
    let tokens: Vec<Token> = rows.into_iter().flatten().collect();

    let tables = TablePipeline::new().process(tokens, Some("מעסיק מהכותרת"));
    assert_eq!(tables.direction, TextDirection::RightToLeft);

    assert_eq!(
        descriptions(&tables.investment_tracks),
        vec!["מסלול כללי", "מסלול מניות עולמי"]
    );

    let rows = ledger(&tables.deposit_ledger);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].employer.as_deref(), Some("אקמה בע\"מ"));
    assert_eq!(rows[1].employer.as_deref(), Some("גלובקס בע\"מ"));
    assert_eq!(rows[1].deposit_date, NaiveDate::from_ymd_opt(2024, 3, 10));
    assert!(rows[2].is_summary);
    assert_eq!(rows[2].total, Some(4_160.0));
}

#[test]
fn test_ledger_placeholder_dash_through_pipeline() {
    let rows: Vec<Vec<Token>> = vec![
        title("פירוט הפקדות", 20.0, 0),
        rtl_row(
            &["אקמה בע\"מ", "10/02/2024", "01/2024", "12,000", "700", "750", "-", "1,450"],
            40.0,
            0,
        ),
        rtl_row(&["סה\"כ", "12,000", "700", "750", "-", "1,450"], 60.0, 0),
    ];
    let tokens: Vec<Token> = rows.into_iter().flatten().collect();

    let tables = TablePipeline::new().process(tokens, None);
    let rows = ledger(&tables.deposit_ledger);
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].salary, Some(12_000.0));
    assert_eq!(rows[0].severance, None);
    assert_eq!(rows[0].total, Some(1_450.0));

    let summary = rows[1];
    assert_eq!(summary.total, Some(1_450.0));
    assert_eq!(summary.employer_contribution, Some(750.0));
    assert_eq!(summary.employee_contribution, Some(700.0));
    // Empty severance is zero-filled by shift correction, nothing moves
    assert_eq!(summary.severance, Some(0.0));
    let shift = summary.shift.unwrap();
    assert_eq!(shift.outcome, ShiftOutcome::Unchanged);
    assert_eq!(shift.confidence, ShiftConfidence::Low);
}

// ============================================================================
// Missing and malformed input
// ============================================================================

#[test]
fn test_missing_sections_yield_empty_tables() {
    let tokens: Vec<Token> = vec![
        title("פירוט הפקדות", 20.0, 0),
        rtl_row(&["סה\"כ", "1,000", "1,500", "3,000", "5,500"], 40.0, 0),
    ]
    .into_iter()
    .flatten()
    .collect();

    let tables = TablePipeline::new().process(tokens, None);
    assert_eq!(tables.sections.len(), 1);
    assert!(tables.expected_payments.is_empty());
    assert!(tables.account_movements.is_empty());
    assert!(tables.management_fees.is_empty());
    assert!(tables.investment_tracks.is_empty());
    assert_eq!(tables.deposit_ledger.len(), 1);

    assert_eq!(tables.validation.status, ValidationStatus::Indeterminate);
    assert_eq!(tables.validation.b_value, None);
    assert_eq!(tables.validation.e_value, Some(5_500.0));
}

#[test]
fn test_empty_document_is_not_an_error() {
    let document = TokenDocument::from_json_str("[]").unwrap();
    let tables = TablePipeline::new().process_document(document);
    assert_eq!(tables.row_count(), 0);
    assert_eq!(tables.validation.status, ValidationStatus::Indeterminate);
}

#[test]
fn test_blank_tokens_only() {
    let tokens = vec![
        Token::from_corners(" ", 0.0, 0.0, 10.0, 10.0, 0),
        Token::from_corners("", 0.0, 20.0, 10.0, 30.0, 0),
    ];
    let tables = TablePipeline::new().process(tokens, None);
    assert_eq!(tables.row_count(), 0);
    assert!(tables.sections.is_empty());
}

#[test]
fn test_forced_direction() {
    let config = PipelineConfig::new().with_direction(TextDirection::LeftToRight);
    let tables = TablePipeline::with_config(config).process(hebrew_statement(), None);
    assert_eq!(tables.direction, TextDirection::LeftToRight);
    // Keywords still match, and amounts do not depend on token order
    assert_eq!(tables.sections.len(), 5);
}
