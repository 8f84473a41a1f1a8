//! Section segmentation: lines → the five known table regions.
//!
//! Each table starts at a header line recognised by keyword. The segmenter
//! scans lines in document order; the first cluster matching an anchor set
//! fixes that section's start. A section runs until the next section that
//! starts after it. When the header is narrow compared to the page (a
//! multi-column layout), the section is restricted to the header's column
//! and only ends at a later section whose horizontal band overlaps it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::XBand;
use crate::layout::line_clusterer::Line;
use crate::pipeline::config::SectionConfig;
use crate::text::bidi::find_keyword;

/// The five table schemas recognised in a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    /// Table A: expected future payments
    ExpectedPayments,
    /// Table B: movements in the account over the period
    AccountMovements,
    /// Table C: management fees and expenses
    ManagementFees,
    /// Table D: investment tracks and their returns
    InvestmentTracks,
    /// Table E: monthly deposit ledger
    DepositLedger,
}

impl SectionId {
    /// All sections in canonical (A..E) order.
    pub const ALL: [SectionId; 5] = [
        SectionId::ExpectedPayments,
        SectionId::AccountMovements,
        SectionId::ManagementFees,
        SectionId::InvestmentTracks,
        SectionId::DepositLedger,
    ];

    /// Single-letter table label.
    pub fn letter(&self) -> char {
        match self {
            SectionId::ExpectedPayments => 'A',
            SectionId::AccountMovements => 'B',
            SectionId::ManagementFees => 'C',
            SectionId::InvestmentTracks => 'D',
            SectionId::DepositLedger => 'E',
        }
    }

    /// Bilingual display title.
    pub fn title(&self) -> &'static str {
        match self {
            SectionId::ExpectedPayments => "Table A: תשלומים צפויים (Expected Payments)",
            SectionId::AccountMovements => "Table B: תנועות בקרן (Account Movements)",
            SectionId::ManagementFees => "Table C: דמי ניהול והוצאות (Management Fees)",
            SectionId::InvestmentTracks => "Table D: מסלולי השקעה ותשואות (Investment Tracks & Returns)",
            SectionId::DepositLedger => "Table E: פירוט הפקדות (Monthly Deposit Details)",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table_{}", self.letter().to_ascii_lowercase())
    }
}

/// Keyword lists locating each section's header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorSet {
    /// Table A keywords
    pub expected_payments: Vec<String>,
    /// Table B keywords
    pub account_movements: Vec<String>,
    /// Table C keywords
    pub management_fees: Vec<String>,
    /// Table D keywords
    pub investment_tracks: Vec<String>,
    /// Table E keywords
    pub deposit_ledger: Vec<String>,
}

impl AnchorSet {
    /// Keywords for one section.
    pub fn keywords(&self, id: SectionId) -> &[String] {
        match id {
            SectionId::ExpectedPayments => &self.expected_payments,
            SectionId::AccountMovements => &self.account_movements,
            SectionId::ManagementFees => &self.management_fees,
            SectionId::InvestmentTracks => &self.investment_tracks,
            SectionId::DepositLedger => &self.deposit_ledger,
        }
    }
}

impl Default for AnchorSet {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            expected_payments: list(&["תשלומים צפויים", "expected payments"]),
            account_movements: list(&["תנועות בקרן", "תנועות בחשבון", "account movements"]),
            management_fees: list(&["דמי ניהול והוצאות", "שיעור דמי ניהול", "management fees"]),
            investment_tracks: list(&["מסלולי השקעה", "מסלול השקעה", "investment tracks"]),
            deposit_ledger: list(&["פירוט הפקדות", "הפקדות חודשיות", "deposit details"]),
        }
    }
}

/// A position in reading order: page first, then vertical coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DocPosition {
    /// Zero-based page index
    pub page: usize,
    /// Vertical coordinate on that page
    pub y: f32,
}

impl DocPosition {
    /// Whether `self` comes strictly before `other` in the document.
    pub fn is_before(&self, other: &DocPosition) -> bool {
        self.page < other.page || (self.page == other.page && self.y < other.y)
    }
}

/// The extent of one logical table within the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Which table this is
    pub id: SectionId,
    /// Position of the header line
    pub start: DocPosition,
    /// Start of the section that ends this one; `None` runs to the end of the document
    pub end: Option<DocPosition>,
    /// Column band when the section is bounded to one column
    pub x_band: Option<XBand>,
    /// The keyword that matched the header
    pub anchor: String,
}

impl Section {
    /// Check whether a line position lies inside the section's vertical range.
    ///
    /// The header line itself is excluded.
    pub fn contains(&self, position: &DocPosition) -> bool {
        self.start.is_before(position) && self.end.map_or(true, |end| position.is_before(&end))
    }

    /// Pages touched by the section, given the document's last page.
    pub fn page_range(&self, last_page: usize) -> std::ops::RangeInclusive<usize> {
        let end_page = self.end.map_or(last_page, |end| end.page);
        self.start.page..=end_page.max(self.start.page)
    }

    /// Lines belonging to this section.
    ///
    /// For column-scoped sections, tokens outside the band are dropped and
    /// lines left empty are skipped.
    pub fn select_lines(&self, lines: &[Line]) -> Vec<Line> {
        lines
            .iter()
            .filter(|line| {
                self.contains(&DocPosition {
                    page: line.page(),
                    y: line.y_center(),
                })
            })
            .filter_map(|line| match &self.x_band {
                Some(band) => line.restrict_to_band(band),
                None => Some(line.clone()),
            })
            .collect()
    }
}

/// Horizontal extent of all text on each page.
fn page_extents(lines: &[Line]) -> BTreeMap<usize, XBand> {
    let mut extents: BTreeMap<usize, XBand> = BTreeMap::new();
    for line in lines {
        let band = line.bbox().x_band();
        extents
            .entry(line.page())
            .and_modify(|extent| *extent = extent.union(&band))
            .or_insert(band);
    }
    extents
}

/// Column band around a narrow header cluster.
///
/// The band extends from the header outward to the middle of the gutter
/// separating it from the nearest neighbouring cluster on the same line, or
/// to the page's text extent when there is no neighbour on that side.
fn column_band(header: &XBand, clusters: &[XBand], extent: &XBand) -> XBand {
    let left = clusters
        .iter()
        .filter(|c| c.right <= header.left)
        .map(|c| c.right)
        .fold(None, |acc: Option<f32>, r| Some(acc.map_or(r, |a| a.max(r))))
        .map_or(extent.left, |neighbour| (neighbour + header.left) / 2.0);

    let right = clusters
        .iter()
        .filter(|c| c.left >= header.right)
        .map(|c| c.left)
        .fold(None, |acc: Option<f32>, l| Some(acc.map_or(l, |a| a.min(l))))
        .map_or(extent.right, |neighbour| (header.right + neighbour) / 2.0);

    XBand::new(left, right)
}

/// Locate the five sections in a document.
///
/// # Arguments
///
/// * `lines` - All lines of the document in reading order
/// * `config` - Anchors and column-scoping thresholds
///
/// # Returns
///
/// At most one [`Section`] per [`SectionId`], sorted by start position.
/// Sections whose anchor never appears are simply absent.
pub fn segment_sections(lines: &[Line], config: &SectionConfig) -> Vec<Section> {
    let extents = page_extents(lines);
    let mut found: Vec<Section> = vec![];

    for line in lines {
        let clusters = line.split_at_gaps(config.column_gap);
        let bands: Vec<XBand> = clusters.iter().map(|c| c.bbox().x_band()).collect();
        let mut claimed = vec![false; clusters.len()];
        let mut line_claimed = false;

        for id in SectionId::ALL {
            if found.iter().any(|s| s.id == id) {
                continue;
            }
            let keywords = config.anchors.keywords(id);

            // Prefer a single cluster; fall back to the whole line when the
            // keyword spans a gap.
            let hit = clusters
                .iter()
                .enumerate()
                .filter(|(i, _)| !claimed[*i])
                .find_map(|(i, cluster)| {
                    find_keyword(&cluster.text(), keywords).map(|kw| (Some(i), kw))
                })
                .or_else(|| {
                    if line_claimed || claimed.iter().any(|c| *c) {
                        None
                    } else {
                        find_keyword(&line.text(), keywords).map(|kw| (None, kw))
                    }
                });

            let Some((cluster_index, keyword)) = hit else {
                continue;
            };

            let header = match cluster_index {
                Some(i) => {
                    claimed[i] = true;
                    bands[i]
                },
                None => {
                    line_claimed = true;
                    claimed.iter_mut().for_each(|c| *c = true);
                    line.bbox().x_band()
                },
            };

            let x_band = extents.get(&line.page()).and_then(|extent| {
                if header.width() < config.column_scope_ratio * extent.width() {
                    Some(column_band(&header, &bands, extent))
                } else {
                    None
                }
            });

            log::debug!(
                "Section {} anchored by {:?} on page {} at y={:.1} (band: {:?})",
                id,
                keyword,
                line.page(),
                line.y_center(),
                x_band
            );

            found.push(Section {
                id,
                start: DocPosition {
                    page: line.page(),
                    y: line.y_center(),
                },
                end: None,
                x_band,
                anchor: keyword.to_string(),
            });
        }
    }

    let ends: Vec<Option<DocPosition>> = found
        .iter()
        .map(|section| section_end(section, &found, &extents))
        .collect();
    for (section, end) in found.iter_mut().zip(ends) {
        section.end = end;
    }

    found.sort_by(|a, b| {
        a.start
            .page
            .cmp(&b.start.page)
            .then_with(|| crate::utils::safe_float_cmp(a.start.y, b.start.y))
            .then_with(|| a.id.cmp(&b.id))
    });

    for id in SectionId::ALL {
        if !found.iter().any(|s| s.id == id) {
            log::debug!("Section {} not found", id);
        }
    }

    found
}

/// The start of the first later section that closes `section`.
fn section_end(
    section: &Section,
    all: &[Section],
    extents: &BTreeMap<usize, XBand>,
) -> Option<DocPosition> {
    all.iter()
        .filter(|other| other.id != section.id && section.start.is_before(&other.start))
        .filter(|other| match &section.x_band {
            None => true,
            Some(band) => {
                let other_band = other
                    .x_band
                    .or_else(|| extents.get(&other.start.page).copied());
                other_band.map_or(true, |b| b.overlaps(band))
            },
        })
        .map(|other| other.start)
        .fold(None, |earliest: Option<DocPosition>, candidate| match earliest {
            Some(e) if e.is_before(&candidate) => Some(e),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{cluster_tokens_into_lines, TextDirection, Token};

    fn tok(text: &str, x0: f32, x1: f32, y: f32, page: usize) -> Token {
        Token::from_corners(text, x0, y, x1, y + 10.0, page)
    }

    fn lines(tokens: Vec<Token>) -> Vec<Line> {
        cluster_tokens_into_lines(tokens, 3.0, TextDirection::LeftToRight)
    }

    #[test]
    fn test_section_labels() {
        assert_eq!(SectionId::DepositLedger.letter(), 'E');
        assert_eq!(SectionId::ManagementFees.to_string(), "table_c");
        assert!(SectionId::InvestmentTracks.title().contains("Investment Tracks"));
    }

    #[test]
    fn test_full_width_sections_chain() {
        let doc = lines(vec![
            tok("Expected payments for the insured member", 0.0, 500.0, 0.0, 0),
            tok("Old age pension", 0.0, 200.0, 20.0, 0),
            tok("4,200", 400.0, 500.0, 20.0, 0),
            tok("Account movements during the year 2024", 0.0, 500.0, 40.0, 0),
            tok("Deposits", 0.0, 200.0, 60.0, 0),
            tok("12,000", 400.0, 500.0, 60.0, 0),
        ]);

        let sections = segment_sections(&doc, &SectionConfig::default());
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].id, SectionId::ExpectedPayments);
        assert_eq!(sections[0].x_band, None);
        assert_eq!(sections[0].end, Some(sections[1].start));
        assert_eq!(sections[1].end, None);

        let a_lines = sections[0].select_lines(&doc);
        assert_eq!(a_lines.len(), 1);
        assert_eq!(a_lines[0].text(), "Old age pension 4,200");
    }

    #[test]
    fn test_reversed_anchor_found() {
        let visual: String = "פירוט הפקדות".chars().rev().collect();
        let doc = lines(vec![tok(&visual, 0.0, 500.0, 0.0, 0)]);
        let sections = segment_sections(&doc, &SectionConfig::default());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, SectionId::DepositLedger);
    }

    #[test]
    fn test_one_anchor_per_line() {
        let doc = lines(vec![tok(
            "Expected payments and account movements",
            0.0,
            500.0,
            0.0,
            0,
        )]);
        let sections = segment_sections(&doc, &SectionConfig::default());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, SectionId::ExpectedPayments);
    }

    #[test]
    fn test_two_column_headers_are_scoped() {
        let doc = lines(vec![
            tok("Management fees", 0.0, 200.0, 0.0, 0),
            tok("Investment tracks", 320.0, 520.0, 0.0, 0),
            tok("From deposits 1.5%", 0.0, 200.0, 20.0, 0),
            tok("Equity 7.1%", 320.0, 520.0, 20.0, 0),
        ]);

        let sections = segment_sections(&doc, &SectionConfig::default());
        assert_eq!(sections.len(), 2);

        let fees = sections.iter().find(|s| s.id == SectionId::ManagementFees).unwrap();
        let tracks = sections.iter().find(|s| s.id == SectionId::InvestmentTracks).unwrap();
        assert_eq!(fees.x_band, Some(XBand::new(0.0, 260.0)));
        assert_eq!(tracks.x_band, Some(XBand::new(260.0, 520.0)));
        assert_eq!(fees.end, None);

        let fee_lines = fees.select_lines(&doc);
        assert_eq!(fee_lines.len(), 1);
        assert_eq!(fee_lines[0].text(), "From deposits 1.5%");

        let track_lines = tracks.select_lines(&doc);
        assert_eq!(track_lines[0].text(), "Equity 7.1%");
    }

    #[test]
    fn test_missing_anchor_is_absent() {
        let doc = lines(vec![tok("Nothing to see here", 0.0, 300.0, 0.0, 0)]);
        assert!(segment_sections(&doc, &SectionConfig::default()).is_empty());
        assert!(segment_sections(&[], &SectionConfig::default()).is_empty());
    }

    #[test]
    fn test_section_spans_pages() {
        let doc = lines(vec![
            tok("Deposit details", 0.0, 500.0, 700.0, 0),
            tok("row on next page", 0.0, 500.0, 50.0, 1),
        ]);
        let sections = segment_sections(&doc, &SectionConfig::default());
        assert_eq!(sections[0].page_range(1), 0..=1);
        assert_eq!(sections[0].select_lines(&doc).len(), 1);
    }
}
