//! Line clustering: tokens → horizontal text lines.
//!
//! Tokens are sorted by page, vertical center and horizontal position, then
//! walked in that order. A token joins the current line while its vertical
//! center stays within `y_tolerance` of the line's *running average* center,
//! which tolerates gradual baseline drift across long table rows. Once a
//! line is closed its tokens are re-ordered for the reading direction.

use std::cmp::Ordering;
use std::fmt::Write;

use serde::Serialize;

use crate::geometry::{Rect, XBand};
use crate::layout::direction::TextDirection;
use crate::layout::token::Token;
use crate::utils::safe_float_cmp;

/// A horizontal cluster of tokens inferred to belong to the same printed row.
///
/// Lines are never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    tokens: Vec<Token>,
    y_center: f32,
    page: usize,
}

impl Line {
    /// Build a line from tokens already in reading order.
    ///
    /// Returns `None` for an empty token list.
    fn from_ordered(tokens: Vec<Token>) -> Option<Self> {
        let first = tokens.first()?;
        let page = first.page();
        let y_center = tokens.iter().map(|t| t.center().y).sum::<f32>() / tokens.len() as f32;
        Some(Self {
            tokens,
            y_center,
            page,
        })
    }

    /// Tokens in reading order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Average vertical center of the tokens.
    pub fn y_center(&self) -> f32 {
        self.y_center
    }

    /// Zero-based page index.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Token texts joined with single spaces, in reading order.
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text().trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Bounding box covering every token of the line.
    pub fn bbox(&self) -> Rect {
        let mut bbox = self.tokens[0].bbox();
        for token in &self.tokens[1..] {
            bbox = bbox.union(&token.bbox());
        }
        bbox
    }

    /// Height of the line's bounding box.
    pub fn height(&self) -> f32 {
        self.bbox().height
    }

    /// Split the line into horizontal clusters separated by gaps wider than `gap`.
    ///
    /// Clusters keep the line's reading order. In a multi-column layout, a
    /// single y-clustered line may hold the cells of two columns; splitting at
    /// the gutter separates them.
    pub fn split_at_gaps(&self, gap: f32) -> Vec<Line> {
        let mut clusters: Vec<Vec<Token>> = vec![];
        let mut previous: Option<XBand> = None;

        for token in &self.tokens {
            let band = token.bbox().x_band();
            let starts_new = match previous {
                Some(prev) => horizontal_gap(&prev, &band) > gap,
                None => true,
            };
            if starts_new {
                clusters.push(vec![token.clone()]);
            } else if let Some(current) = clusters.last_mut() {
                current.push(token.clone());
            }
            previous = Some(band);
        }

        clusters.into_iter().filter_map(Line::from_ordered).collect()
    }

    /// Keep only tokens whose horizontal center lies inside `band`.
    ///
    /// Returns `None` when nothing remains.
    pub fn restrict_to_band(&self, band: &XBand) -> Option<Line> {
        let kept: Vec<Token> = self
            .tokens
            .iter()
            .filter(|t| band.contains(t.center().x))
            .cloned()
            .collect();
        Line::from_ordered(kept)
    }
}

/// Whitespace between two horizontal bands (negative when they overlap).
fn horizontal_gap(a: &XBand, b: &XBand) -> f32 {
    a.left.max(b.left) - a.right.min(b.right)
}

/// Deterministic total order used before the clustering walk.
fn document_order(a: &Token, b: &Token) -> Ordering {
    a.page()
        .cmp(&b.page())
        .then_with(|| safe_float_cmp(a.center().y, b.center().y))
        .then_with(|| safe_float_cmp(a.bbox().left(), b.bbox().left()))
        .then_with(|| safe_float_cmp(a.bbox().right(), b.bbox().right()))
        .then_with(|| a.text().cmp(b.text()))
}

/// Order tokens of one line for the reading direction.
fn reading_order(tokens: &mut [Token], direction: TextDirection) {
    tokens.sort_by(|a, b| {
        let by_x = safe_float_cmp(a.center().x, b.center().x);
        let by_x = if direction.is_rtl() { by_x.reverse() } else { by_x };
        by_x.then_with(|| a.text().cmp(b.text()))
    });
}

/// Group tokens into lines.
///
/// # Arguments
///
/// * `tokens` - All tokens of one document, in any order
/// * `y_tolerance` - Maximum distance between a token's vertical center and
///   the running average center of the current line
/// * `direction` - Reading direction used to order tokens within each line
///
/// # Returns
///
/// Lines ordered by page, then top to bottom. Blank tokens are dropped and
/// empty lines are never emitted. The result does not depend on the input
/// order of the tokens.
///
/// # Examples
///
/// ```
/// use spatial_tables::layout::{cluster_tokens_into_lines, TextDirection, Token};
///
/// let tokens = vec![
///     Token::from_corners("World", 60.0, 101.0, 100.0, 111.0, 0),
///     Token::from_corners("Hello", 10.0, 100.0, 50.0, 110.0, 0),
///     Token::from_corners("Next", 10.0, 130.0, 40.0, 140.0, 0),
/// ];
///
/// let lines = cluster_tokens_into_lines(tokens, 3.0, TextDirection::LeftToRight);
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[0].text(), "Hello World");
/// ```
pub fn cluster_tokens_into_lines(
    tokens: Vec<Token>,
    y_tolerance: f32,
    direction: TextDirection,
) -> Vec<Line> {
    let mut tokens: Vec<Token> = tokens.into_iter().filter(|t| !t.is_blank()).collect();
    tokens.sort_by(document_order);

    let mut lines = vec![];
    let mut current: Vec<Token> = vec![];
    let mut running_y = 0.0f32;

    for token in tokens {
        let y = token.center().y;
        let joins_current = match current.first() {
            Some(first) => first.page() == token.page() && (y - running_y).abs() <= y_tolerance,
            None => false,
        };

        if joins_current {
            current.push(token);
            running_y += (y - running_y) / current.len() as f32;
        } else {
            if !current.is_empty() {
                lines.extend(close_line(std::mem::take(&mut current), direction));
            }
            running_y = y;
            current.push(token);
        }
    }
    if !current.is_empty() {
        lines.extend(close_line(current, direction));
    }

    log::debug!("Clustered tokens into {} lines ({:?})", lines.len(), direction);
    lines
}

fn close_line(mut tokens: Vec<Token>, direction: TextDirection) -> Option<Line> {
    reading_order(&mut tokens, direction);
    Line::from_ordered(tokens)
}

/// Render lines as plain text, one block per page headed `=== PAGE n ===`.
///
/// Page numbers are shown one-based. Intended for debugging extraction.
pub fn render_lines(lines: &[Line]) -> String {
    let mut out = String::new();
    let mut page = None;
    for line in lines {
        if page != Some(line.page()) {
            page = Some(line.page());
            let _ = writeln!(out, "=== PAGE {} ===", line.page() + 1);
        }
        let _ = writeln!(out, "{}", line.text());
    }
    out
}
