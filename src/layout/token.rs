//! Positioned text tokens.
//!
//! A [`Token`] is the unit handed over by the document parser: a piece of
//! text, its bounding box and the page it sits on. Tokens are immutable once
//! built; every later stage borrows or clones them.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::{Point, Rect};

/// A single positioned text unit extracted from a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TokenRecord", into = "TokenRecord")]
pub struct Token {
    text: String,
    bbox: Rect,
    page: usize,
}

impl Token {
    /// Create a token from its text, bounding box and page index.
    pub fn new(text: impl Into<String>, bbox: Rect, page: usize) -> Self {
        Self {
            text: text.into(),
            bbox,
            page,
        }
    }

    /// Create a token from `(x0, y0, x1, y1)` corner coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use spatial_tables::layout::Token;
    ///
    /// let token = Token::from_corners("1,250.00", 400.0, 100.0, 450.0, 110.0, 0);
    /// assert_eq!(token.center().y, 105.0);
    /// ```
    pub fn from_corners(
        text: impl Into<String>,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        page: usize,
    ) -> Self {
        Self::new(text, Rect::from_points(x0, y0, x1, y1), page)
    }

    /// The token text as extracted.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Bounding box in page space.
    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    /// Zero-based page index.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Point {
        self.bbox.center()
    }

    /// Whether the token carries any visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Wire form of a token: `{ "text": ..., "bbox": [x0, y0, x1, y1], "page": n }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenRecord {
    pub(crate) text: String,
    pub(crate) bbox: [f32; 4],
    #[serde(default)]
    pub(crate) page: usize,
}

impl TokenRecord {
    /// Validate and convert, reporting `index` on failure.
    pub(crate) fn into_token(self, index: usize) -> Result<Token, Error> {
        let [x0, y0, x1, y1] = self.bbox;
        let bbox = Rect::from_points(x0, y0, x1, y1);
        if !bbox.is_well_formed() {
            return Err(Error::InvalidToken {
                index,
                reason: format!("malformed bounding box {:?} for {:?}", self.bbox, self.text),
            });
        }
        Ok(Token::new(self.text, bbox, self.page))
    }
}

impl TryFrom<TokenRecord> for Token {
    type Error = Error;

    fn try_from(record: TokenRecord) -> Result<Self, Self::Error> {
        record.into_token(0)
    }
}

impl From<Token> for TokenRecord {
    fn from(token: Token) -> Self {
        let b = token.bbox;
        Self {
            text: token.text,
            bbox: [b.left(), b.top(), b.right(), b.bottom()],
            page: token.page,
        }
    }
}
