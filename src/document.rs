//! Token document model: the crate's input format.
//!
//! A token document is JSON, either a bare array of tokens or an object
//! that also carries the employer name found in the document header:
//!
//! ```json
//! { "header_employer": "Acme Ltd",
//!   "tokens": [ { "text": "1,250.00", "bbox": [400, 100, 450, 110], "page": 0 } ] }
//! ```
//!
//! Bounding boxes are `[x0, y0, x1, y1]` with the vertical axis growing
//! downward.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::layout::token::TokenRecord;
use crate::layout::Token;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Tokens(Vec<TokenRecord>),
    Object {
        tokens: Vec<TokenRecord>,
        #[serde(default)]
        header_employer: Option<String>,
    },
}

/// All tokens of one document plus optional header metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenDocument {
    /// Tokens in any order
    pub tokens: Vec<Token>,
    /// Employer name from the document header, used when ledger rows omit one
    pub header_employer: Option<String>,
}

impl TokenDocument {
    /// Create a document from tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            header_employer: None,
        }
    }

    /// Set the header employer.
    pub fn with_header_employer(mut self, employer: impl Into<String>) -> Self {
        self.header_employer = Some(employer.into());
        self
    }

    /// Parse a token document from JSON.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] for malformed JSON, [`Error::InvalidToken`] for a token
    /// with a non-finite or inverted bounding box.
    ///
    /// # Examples
    ///
    /// ```
    /// use spatial_tables::document::TokenDocument;
    ///
    /// let doc = TokenDocument::from_json_str(
    ///     r#"[{"text": "סה״כ", "bbox": [10, 20, 40, 30], "page": 1}]"#,
    /// )?;
    /// assert_eq!(doc.tokens.len(), 1);
    /// assert_eq!(doc.tokens[0].page(), 1);
    /// # Ok::<(), spatial_tables::error::Error>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let (records, header_employer) = match serde_json::from_str::<RawDocument>(json)? {
            RawDocument::Tokens(tokens) => (tokens, None),
            RawDocument::Object {
                tokens,
                header_employer,
            } => (tokens, header_employer),
        };

        let tokens = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_token(index))
            .collect::<Result<Vec<_>>>()?;

        let header_employer = header_employer
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        log::debug!(
            "Loaded {} tokens (header employer: {:?})",
            tokens.len(),
            header_employer
        );
        Ok(Self {
            tokens,
            header_employer,
        })
    }

    /// Load a token document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json).map_err(|e| match e {
            Error::InvalidToken { index, reason } => Error::InvalidToken {
                index,
                reason: format!("{} (in {})", reason, path.display()),
            },
            other => other,
        })
    }

    /// Number of pages spanned by the tokens.
    pub fn page_count(&self) -> usize {
        self.tokens.iter().map(|t| t.page() + 1).max().unwrap_or(0)
    }
}
