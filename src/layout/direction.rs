//! Declared reading direction of a document.

use serde::{Deserialize, Serialize};

use crate::text::bidi::is_rtl_char;

/// Reading direction used to order tokens within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDirection {
    /// Latin-style reading: the first token is the leftmost one.
    #[default]
    LeftToRight,
    /// Hebrew/Arabic reading: the first token is the rightmost one.
    RightToLeft,
}

impl TextDirection {
    /// Detect the dominant direction from a text sample.
    ///
    /// A document is right-to-left when more than 20% of its letters come from
    /// a right-to-left script. Digits and punctuation are ignored since
    /// financial statements are mostly numbers.
    ///
    /// # Examples
    ///
    /// ```
    /// use spatial_tables::layout::TextDirection;
    ///
    /// assert_eq!(TextDirection::detect_from_sample("פירוט הפקדות 2024"), TextDirection::RightToLeft);
    /// assert_eq!(TextDirection::detect_from_sample("Deposit details 2024"), TextDirection::LeftToRight);
    /// ```
    pub fn detect_from_sample(sample: &str) -> Self {
        let letters = sample.chars().filter(|c| c.is_alphabetic()).count();
        if letters == 0 {
            return Self::LeftToRight;
        }

        let rtl = sample.chars().filter(|c| is_rtl_char(*c)).count();
        if rtl as f32 / letters as f32 > 0.2 {
            Self::RightToLeft
        } else {
            Self::LeftToRight
        }
    }

    /// Whether this is right-to-left.
    pub fn is_rtl(&self) -> bool {
        matches!(self, Self::RightToLeft)
    }
}
