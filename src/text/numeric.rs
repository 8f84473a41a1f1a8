//! Numeric value normalization.
//!
//! Financial statements print negative numbers in several conventions:
//! a leading minus (`-500`), parentheses (`(500)`) and, in right-to-left
//! reports, a trailing minus or en-dash (`500-`, `500–`). Thousands are
//! separated by commas. [`normalize`] folds all of these into a signed
//! `f64`; every numeric field in the crate goes through it.
//!
//! [`looks_numeric`] and friends only *classify* tokens. They never produce
//! values.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A single numeric cell as printed: optional sign/parentheses, optional
    /// currency or percent sign on either side, digits with optional
    /// comma grouping and decimals.
    static ref RE_NUMERIC_TOKEN: Regex = Regex::new(
        r"^\(?[-–—−]?[%₪$€]?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?[%₪$€]?[-–—−]?\)?$"
    )
    .unwrap();

    /// Trailing minus, en-dash, em-dash or Unicode minus.
    static ref RE_TRAILING_DASH: Regex = Regex::new(r"[-–—−]$").unwrap();

    /// Anything that cannot be part of a plain decimal literal.
    static ref RE_NON_NUMERIC: Regex = Regex::new(r"[^0-9.\-]").unwrap();
}

/// Strings that are placeholders for "no value" in the source tables.
const SENTINELS: &[&str] = &["", "-", "–", "—", "−", ".", "n/a", "na", "nan", "none", "null"];

/// Characters used as dashes/minus signs.
const DASHES: &[char] = &['-', '–', '—', '−'];

/// Thousands separators (ASCII comma, Arabic thousands separator).
const THOUSANDS_SEPARATORS: &[char] = &[',', '\u{066C}'];

/// Convert a raw numeric-looking string into a signed value.
///
/// Rules, applied in order:
/// 1. reject placeholders (empty, lone dash, lone period, `n/a`, ...)
/// 2. strip thousands separators
/// 3. `(X)` becomes `-X`
/// 4. a trailing minus or dash moves to the front
/// 5. drop every remaining character that is not a digit, `.` or `-`
/// 6. parse, returning `None` on failure
///
/// # Examples
///
/// ```
/// use spatial_tables::text::normalize;
///
/// assert_eq!(normalize("1,234.56"), Some(1234.56));
/// assert_eq!(normalize("500-"), Some(-500.0));
/// assert_eq!(normalize("(500)"), Some(-500.0));
/// assert_eq!(normalize("500–"), Some(-500.0));
/// assert_eq!(normalize("n/a"), None);
/// ```
pub fn normalize(raw: &str) -> Option<f64> {
    let s = strip_invisible(raw);

    if SENTINELS.contains(&s.to_lowercase().as_str()) {
        return None;
    }

    let mut s: String = s.chars().filter(|c| !THOUSANDS_SEPARATORS.contains(c)).collect();

    if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        s = format!("-{}", &s[1..s.len() - 1]);
    }

    if RE_TRAILING_DASH.is_match(&s) {
        s = format!("-{}", RE_TRAILING_DASH.replace(&s, ""));
    }

    let s = s.replace(|c: char| DASHES.contains(&c), "-");
    let s = RE_NON_NUMERIC.replace_all(&s, "");

    if s.is_empty() || s == "-" || s == "." {
        return None;
    }

    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Check whether a token is a single printed numeric cell.
///
/// Dates (`01/2024`), identifiers with letters and bare punctuation are not
/// numeric.
pub fn looks_numeric(text: &str) -> bool {
    RE_NUMERIC_TOKEN.is_match(&strip_invisible(text))
}

/// Check whether a token is a numeric cell carrying its own percent sign.
pub fn looks_percentage(text: &str) -> bool {
    let s = strip_invisible(text);
    s.contains('%') && RE_NUMERIC_TOKEN.is_match(&s)
}

/// Check whether a token is a standalone minus/dash glyph.
pub fn is_dash(text: &str) -> bool {
    let s = strip_invisible(text);
    let mut chars = s.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if DASHES.contains(&c))
}

/// Check whether a token is a standalone percent sign.
pub fn is_percent_sign(text: &str) -> bool {
    strip_invisible(text) == "%"
}

/// Remove whitespace and Unicode directional formatting marks.
///
/// Right-to-left extractions frequently wrap numbers in LRM/RLM marks, which
/// would otherwise hide a trailing minus from the rules above.
fn strip_invisible(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !c.is_whitespace()
                && !matches!(
                    *c,
                    '\u{200E}' | '\u{200F}' | '\u{061C}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}'
                )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separator() {
        assert_eq!(normalize("1,234.56"), Some(1234.56));
        assert_eq!(normalize("1,234,567"), Some(1_234_567.0));
    }

    #[test]
    fn test_negative_conventions() {
        assert_eq!(normalize("-500"), Some(-500.0));
        assert_eq!(normalize("500-"), Some(-500.0));
        assert_eq!(normalize("500–"), Some(-500.0));
        assert_eq!(normalize("–500"), Some(-500.0));
        assert_eq!(normalize("(500)"), Some(-500.0));
        assert_eq!(normalize("(1,250.75)"), Some(-1250.75));
    }

    #[test]
    fn test_sentinels_are_absent() {
        for junk in ["", "-", "–", ".", "n/a", "N/A", "nan", "   "] {
            assert_eq!(normalize(junk), None, "expected absent for {:?}", junk);
        }
    }

    #[test]
    fn test_currency_and_percent_are_dropped() {
        assert_eq!(normalize("₪12,000"), Some(12000.0));
        assert_eq!(normalize("4.25%"), Some(4.25));
        assert_eq!(normalize("%0.22"), Some(0.22));
    }

    #[test]
    fn test_directional_marks_do_not_hide_trailing_minus() {
        assert_eq!(normalize("\u{200F}350.00-\u{200F}"), Some(-350.0));
    }

    #[test]
    fn test_unparseable_is_absent() {
        assert_eq!(normalize("abc"), None);
        assert_eq!(normalize("1.2.3"), None);
        assert_eq!(normalize("-500-"), None);
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("1,234.56"));
        assert!(looks_numeric("500-"));
        assert!(looks_numeric("(500)"));
        assert!(looks_numeric("4.25%"));
        assert!(looks_numeric("₪300"));
        assert!(!looks_numeric("01/2024"));
        assert!(!looks_numeric("15.01.2024"));
        assert!(!looks_numeric("מגדל"));
        assert!(!looks_numeric("-"));
        assert!(!looks_numeric("12,34"));
    }

    #[test]
    fn test_looks_percentage() {
        assert!(looks_percentage("4.25%"));
        assert!(looks_percentage("%0.5"));
        assert!(!looks_percentage("4.25"));
        assert!(!looks_percentage("%"));
    }

    #[test]
    fn test_is_dash() {
        assert!(is_dash("-"));
        assert!(is_dash(" – "));
        assert!(!is_dash("--"));
        assert!(!is_dash("5-"));
    }
}
