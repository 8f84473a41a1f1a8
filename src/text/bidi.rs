//! Direction-tolerant text matching.
//!
//! Upstream token extraction does not reliably report whether a right-to-left
//! string was emitted in logical or visual order. Keyword tests therefore run
//! against both the text as given and its character-reversed form. This is a
//! heuristic: a keyword that is a palindrome of another keyword would match
//! either way.

/// Check whether a character belongs to a right-to-left script block.
pub fn is_rtl_char(c: char) -> bool {
    matches!(
        c as u32,
        0x0590..=0x05FF   // Hebrew
        | 0x0600..=0x06FF // Arabic
        | 0x0750..=0x077F // Arabic Supplement
        | 0xFB1D..=0xFB4F // Hebrew presentation forms
    )
}

/// Count right-to-left characters in a text sample.
pub fn count_rtl_chars(text: &str) -> usize {
    text.chars().filter(|c| is_rtl_char(*c)).count()
}

/// Reverse a string by characters.
pub fn reversed(text: &str) -> String {
    text.chars().rev().collect()
}

/// Canonical form used for keyword comparison.
///
/// Lowercases, drops directional formatting marks, folds Hebrew geresh and
/// gershayim into their ASCII look-alikes and collapses runs of whitespace.
///
/// # Examples
///
/// ```
/// use spatial_tables::text::normalize_for_match;
///
/// assert_eq!(normalize_for_match("  סה״כ   Total "), "סה\"כ total");
/// ```
pub fn normalize_for_match(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter(|c| !matches!(*c, '\u{200E}' | '\u{200F}' | '\u{061C}' | '\u{202A}'..='\u{202E}'))
        .map(|c| match c {
            '״' | '“' | '”' => '"',
            '׳' | '‘' | '’' => '\'',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check whether `haystack` contains `needle` read in either direction.
pub fn contains_either_direction(haystack: &str, needle: &str) -> bool {
    let needle = normalize_for_match(needle);
    if needle.is_empty() {
        return false;
    }
    let haystack = normalize_for_match(haystack);
    haystack.contains(&needle) || reversed(&haystack).contains(&needle)
}

/// Return the first keyword found in `haystack` in either direction.
pub fn find_keyword<'a, S: AsRef<str>>(haystack: &str, keywords: &'a [S]) -> Option<&'a str> {
    let forward = normalize_for_match(haystack);
    let backward = reversed(&forward);

    keywords.iter().map(AsRef::as_ref).find(|keyword| {
        let keyword = normalize_for_match(keyword);
        !keyword.is_empty() && (forward.contains(&keyword) || backward.contains(&keyword))
    })
}

/// Words of `text` in match form, without surrounding punctuation.
fn match_words(text: &str) -> Vec<String> {
    normalize_for_match(text)
        .split(' ')
        .map(|w| w.trim_matches(|c: char| matches!(c, ':' | ',' | '.' | ';' | '*' | '(' | ')')))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Like [`find_keyword`], but a keyword only matches whole words.
///
/// `"total"` matches `"Total: 4,160"` but not `"TotalEnergies"`.
pub fn find_whole_keyword<'a, S: AsRef<str>>(
    haystack: &str,
    keywords: &'a [S],
) -> Option<&'a str> {
    let forward = match_words(haystack);
    let backward = match_words(&reversed(haystack));

    keywords.iter().map(AsRef::as_ref).find(|keyword| {
        let keyword = match_words(keyword);
        !keyword.is_empty()
            && [&forward, &backward]
                .iter()
                .any(|words| words.windows(keyword.len()).any(|w| w == keyword.as_slice()))
    })
}
