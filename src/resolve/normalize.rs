//! Name normalization used by every comparison.
//!
//! `normalize` folds a catalog name into a comparable form:
//!
//! ```text
//! "Sanctuary - Wächter der Kreaturen" -> "sanctuary wachter der kreaturen"
//! "Kill Bill: Vol. 1"                 -> "kill bill vol 1"
//! "Harry Potter & the ... Part 2"     -> "harry potter and the 2"
//! ```

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Characters treated as token boundaries
const SEPARATORS: &[char] = &[
    '.', ',', ':', ';', '!', '?', '\'', '"', '`', '´', '’', '‘', '“', '”', '-', '–', '—', '_',
    '(', ')', '[', ']', '{', '}', '/', '\\', '|', '*', '+', '#', '~', '…', '·',
];

/// Tokens that carry no identity ("Part 2" vs "2", German "Teil 2")
const FILLER_TOKENS: &[&str] = &["part", "teil"];

/// Normalize a name for comparison. Idempotent.
pub fn normalize(name: &str) -> String {
    let folded = fold(name);

    folded
        .replace('&', " and ")
        .split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter(|token| !token.is_empty() && !FILLER_TOKENS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decompose, drop combining marks, lower-case.
///
/// Lower-casing can itself produce marks (e.g. 'İ' -> "i\u{307}"), so the
/// mark filter runs once more afterwards.
fn fold(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}
