//! Marker name normalization.
//!
//! Catalog marker names are written for humans ("TCR alpha/beta",
//! "CD45.1"); exported panels need identifiers that survive downstream
//! pipelines. The rewrite rules run in a fixed order because later rules
//! can apply to text produced by earlier ones.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Greek words, then literal Greek letters. Case-insensitive, so the
    // capitals match too.
    static ref GREEK_REWRITES: [(Regex, &'static str); 6] = [
        (Regex::new("(?i)alpha").unwrap(), "a"),
        (Regex::new("(?i)beta").unwrap(), "b"),
        (Regex::new("(?i)gamma").unwrap(), "g"),
        (Regex::new("(?i)delta").unwrap(), "d"),
        (Regex::new("(?i)γ").unwrap(), "g"),
        (Regex::new("(?i)δ").unwrap(), "d"),
    ];
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Rewrites a catalog marker name into the identifier used in exported
/// panels. Pure and deterministic; no characters other than the Greek
/// names/letters, whitespace, `/`, `.` and `,` are altered.
pub fn normalize_marker_name(name: &str) -> String {
    let mut text = name.to_string();
    for (pattern, replacement) in GREEK_REWRITES.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    let text = WHITESPACE.replace_all(&text, "");
    text.replace('/', "-").replace('.', "_").replace(',', "_")
}
