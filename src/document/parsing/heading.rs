//! Heading detection from paragraph style ids
//!
//! Word writes the style id of built-in headings in the document language.
//! English documents use `Heading1`; Portuguese ones use `Título1`, which
//! Word stores with the accent stripped as `Ttulo1`.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_STYLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[Hh]eading|T[ií]tulo|Ttulo) ?([1-9])$").unwrap());

/// Detect heading level from a paragraph style id
pub(crate) fn heading_level_from_style(style_id: &str) -> Option<u8> {
    let captures = HEADING_STYLE_PATTERN.captures(style_id.trim())?;
    captures.get(1)?.as_str().parse().ok()
}
