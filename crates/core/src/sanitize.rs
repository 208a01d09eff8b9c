//! File name sanitization for generated documents and media.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse runs of whitespace into a single underscore.
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Regex matching every character that may not appear in an output name.
static DISALLOWED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-.]").unwrap());

/// Name used when nothing survives sanitization.
pub const FALLBACK_NAME: &str = "untitled";

/// Turn an arbitrary base name into a safe file name.
///
/// Whitespace runs become `_`, accented letters are folded to their ASCII
/// base, and anything other than ASCII letters, digits, `_`, `-` and `.` is
/// dropped. The result is never empty.
///
/// ```
/// use slidemd_core::sanitize;
///
/// assert_eq!(sanitize("  Rapat  Tahunan 2024 "), "Rapat_Tahunan_2024");
/// assert_eq!(sanitize("Café (final)"), "Cafe_final");
/// assert_eq!(sanitize("***"), "untitled");
/// ```
pub fn sanitize(name: &str) -> String {
    let folded: String = name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let underscored = WHITESPACE_REGEX.replace_all(folded.trim(), "_");
    let cleaned = DISALLOWED_REGEX.replace_all(&underscored, "");

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.into_owned()
    }
}
