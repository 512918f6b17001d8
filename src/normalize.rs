//! Wanted-list cleanup applied before scoring.
//!
//! Lists typed by hand often carry annotations such as `(live)` or
//! `(2011 remaster)` that never appear in the actual file names. They are
//! removed before comparison; the raw text is still what gets reported.

/// Remove every `(...)` annotation and trim surrounding whitespace.
///
/// Each opening parenthesis is paired with the nearest closing one after it,
/// so `a (b (c) d)` becomes `a  d)`. An opening parenthesis with no closing
/// partner is kept as-is.
///
/// ```
/// use lineup::normalize::normalize;
///
/// assert_eq!(normalize("Song One (live)"), "Song One");
/// assert_eq!(normalize("(intro) Overture (2011 mix)"), "Overture");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(open) = rest.find('(') {
        let after_open = &rest[open + 1..];
        match after_open.find(')') {
            Some(close) => {
                cleaned.push_str(&rest[..open]);
                rest = &after_open[close + 1..];
            }
            None => break,
        }
    }
    cleaned.push_str(rest);

    cleaned.trim().to_string()
}
