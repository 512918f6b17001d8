//! # Numbering and Naming
//!
//! Turns the ranked matches into output numbers and new names.
//!
//! Numbers are assigned by rank. Nothing here validates the configured
//! `start`/`end`/`step`: negative or overlapping numbers are produced as
//! asked, and only logged. Numbers past the `i64` range are clamped to it.

use log::warn;

/// Placeholder replaced by the number in [`NameTemplate::CustomFormat`].
pub const NUMBER_PLACEHOLDER: &str = "[Num]";

/// Characters not allowed in file names on at least one common platform.
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\\', '/'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// How numbers are assigned to ranks.
///
/// Ascending sequences count up from `start`; descending ones count down
/// from `end`. The unused bound is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceSpec {
    pub direction: Direction,
    pub start: i64,
    pub end: i64,
    pub step: i64,
}

impl Default for SequenceSpec {
    fn default() -> Self {
        Self {
            direction: Direction::Ascending,
            start: 1,
            end: 1,
            step: 1,
        }
    }
}

/// One number per match, in rank order.
///
/// ```
/// use lineup::sequence::{sequence, Direction, SequenceSpec};
///
/// let spec = SequenceSpec { direction: Direction::Descending, start: 1, end: 10, step: 2 };
/// assert_eq!(sequence(3, &spec), vec![10, 8, 6]);
/// ```
#[must_use]
pub fn sequence(match_count: usize, spec: &SequenceSpec) -> Vec<i64> {
    let mut saturated = false;
    let numbers: Vec<i64> = (0..match_count as i128)
        .map(|i| {
            // i128 holds any i64 bound plus i64 step times a usize rank.
            let exact = match spec.direction {
                Direction::Ascending => i128::from(spec.start) + i * i128::from(spec.step),
                Direction::Descending => i128::from(spec.end) - i * i128::from(spec.step),
            };
            i64::try_from(exact).unwrap_or_else(|_| {
                saturated = true;
                if exact < 0 {
                    i64::MIN
                } else {
                    i64::MAX
                }
            })
        })
        .collect();

    if saturated {
        warn!("Numbering exceeds the 64-bit range; out-of-range numbers were clamped");
    }
    if let Some(lowest) = numbers.iter().min().filter(|n| **n < 0) {
        warn!("Numbering goes negative (down to {lowest}); check start, end and step");
    }

    numbers
}

/// How the new name of a matched item is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTemplate {
    /// `{number}{separator}{original name}`
    Prefix { separator: String },
    /// `pattern` with `[Num]` replaced, sanitized, plus the original extension.
    CustomFormat { pattern: String },
}

impl Default for NameTemplate {
    fn default() -> Self {
        Self::Prefix {
            separator: "-".to_string(),
        }
    }
}

impl NameTemplate {
    pub fn render(&self, number: i64, original_name: &str) -> String {
        rename(number, original_name, self)
    }
}

/// Build the new name for `original_name` numbered `number`.
///
/// ```
/// use lineup::sequence::{rename, NameTemplate};
///
/// let prefix = NameTemplate::Prefix { separator: "-".into() };
/// assert_eq!(rename(1, "Song One.flac", &prefix), "1-Song One.flac");
///
/// let custom = NameTemplate::CustomFormat { pattern: "Track [Num]".into() };
/// assert_eq!(rename(7, "Song One.flac", &custom), "Track 7.flac");
/// ```
#[must_use]
pub fn rename(number: i64, original_name: &str, template: &NameTemplate) -> String {
    match template {
        NameTemplate::Prefix { separator } => format!("{number}{separator}{original_name}"),
        NameTemplate::CustomFormat { pattern } => {
            let base = pattern.replace(NUMBER_PLACEHOLDER, &number.to_string());
            let base = sanitize(&base);
            let (_, extension) = split_extension(original_name);
            format!("{base}{extension}")
        }
    }
}

/// Drop characters that are reserved in file names.
#[must_use]
pub fn sanitize(name: &str) -> String {
    name.chars().filter(|c| !RESERVED_CHARS.contains(c)).collect()
}

/// Split `name` into stem and last extension (dot included).
///
/// Only the final suffix counts, so `a.tar.gz` keeps `.gz`. Leading dots
/// never start an extension: `.profile` has none.
#[must_use]
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => name.split_at(dot),
        _ => (name, ""),
    }
}
