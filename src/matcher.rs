//! # Matcher Module
//!
//! Reconciles an ordered wanted list against an unordered folder listing.
//!
//! Wanted entries are processed in list order, so earlier entries get first
//! claim on contested folder entries. For each one:
//!
//! 1. the raw text is [normalized](crate::normalize::normalize);
//! 2. every entry still in the pool is scored with
//!    [`similarity::ratio`](crate::similarity::ratio), stopping at the first
//!    perfect (1.0) score, which is taken unconditionally;
//! 3. otherwise entries scoring strictly above the threshold become
//!    candidates, best first;
//! 4. no candidate is a miss, a single candidate (or any candidate set when
//!    `auto_select_highest` is on) takes the top one, and several candidates
//!    are handed to an [`AmbiguityResolver`];
//! 5. the chosen entry leaves the pool before the next wanted entry.
//!
//! Matching performs no I/O and never fails: every wanted entry ends up in
//! exactly one of `matched` or `missed`.

use crate::normalize::normalize;
use crate::similarity;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of the user's wanted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WantedEntry {
    /// 1-based position in the list, for reporting only.
    pub line_index: usize,
    pub raw_text: String,
}

impl WantedEntry {
    pub fn new(line_index: usize, raw_text: impl Into<String>) -> Self {
        Self {
            line_index,
            raw_text: raw_text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("File"),
            Self::Directory => f.write_str("Directory"),
        }
    }
}

/// An item of the source folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilesystemEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl FilesystemEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }
}

/// A pool entry scoring above the threshold for one wanted entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub entry: FilesystemEntry,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// 1-based position among successful matches, dense.
    pub rank: usize,
    pub wanted: WantedEntry,
    pub matched: FilesystemEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissedEntry {
    pub line_index: usize,
    pub raw_text: String,
}

impl From<&WantedEntry> for MissedEntry {
    fn from(wanted: &WantedEntry) -> Self {
        Self {
            line_index: wanted.line_index,
            raw_text: wanted.raw_text.clone(),
        }
    }
}

/// Matching parameters, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Candidates must score strictly above this.
    pub threshold: f64,
    /// Take the best candidate instead of asking when several qualify.
    pub auto_select_highest: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            auto_select_highest: false,
        }
    }
}

/// The outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub matched: Vec<MatchResult>,
    pub missed: Vec<MissedEntry>,
    /// Pool entries never consumed, in pool order.
    pub unused: Vec<FilesystemEntry>,
}

/// Picks one of several ranked candidates for a wanted entry.
///
/// This is the only place the matcher can block on a human. Returning
/// `None` declines, and the wanted entry is reported as missed.
pub trait AmbiguityResolver {
    /// Returns the index into `candidates` of the chosen entry.
    fn resolve(&mut self, wanted: &WantedEntry, candidates: &[Candidate]) -> Option<usize>;
}

impl<F> AmbiguityResolver for F
where
    F: FnMut(&WantedEntry, &[Candidate]) -> Option<usize>,
{
    fn resolve(&mut self, wanted: &WantedEntry, candidates: &[Candidate]) -> Option<usize> {
        self(wanted, candidates)
    }
}

/// Always takes the best-scoring candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickFirst;

impl AmbiguityResolver for PickFirst {
    fn resolve(&mut self, _wanted: &WantedEntry, _candidates: &[Candidate]) -> Option<usize> {
        Some(0)
    }
}

/// Never picks; every ambiguous entry becomes a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl AmbiguityResolver for Decline {
    fn resolve(&mut self, _wanted: &WantedEntry, _candidates: &[Candidate]) -> Option<usize> {
        None
    }
}

/// Outcome of scoring one wanted entry against the pool.
enum Lookup {
    Perfect(usize),
    Candidates(Vec<(usize, Candidate)>),
}

/// Score `text` against every pool entry.
///
/// Candidates come back best first; equal scores keep pool order.
fn score_pool(text: &str, pool: &[FilesystemEntry], threshold: f64) -> Lookup {
    let mut candidates = Vec::new();

    for (index, entry) in pool.iter().enumerate() {
        let score = similarity::ratio(text, &entry.name);
        if score == 1.0 {
            return Lookup::Perfect(index);
        }
        if score > threshold {
            candidates.push((
                index,
                Candidate {
                    entry: entry.clone(),
                    score,
                },
            ));
        }
    }

    // stable: ties stay in pool order
    candidates.sort_by(|(_, a), (_, b)| b.score.total_cmp(&a.score));
    Lookup::Candidates(candidates)
}

/// Match `wanted` against `pool`, consuming matched entries from the pool.
///
/// Returns the matches (ranked densely from 1) and the misses, both in list
/// order. Whatever is left in `pool` afterwards is unused.
pub fn match_entries(
    wanted: &[WantedEntry],
    pool: &mut Vec<FilesystemEntry>,
    options: &MatchOptions,
    resolver: &mut dyn AmbiguityResolver,
) -> (Vec<MatchResult>, Vec<MissedEntry>) {
    let mut matched: Vec<MatchResult> = Vec::new();
    let mut missed = Vec::new();

    for entry in wanted {
        let text = normalize(&entry.raw_text);

        let chosen = match score_pool(&text, pool, options.threshold) {
            Lookup::Perfect(index) => {
                debug!("Perfect match for '{}': {}", entry.raw_text, pool[index].name);
                Some(index)
            }
            Lookup::Candidates(candidates) if candidates.is_empty() => {
                debug!(
                    "No candidate above {} for '{}' (line {})",
                    options.threshold, entry.raw_text, entry.line_index
                );
                None
            }
            Lookup::Candidates(candidates)
                if candidates.len() == 1 || options.auto_select_highest =>
            {
                let (index, best) = &candidates[0];
                debug!(
                    "Matched '{}' to {} (score {:.3})",
                    entry.raw_text, best.entry.name, best.score
                );
                Some(*index)
            }
            Lookup::Candidates(candidates) => {
                let (indices, ranked): (Vec<usize>, Vec<Candidate>) =
                    candidates.into_iter().unzip();
                match resolver.resolve(entry, &ranked) {
                    Some(choice) if choice < indices.len() => {
                        debug!(
                            "Resolved '{}' to {} ({} candidates)",
                            entry.raw_text,
                            ranked[choice].entry.name,
                            ranked.len()
                        );
                        Some(indices[choice])
                    }
                    Some(choice) => {
                        warn!(
                            "Ignoring out-of-range choice {choice} for '{}' ({} candidates)",
                            entry.raw_text,
                            ranked.len()
                        );
                        None
                    }
                    None => {
                        debug!("No selection made for '{}'", entry.raw_text);
                        None
                    }
                }
            }
        };

        match chosen {
            Some(index) => {
                let taken = pool.remove(index);
                matched.push(MatchResult {
                    rank: matched.len() + 1,
                    wanted: entry.clone(),
                    matched: taken,
                });
            }
            None => missed.push(MissedEntry::from(entry)),
        }
    }

    (matched, missed)
}

/// Run [`match_entries`] over a whole folder listing.
pub fn reconcile(
    wanted: &[WantedEntry],
    mut pool: Vec<FilesystemEntry>,
    options: &MatchOptions,
    resolver: &mut dyn AmbiguityResolver,
) -> Reconciliation {
    let (matched, missed) = match_entries(wanted, &mut pool, options, resolver);
    Reconciliation {
        matched,
        missed,
        unused: pool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn wanted(items: &[&str]) -> Vec<WantedEntry> {
        items
            .iter()
            .enumerate()
            .map(|(i, text)| WantedEntry::new(i + 1, *text))
            .collect()
    }

    fn files(names: &[&str]) -> Vec<FilesystemEntry> {
        names.iter().map(|name| FilesystemEntry::file(*name)).collect()
    }

    fn options(threshold: f64, auto_select_highest: bool) -> MatchOptions {
        MatchOptions {
            threshold,
            auto_select_highest,
        }
    }

    #[test]
    fn test_annotations_are_ignored_when_matching() {
        let list = wanted(&["Song One (live)", "Song Two"]);
        let pool = files(&["Extra.flac", "Song One.flac", "Song Two.flac"]);

        let result = reconcile(&list, pool, &options(0.6, false), &mut Decline);

        let names: Vec<&str> = result.matched.iter().map(|m| m.matched.name.as_str()).collect();
        assert_eq!(names, ["Song One.flac", "Song Two.flac"]);
        assert_eq!(result.matched[0].wanted.raw_text, "Song One (live)");
        assert!(result.missed.is_empty());
        assert_eq!(result.unused, files(&["Extra.flac"]));
    }

    #[test]
    fn test_below_threshold_is_missed() {
        let list = wanted(&["Zzz"]);
        let result = reconcile(&list, files(&["Abc.flac"]), &options(0.6, false), &mut PickFirst);

        assert!(result.matched.is_empty());
        assert_eq!(
            result.missed,
            vec![MissedEntry {
                line_index: 1,
                raw_text: "Zzz".to_string()
            }]
        );
        assert_eq!(result.unused, files(&["Abc.flac"]));
    }

    #[test]
    fn test_ambiguity_is_handed_to_resolver() {
        let list = wanted(&["Song"]);
        let pool = files(&["Song (copy).flac", "Song.flac"]);
        let mut seen = Vec::new();

        let result = reconcile(
            &list,
            pool,
            &options(0.3, false),
            &mut |entry: &WantedEntry, candidates: &[Candidate]| {
                assert_eq!(entry.raw_text, "Song");
                seen = candidates.to_vec();
                Some(1)
            },
        );

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].entry.name, "Song.flac");
        assert_eq!(seen[1].entry.name, "Song (copy).flac");
        assert!(seen[0].score > seen[1].score);

        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].matched.name, "Song (copy).flac");
        assert_eq!(result.unused, files(&["Song.flac"]));
    }

    #[test]
    fn test_declined_ambiguity_is_missed() {
        let list = wanted(&["Song"]);
        let result = reconcile(
            &list,
            files(&["Song.flac", "Song (copy).flac"]),
            &options(0.3, false),
            &mut Decline,
        );

        assert!(result.matched.is_empty());
        assert_eq!(result.missed.len(), 1);
        assert_eq!(result.unused.len(), 2);
    }

    #[test]
    fn test_out_of_range_choice_is_missed() {
        let list = wanted(&["Song"]);
        let result = reconcile(
            &list,
            files(&["Song.flac", "Song (copy).flac"]),
            &options(0.3, false),
            &mut |_: &WantedEntry, _: &[Candidate]| Some(7),
        );

        assert!(result.matched.is_empty());
        assert_eq!(result.missed.len(), 1);
    }

    #[test]
    fn test_auto_select_skips_resolver() {
        let list = wanted(&["Song"]);
        let result = reconcile(
            &list,
            files(&["Song (copy).flac", "Song.flac"]),
            &options(0.3, true),
            &mut |_: &WantedEntry, _: &[Candidate]| -> Option<usize> {
                panic!("resolver must not be called")
            },
        );

        assert_eq!(result.matched[0].matched.name, "Song.flac");
    }

    #[test]
    fn test_perfect_match_ignores_threshold_and_resolver() {
        let list = wanted(&["Song.flac"]);
        let result = reconcile(
            &list,
            files(&["Song.flac.bak", "Song.flac", "Song.flag"]),
            &options(1.0, false),
            &mut |_: &WantedEntry, _: &[Candidate]| -> Option<usize> {
                panic!("resolver must not be called")
            },
        );

        assert_eq!(result.matched[0].matched.name, "Song.flac");
    }

    #[test]
    fn test_perfect_match_after_normalization() {
        let list = wanted(&["Intro.mp3 (demo)"]);
        let result = reconcile(&list, files(&["Intro.mp3"]), &options(0.99, false), &mut Decline);
        assert_eq!(result.matched.len(), 1);
    }

    #[test]
    fn test_earlier_entries_claim_first() {
        let list = wanted(&["A", "A"]);
        let result = reconcile(&list, files(&["A"]), &options(0.6, false), &mut PickFirst);

        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].wanted.line_index, 1);
        assert_eq!(result.missed, vec![MissedEntry { line_index: 2, raw_text: "A".to_string() }]);
        assert!(result.unused.is_empty());
    }

    #[test]
    fn test_ranks_are_dense_across_misses() {
        let list = wanted(&["Alpha", "Nothing like it", "Beta", "qqqq", "Gamma"]);
        let pool = files(&["Alpha.mp3", "Beta.mp3", "Gamma.mp3"]);

        let result = reconcile(&list, pool, &options(0.6, false), &mut Decline);

        let ranks: Vec<usize> = result.matched.iter().map(|m| m.rank).collect();
        let lines: Vec<usize> = result.matched.iter().map(|m| m.wanted.line_index).collect();
        assert_eq!(ranks, [1, 2, 3]);
        assert_eq!(lines, [1, 3, 5]);
        let missed: Vec<usize> = result.missed.iter().map(|m| m.line_index).collect();
        assert_eq!(missed, [2, 4]);
    }

    #[test]
    fn test_equal_scores_keep_pool_order() {
        let list = wanted(&["ab"]);
        let pool = files(&["abx", "aby"]);

        let result = reconcile(&list, pool, &options(0.5, false), &mut PickFirst);
        assert_eq!(result.matched[0].matched.name, "abx");
    }

    #[test]
    fn test_empty_wanted_text_only_matches_at_zero_threshold() {
        let list = wanted(&["(annotation only)"]);
        let strict = reconcile(&list, files(&["x"]), &options(0.6, false), &mut PickFirst);
        assert_eq!(strict.missed.len(), 1);

        // 0.0 is not strictly above 0.0 either
        let lenient = reconcile(&list, files(&["x"]), &options(0.0, false), &mut PickFirst);
        assert_eq!(lenient.missed.len(), 1);
    }

    #[test]
    fn test_exclusivity_and_partition_hold() {
        let list = wanted(&[
            "Track 1", "Track 1", "Track 2", "Track 3 (bonus)", "Track", "Other", "Track 2",
        ]);
        let pool = files(&["Track 1.ogg", "Track 2.ogg", "Track 3.ogg", "Track 4.ogg", "cover.jpg"]);
        let pool_size = pool.len();

        let result = reconcile(&list, pool, &options(0.5, false), &mut PickFirst);

        assert_eq!(result.matched.len() + result.missed.len(), list.len());
        let used: HashSet<&str> = result.matched.iter().map(|m| m.matched.name.as_str()).collect();
        assert_eq!(used.len(), result.matched.len());
        assert_eq!(result.matched.len() + result.unused.len(), pool_size);
        for entry in &result.unused {
            assert!(!used.contains(entry.name.as_str()));
        }
    }
}
