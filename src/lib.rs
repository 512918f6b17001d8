//! Reconcile an ordered name list with the contents of a folder.
//!
//! Core modules:
//! - [`normalize`] - Wanted-list cleanup before scoring
//! - [`similarity`] - Ratcliff/Obershelp string similarity
//! - [`matcher`] - Greedy, order-sensitive, one-to-one matching
//! - [`sequence`] - Numbering and new-name rendering
//! - [`plan`] - A full run from inputs to renamed items
//!
//! ### Supporting Modules
//!
//! - [`input`] - Wanted list importers and folder listing
//! - [`export`] - Report encodings (text, JSON, M3U) and copying
//! - [`prompt`] - Interactive terminal prompts
//! - [`config`] - Configuration file handling
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`error`] - Error types
//!
//! ## Quick Start Example
//!
//! ```
//! use lineup::matcher::{reconcile, FilesystemEntry, MatchOptions, PickFirst, WantedEntry};
//! use lineup::plan::build_plan;
//! use lineup::sequence::{NameTemplate, SequenceSpec};
//!
//! let wanted = vec![
//!     WantedEntry::new(1, "Song One (live)"),
//!     WantedEntry::new(2, "Song Two"),
//! ];
//! let folder = vec![
//!     FilesystemEntry::file("Extra.flac"),
//!     FilesystemEntry::file("Song One.flac"),
//!     FilesystemEntry::file("Song Two.flac"),
//! ];
//!
//! let result = reconcile(&wanted, folder, &MatchOptions::default(), &mut PickFirst);
//! assert_eq!(result.unused, vec![FilesystemEntry::file("Extra.flac")]);
//!
//! let plan = build_plan(result, &SequenceSpec::default(), &NameTemplate::default());
//! let names: Vec<&str> = plan.items.iter().map(|i| i.new_name.as_str()).collect();
//! assert_eq!(names, ["1-Song One.flac", "2-Song Two.flac"]);
//! ```
//!
//! ## Matching Rules
//!
//! - Wanted entries are handled in list order; earlier ones claim first.
//! - Parenthesized annotations are removed before scoring.
//! - An identical name is taken at once, whatever the threshold.
//! - Otherwise names scoring strictly above the threshold are candidates;
//!   several candidates are resolved by an [`matcher::AmbiguityResolver`].
//! - A folder entry is used at most once.
//!
//! ## Error Handling
//!
//! Library functions return [`error::Result`]. Failures only come from the
//! inputs (missing folder, empty list, bad threshold, unreadable files) and
//! from export I/O. Unmatched entries are part of the result, not errors.

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod matcher;
pub mod normalize;
pub mod plan;
pub mod prompt;
pub mod sequence;
pub mod similarity;
