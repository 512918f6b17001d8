//! # Command-Line Interface Module
//!
//! Defines the command-line interface for lineup using Clap derive macros.
//!
//! ## Commands
//!
//! - `run`: Match a list against a folder, copy the matches and write a report
//! - `preview`: Show what `run` would do without touching the filesystem
//! - `config`: Show or create the configuration file
//! - `completion`: Generate shell completions
//!
//! ## Examples
//!
//! ```bash
//! lineup preview ~/Music/Album --list order.txt
//! lineup run ~/Music/Album --sheet setlist.xlsx --threshold 0.7 --format m3u
//! lineup run ~/Music/Album --text "Intro
//! Song Two" --pattern "Track [Num]" --reverse --end 12
//! ```

use crate::config::{LineupConfig, RenameMode};
use crate::export::{FilenameMode, OutputFormat};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "lineup")]
#[command(about = "Lineup: match an ordered name list against a folder and copy it out in ranked order")]
#[command(version)]
pub struct Args {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, env = "LINEUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Match the list against the folder, copy matches and write a report
    ///
    /// Matched items are copied into `<FOLDER>/Result` (or `--output-dir`)
    /// under numbered names. With `--list-only` only the report is written.
    Run(RunArgs),

    /// Show matches, misses and new names without writing anything
    Preview(RunArgs),

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    ///
    /// Usage: lineup completion bash > ~/.local/share/bash-completion/completions/lineup
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,
    /// Write the default configuration file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file location
    Path,
}

/// Where the wanted list comes from. Exactly one source is required.
#[derive(ClapArgs, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ListSource {
    /// Text file with one wanted name per line (`-` for stdin)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub list: Option<PathBuf>,

    /// Spreadsheet whose first column holds the wanted names
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub sheet: Option<PathBuf>,

    /// Wanted names inline, one per line
    #[arg(long)]
    pub text: Option<String>,
}

/// Arguments shared by `run` and `preview`.
///
/// Every option left out falls back to the configuration file.
#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Folder whose items are matched
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub folder: PathBuf,

    #[command(flatten)]
    pub source: ListSource,

    /// Minimum similarity (exclusive) for a candidate, between 0 and 1
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Take the best candidate instead of asking when several qualify
    #[arg(long)]
    pub auto_select: bool,

    /// Only match files, never sub-directories
    #[arg(long)]
    pub ignore_dirs: bool,

    /// Write the report without copying anything
    #[arg(long)]
    pub list_only: bool,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// How paths are written into the report
    #[arg(long, value_enum)]
    pub filenames: Option<FilenameMode>,

    /// Destination folder for copies and the report
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Report file path (defaults to Result.<ext> in the destination folder)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub output_file: Option<PathBuf>,

    /// Name items `<number><separator><original name>`
    #[arg(long, conflicts_with = "pattern")]
    pub separator: Option<String>,

    /// Name items from a pattern where `[Num]` is the number; the original extension is kept
    #[arg(long)]
    pub pattern: Option<String>,

    /// First number when counting up
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<i64>,

    /// Increment between consecutive numbers
    #[arg(long, allow_negative_numbers = true)]
    pub step: Option<i64>,

    /// Count down from `--end` instead of up from `--start`
    #[arg(long)]
    pub reverse: bool,

    /// First number when counting down
    #[arg(long, allow_negative_numbers = true)]
    pub end: Option<i64>,

    /// Answer yes to every overwrite question (ambiguous matches are still
    /// asked unless --auto-select is given)
    #[arg(short, long)]
    pub yes: bool,
}

impl RunArgs {
    /// Overlay the flags given on the command line onto `config`.
    pub fn apply_to(&self, config: &mut LineupConfig) {
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        config.auto_select_highest |= self.auto_select;
        config.ignore_directories |= self.ignore_dirs;
        config.list_only |= self.list_only;
        if let Some(format) = self.format {
            config.output_format = format;
        }
        if let Some(mode) = self.filenames {
            config.filename_mode = mode;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(file) = &self.output_file {
            config.output_file = Some(file.clone());
        }
        if let Some(separator) = &self.separator {
            config.rename.mode = RenameMode::Prefix;
            config.rename.separator = separator.clone();
        }
        if let Some(pattern) = &self.pattern {
            config.rename.mode = RenameMode::Format;
            config.rename.pattern = pattern.clone();
        }
        if let Some(start) = self.start {
            config.sequence.start = start;
        }
        if let Some(step) = self.step {
            config.sequence.step = step;
        }
        config.sequence.reverse |= self.reverse;
        if let Some(end) = self.end {
            config.sequence.end = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("lineup").chain(args.iter().copied()))
    }

    fn run_args(args: &[&str]) -> RunArgs {
        match parse(args).expect("arguments should parse").command {
            Command::Run(run) | Command::Preview(run) => run,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_list_source_is_required() {
        assert!(parse(&["run", "music"]).is_err());
    }

    #[test]
    fn test_list_sources_are_exclusive() {
        assert!(parse(&["run", "music", "--list", "a.txt", "--text", "x"]).is_err());
    }

    #[test]
    fn test_separator_conflicts_with_pattern() {
        assert!(parse(&["run", "m", "--text", "x", "--separator", "_", "--pattern", "[Num]"]).is_err());
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let args = run_args(&[
            "run", "music", "--text", "a\nb", "-t", "0.75", "--format", "json", "--pattern",
            "Track [Num]", "--reverse", "--end", "10", "--step", "-2",
        ]);
        let mut config = LineupConfig::default();
        args.apply_to(&mut config);

        assert_eq!(config.threshold, 0.75);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.rename.mode, RenameMode::Format);
        assert_eq!(config.rename.pattern, "Track [Num]");
        assert!(config.sequence.reverse);
        assert_eq!(config.sequence.end, 10);
        assert_eq!(config.sequence.step, -2);
        assert_eq!(config.sequence.start, 1);
        assert!(!config.auto_select_highest);
    }

    #[test]
    fn test_missing_flags_keep_config_values() {
        let args = run_args(&["preview", "music", "--list", "order.txt"]);
        let mut config = LineupConfig {
            threshold: 0.9,
            list_only: true,
            ..LineupConfig::default()
        };
        let before = config.clone();
        args.apply_to(&mut config);

        assert_eq!(config, before);
    }

    #[test]
    fn test_yes_leaves_candidate_choice_alone() {
        let args = run_args(&["run", "music", "--list", "order.txt", "--yes"]);
        let mut config = LineupConfig::default();
        args.apply_to(&mut config);
        assert!(args.yes);
        assert!(!config.auto_select_highest);

        let args = run_args(&["run", "music", "--list", "order.txt", "--yes", "--auto-select"]);
        args.apply_to(&mut config);
        assert!(config.auto_select_highest);
    }
}
