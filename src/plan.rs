//! Turns a reconciliation into numbered, renamed items.

use crate::config::LineupConfig;
use crate::error::Result;
use crate::input;
use crate::matcher::{
    reconcile, AmbiguityResolver, EntryKind, FilesystemEntry, MatchResult, MissedEntry,
    Reconciliation, WantedEntry,
};
use crate::sequence::{sequence, NameTemplate, SequenceSpec};
use log::info;
use std::path::Path;

/// A matched item ready to be copied or reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    pub rank: usize,
    pub line_index: usize,
    pub wanted: String,
    pub original: FilesystemEntry,
    pub number: i64,
    pub new_name: String,
}

impl PlannedItem {
    pub fn kind(&self) -> EntryKind {
        self.original.kind
    }
}

/// Everything the exporter and the preview need from one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineupPlan {
    pub items: Vec<PlannedItem>,
    pub missed: Vec<MissedEntry>,
    pub unused: Vec<FilesystemEntry>,
}

impl LineupPlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn build_plan(
    reconciliation: Reconciliation,
    sequence_spec: &SequenceSpec,
    template: &NameTemplate,
) -> LineupPlan {
    let Reconciliation {
        matched,
        missed,
        unused,
    } = reconciliation;

    let numbers = sequence(matched.len(), sequence_spec);
    let items: Vec<PlannedItem> = matched
        .into_iter()
        .zip(numbers)
        .map(|(MatchResult { rank, wanted, matched }, number)| PlannedItem {
            rank,
            line_index: wanted.line_index,
            new_name: template.render(number, &matched.name),
            wanted: wanted.raw_text,
            original: matched,
            number,
        })
        .collect();

    info!(
        "Planned {} item(s), {} missed, {} unused",
        items.len(),
        missed.len(),
        unused.len()
    );

    LineupPlan {
        items,
        missed,
        unused,
    }
}

/// Plan a whole run: check the inputs, list `folder` and match `wanted`.
///
/// Input problems are reported before any matching starts.
pub fn plan_folder(
    folder: &Path,
    wanted: &[WantedEntry],
    config: &LineupConfig,
    resolver: &mut dyn AmbiguityResolver,
) -> Result<LineupPlan> {
    input::validate_folder(folder)?;
    input::ensure_not_empty(wanted)?;
    let options = config.match_options()?;

    let pool = input::list_folder(folder, config.ignore_directories)?;
    info!(
        "Matching {} wanted item(s) against {} entries of {} (threshold {})",
        wanted.len(),
        pool.len(),
        folder.display(),
        options.threshold
    );

    let reconciliation = reconcile(wanted, pool, &options, resolver);
    Ok(build_plan(
        reconciliation,
        &config.sequence_spec(),
        &config.name_template(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LineupError;
    use crate::matcher::{Decline, MatchOptions, PickFirst};
    use crate::sequence::Direction;
    use std::fs;
    use tempfile::TempDir;

    fn scenario() -> Reconciliation {
        let wanted = vec![
            WantedEntry::new(1, "Song One (live)"),
            WantedEntry::new(2, "Missing"),
            WantedEntry::new(3, "Song Two"),
        ];
        let pool = vec![
            FilesystemEntry::file("Extra.flac"),
            FilesystemEntry::file("Song One.flac"),
            FilesystemEntry::file("Song Two.flac"),
        ];
        reconcile(&wanted, pool, &MatchOptions::default(), &mut Decline)
    }

    #[test]
    fn test_default_plan_prefixes_rank_numbers() {
        let plan = build_plan(scenario(), &SequenceSpec::default(), &NameTemplate::default());

        let names: Vec<&str> = plan.items.iter().map(|i| i.new_name.as_str()).collect();
        assert_eq!(names, ["1-Song One.flac", "2-Song Two.flac"]);
        assert_eq!(plan.items[1].line_index, 3);
        assert_eq!(plan.items[1].rank, 2);
        assert_eq!(plan.missed.len(), 1);
        assert_eq!(plan.unused, vec![FilesystemEntry::file("Extra.flac")]);
    }

    #[test]
    fn test_descending_custom_plan() {
        let spec = SequenceSpec {
            direction: Direction::Descending,
            start: 1,
            end: 20,
            step: 10,
        };
        let template = NameTemplate::CustomFormat {
            pattern: "Track [Num]".to_string(),
        };

        let plan = build_plan(scenario(), &spec, &template);

        let numbered: Vec<(i64, &str)> = plan
            .items
            .iter()
            .map(|i| (i.number, i.new_name.as_str()))
            .collect();
        assert_eq!(numbered, [(20, "Track 20.flac"), (10, "Track 10.flac")]);
        assert_eq!(plan.items[0].wanted, "Song One (live)");
    }

    #[test]
    fn test_plan_folder_checks_inputs_first() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let config = LineupConfig::default();

        let missing = plan_folder(&dir.path().join("nope"), &[WantedEntry::new(1, "a")], &config, &mut Decline);
        assert!(matches!(missing, Err(LineupError::FolderNotFound(_))));

        let empty = plan_folder(dir.path(), &[], &config, &mut Decline);
        assert!(matches!(empty, Err(LineupError::EmptyList)));

        let bad = LineupConfig {
            threshold: -0.1,
            ..LineupConfig::default()
        };
        let invalid = plan_folder(dir.path(), &[WantedEntry::new(1, "a")], &bad, &mut Decline);
        assert!(matches!(invalid, Err(LineupError::InvalidThreshold(_))));
        Ok(())
    }

    #[test]
    fn test_plan_folder_ignores_directories_when_asked() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::create_dir(dir.path().join("Intro"))?;
        fs::write(dir.path().join("Intro.mp3"), b"x")?;
        let wanted = [WantedEntry::new(1, "Intro")];

        let with_dirs = plan_folder(dir.path(), &wanted, &LineupConfig::default(), &mut PickFirst)?;
        assert_eq!(with_dirs.items[0].original, FilesystemEntry::directory("Intro"));

        let files_only = LineupConfig {
            ignore_directories: true,
            ..LineupConfig::default()
        };
        let plan = plan_folder(dir.path(), &wanted, &files_only, &mut PickFirst)?;
        assert_eq!(plan.items[0].original, FilesystemEntry::file("Intro.mp3"));
        assert!(plan.unused.is_empty());
        Ok(())
    }
}
