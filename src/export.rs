//! # Export Module
//!
//! Consumes a [`LineupPlan`]: renders the report in one of three encodings,
//! copies matched items under their new names, and asks before overwriting
//! anything.
//!
//! ## Result Location
//!
//! - an explicit output directory always wins;
//! - list-only runs otherwise write next to the source items;
//! - full runs otherwise copy into `<folder>/Result`. If that folder already
//!   exists the user may reuse it or name a different one; an empty name
//!   cancels the export.
//!
//! An existing report file is only replaced after confirmation. Declining
//! cancels the export before anything is written.
//!
//! ## Failure Model
//!
//! Copy failures are collected per item and never stop the export: the
//! report always lists every computed match.

use crate::error::Result;
use crate::matcher::EntryKind;
use crate::plan::{LineupPlan, PlannedItem};
use clap::ValueEnum;
use log::{info, warn};
use path_absolutize::Absolutize;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default copy destination inside the source folder.
pub const RESULT_DIR_NAME: &str = "Result";

/// Report encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Commented plain text
    #[default]
    Text,
    /// JSON object
    Json,
    /// Extended M3U playlist
    M3u,
}

impl OutputFormat {
    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Text => "Result.txt",
            Self::Json => "Result.json",
            Self::M3u => "Result.m3u",
        }
    }
}

/// How item paths are written into reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilenameMode {
    /// Name only
    #[default]
    Relative,
    /// Absolute path under the folder the item lives in
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Report only; items are referenced in the source folder.
    ListOnly,
    /// Copy items, then report their new names.
    Full,
}

impl ExportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListOnly => "list_only",
            Self::Full => "full",
        }
    }
}

/// Where reported items live and how to print them.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub folder: &'a Path,
    /// Copy destination; equals `folder` for list-only reports.
    pub result_dir: &'a Path,
    pub threshold: f64,
    pub mode: ExportMode,
    pub filename_mode: FilenameMode,
}

impl ReportContext<'_> {
    fn folder_label(&self) -> String {
        let absolute = self
            .folder
            .absolutize()
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| self.folder.to_path_buf());
        absolute
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| absolute.display().to_string())
    }

    fn path_in(&self, base: &Path, name: &str) -> String {
        match self.filename_mode {
            FilenameMode::Relative => name.to_string(),
            FilenameMode::Absolute => {
                let joined = base.join(name);
                let absolute = joined
                    .absolutize()
                    .map(|p| p.into_owned())
                    .unwrap_or_else(|_| joined.clone());
                absolute.display().to_string()
            }
        }
    }

    /// Path of a matched item as it should appear in the report.
    fn item_path(&self, item: &PlannedItem) -> String {
        match self.mode {
            ExportMode::ListOnly => self.path_in(self.folder, &item.original.name),
            ExportMode::Full => self.path_in(self.result_dir, &item.new_name),
        }
    }
}

/// Render `plan` in `format`.
pub fn render_report(
    plan: &LineupPlan,
    context: &ReportContext<'_>,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(plan, context)),
        OutputFormat::Json => render_json(plan, context),
        OutputFormat::M3u => Ok(render_m3u(plan, context)),
    }
}

fn render_text(plan: &LineupPlan, context: &ReportContext<'_>) -> String {
    TextReport { plan, context }.to_string()
}

struct TextReport<'a> {
    plan: &'a LineupPlan,
    context: &'a ReportContext<'a>,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { plan, context } = self;
        writeln!(f, "# Lineup for folder {}", context.folder_label())?;
        let list_only = if context.mode == ExportMode::ListOnly { " (list only)" } else { "" };
        writeln!(f, "# Similarity threshold {}{list_only}", context.threshold)?;

        for item in &plan.items {
            let path = context.item_path(item);
            match context.mode {
                ExportMode::ListOnly => writeln!(f, "{path}")?,
                ExportMode::Full => writeln!(f, "{path} ({})", item.kind())?,
            }
        }

        if !plan.missed.is_empty() {
            writeln!(f, "# Missed items ({} total)", plan.missed.len())?;
            for missed in &plan.missed {
                writeln!(f, "# {} (line {})", missed.raw_text, missed.line_index)?;
            }
        }

        if !plan.unused.is_empty() {
            writeln!(f, "# Unused items in folder ({} total)", plan.unused.len())?;
            for entry in &plan.unused {
                let path = context.path_in(context.folder, &entry.name);
                writeln!(f, "# {path} ({})", entry.kind)?;
            }
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    folder: String,
    threshold: f64,
    mode: &'static str,
    matched: Vec<String>,
    missed: Vec<JsonMissed<'a>>,
    unused: Vec<JsonUnused>,
}

#[derive(Serialize)]
struct JsonMissed<'a> {
    line: usize,
    item: &'a str,
}

#[derive(Serialize)]
struct JsonUnused {
    item: String,
    #[serde(rename = "type")]
    kind: EntryKind,
}

fn render_json(plan: &LineupPlan, context: &ReportContext<'_>) -> Result<String> {
    let report = JsonReport {
        folder: context.folder_label(),
        threshold: context.threshold,
        mode: context.mode.as_str(),
        matched: plan.items.iter().map(|item| context.item_path(item)).collect(),
        missed: plan
            .missed
            .iter()
            .map(|m| JsonMissed {
                line: m.line_index,
                item: &m.raw_text,
            })
            .collect(),
        unused: plan
            .unused
            .iter()
            .map(|entry| JsonUnused {
                item: context.path_in(context.folder, &entry.name),
                kind: entry.kind,
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

fn render_m3u(plan: &LineupPlan, context: &ReportContext<'_>) -> String {
    M3uPlaylist { plan, context }.to_string()
}

struct M3uPlaylist<'a> {
    plan: &'a LineupPlan,
    context: &'a ReportContext<'a>,
}

impl fmt::Display for M3uPlaylist<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#EXTM3U")?;
        for item in &self.plan.items {
            writeln!(f, "#EXTINF:-1,{}", item.original.name)?;
            writeln!(f, "{}", self.context.item_path(item))?;
        }
        Ok(())
    }
}

/// Human-readable summary of what a run would do.
#[must_use]
pub fn render_preview(plan: &LineupPlan) -> String {
    Preview(plan).to_string()
}

struct Preview<'a>(&'a LineupPlan);

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.0;
        writeln!(f, "Preview:\n\nMatched items:")?;
        for item in &plan.items {
            writeln!(f, "{}. {} ({})", item.rank, item.new_name, item.kind())?;
        }
        writeln!(f)?;

        if !plan.missed.is_empty() {
            writeln!(f, "Missed items ({} total):", plan.missed.len())?;
            for missed in &plan.missed {
                writeln!(f, "  - {} (line {})", missed.raw_text, missed.line_index)?;
            }
            writeln!(f)?;
        }

        if !plan.unused.is_empty() {
            writeln!(f, "Unused items in folder ({} total):", plan.unused.len())?;
            for entry in &plan.unused {
                writeln!(f, "  - {} ({})", entry.name, entry.kind)?;
            }
        }

        Ok(())
    }
}

/// What an overwrite confirmation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// The default `Result` folder already exists.
    ResultFolder,
    /// The report file already exists.
    ReportFile,
}

/// Questions the exporter may need answered.
pub trait ExportPrompt {
    /// Whether the existing `path` may be reused or overwritten.
    fn confirm_overwrite(&mut self, path: &Path, conflict: Conflict) -> Result<bool>;

    /// Another result folder name inside the source folder. `None` or an
    /// empty name cancels.
    fn new_folder_name(&mut self) -> Result<Option<String>>;
}

/// Answers yes to every overwrite question.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl ExportPrompt for AssumeYes {
    fn confirm_overwrite(&mut self, _path: &Path, _conflict: Conflict) -> Result<bool> {
        Ok(true)
    }

    fn new_folder_name(&mut self) -> Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub format: OutputFormat,
    pub filename_mode: FilenameMode,
    pub mode: ExportMode,
    pub output_dir: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    /// Only reported.
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFailure {
    pub name: String,
    pub destination: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub result_dir: PathBuf,
    pub report_path: PathBuf,
    pub copied: usize,
    pub failures: Vec<CopyFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Completed(ExportSummary),
    /// The user declined an overwrite. Nothing was written.
    Cancelled,
}

/// Pick the result folder, asking when the default one already exists.
fn resolve_result_dir(
    folder: &Path,
    settings: &ExportSettings,
    prompt: &mut dyn ExportPrompt,
) -> Result<Option<PathBuf>> {
    if let Some(dir) = &settings.output_dir {
        return Ok(Some(dir.clone()));
    }
    if settings.mode == ExportMode::ListOnly {
        return Ok(Some(folder.to_path_buf()));
    }

    let default_dir = folder.join(RESULT_DIR_NAME);
    if !default_dir.exists() || prompt.confirm_overwrite(&default_dir, Conflict::ResultFolder)? {
        return Ok(Some(default_dir));
    }

    match prompt.new_folder_name()? {
        Some(name) if !name.trim().is_empty() => Ok(Some(folder.join(name.trim()))),
        _ => Ok(None),
    }
}

/// Export `plan`, whose items come from `folder`.
pub fn export(
    folder: &Path,
    plan: &LineupPlan,
    settings: &ExportSettings,
    prompt: &mut dyn ExportPrompt,
) -> Result<ExportOutcome> {
    let Some(result_dir) = resolve_result_dir(folder, settings, prompt)? else {
        info!("Export cancelled: no result folder chosen");
        return Ok(ExportOutcome::Cancelled);
    };

    let report_path = settings
        .output_file
        .clone()
        .unwrap_or_else(|| result_dir.join(settings.format.default_file_name()));
    if report_path.exists() && !prompt.confirm_overwrite(&report_path, Conflict::ReportFile)? {
        info!("Export cancelled: kept existing {}", report_path.display());
        return Ok(ExportOutcome::Cancelled);
    }

    let mut copied = 0;
    let mut failures = Vec::new();
    if settings.mode == ExportMode::Full {
        fs::create_dir_all(&result_dir)?;
        failures = copy_items(folder, &result_dir, plan);
        copied = plan.items.len() - failures.len();
    }

    let context = ReportContext {
        folder,
        result_dir: &result_dir,
        threshold: settings.threshold,
        mode: settings.mode,
        filename_mode: settings.filename_mode,
    };
    let report = render_report(plan, &context, settings.format)?;
    if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&report_path, report)?;
    info!("Wrote report {}", report_path.display());

    Ok(ExportOutcome::Completed(ExportSummary {
        result_dir,
        report_path,
        copied,
        failures,
    }))
}

/// Copy every planned item into `result_dir`, returning the failures in
/// rank order.
///
/// Items whose new names collide are copied one after another in rank
/// order, so the highest rank ends up at the shared destination.
fn copy_items(folder: &Path, result_dir: &Path, plan: &LineupPlan) -> Vec<CopyFailure> {
    let copy = |item: &PlannedItem| copy_item(folder, result_dir, item);

    if has_shared_destinations(&plan.items) {
        warn!("Several matched items share a new name; later ranks overwrite earlier ones");
        plan.items.iter().filter_map(copy).collect()
    } else {
        plan.items.par_iter().filter_map(copy).collect()
    }
}

/// Whether two items would be copied to the same name. Names differing
/// only in case count as the same.
fn has_shared_destinations(items: &[PlannedItem]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    !items
        .iter()
        .all(|item| seen.insert(item.new_name.to_lowercase()))
}

fn copy_item(folder: &Path, result_dir: &Path, item: &PlannedItem) -> Option<CopyFailure> {
    let source = folder.join(&item.original.name);
    let destination = result_dir.join(&item.new_name);
    let copied = match item.kind() {
        EntryKind::File => fs::copy(&source, &destination).map(|_| ()),
        EntryKind::Directory => copy_tree(&source, &destination),
    };

    copied.err().map(|e| {
        warn!(
            "Failed to copy {} to {}: {e}",
            source.display(),
            destination.display()
        );
        CopyFailure {
            name: item.original.name.clone(),
            destination,
            error: e.to_string(),
        }
    })
}

/// Recursively copy the directory `source` to `destination`.
fn copy_tree(source: &Path, destination: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry.path().strip_prefix(source).map_err(io::Error::other)?;
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
