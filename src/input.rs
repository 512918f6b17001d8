//! # Input Module
//!
//! Loads the two inputs of a run: the wanted list and the folder listing.
//!
//! ## Wanted List Sources
//!
//! - plain text file, one entry per line (`-` reads stdin)
//! - first column of the first worksheet of a spreadsheet (xlsx, xls, ods)
//! - inline multi-line text
//!
//! Blank lines and empty cells are skipped, every kept entry is trimmed, and
//! entries are numbered from 1 in the order they were kept.

use crate::error::{LineupError, Result};
use crate::matcher::{EntryKind, FilesystemEntry, WantedEntry};
use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, warn};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use walkdir::WalkDir;

/// Split free-form text into wanted entries.
#[must_use]
pub fn parse_lines(text: &str) -> Vec<WantedEntry> {
    number_entries(text.lines())
}

fn number_entries<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<WantedEntry> {
    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .enumerate()
        .map(|(i, item)| WantedEntry::new(i + 1, item))
        .collect()
}

/// Read a UTF-8 list file, or stdin when `path` is `-`.
pub fn read_list_file(path: &Path) -> Result<Vec<WantedEntry>> {
    let read_error = |source| LineupError::ListRead {
        path: path.to_path_buf(),
        source,
    };

    let text = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).map_err(read_error)?;
        buffer
    } else {
        fs::read_to_string(path).map_err(read_error)?
    };

    let entries = parse_lines(&text);
    debug!("Read {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Read column A of the first worksheet.
pub fn read_spreadsheet(path: &Path) -> Result<Vec<WantedEntry>> {
    let spreadsheet_error = |message: String| LineupError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_error("workbook has no worksheet".to_string()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    // The used range may start right of column A, in which case A is empty.
    let cells: Vec<String> = match range.start() {
        Some((_, 0)) => range
            .rows()
            .filter_map(|row| row.first())
            .filter(|cell| !matches!(cell, Data::Empty))
            .map(ToString::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let entries = number_entries(cells.iter().map(String::as_str));
    debug!("Read {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Fail on an empty wanted list.
pub fn ensure_not_empty(entries: &[WantedEntry]) -> Result<()> {
    if entries.is_empty() {
        return Err(LineupError::EmptyList);
    }
    Ok(())
}

/// Fail unless `path` is an existing directory.
pub fn validate_folder(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(LineupError::FolderNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(LineupError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// List the direct children of `folder`, sorted by name.
///
/// With `ignore_directories` only files are returned. Symlinks are
/// classified by what they point to.
pub fn list_folder(folder: &Path, ignore_directories: bool) -> Result<Vec<FilesystemEntry>> {
    validate_folder(folder)?;

    let mut entries = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();

        let Some(name) = entry.file_name().to_str() else {
            warn!("Skipping non UTF-8 name: {}", path.display());
            continue;
        };

        let kind = if path.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        if ignore_directories && (kind == EntryKind::Directory || !path.is_file()) {
            continue;
        }

        entries.push(FilesystemEntry {
            name: name.to_string(),
            kind,
        });
    }

    debug!("Listed {} entries in {}", entries.len(), folder.display());
    Ok(entries)
}
