//! Terminal prompts for the interactive parts of a run.
//!
//! [`TerminalResolver`] lets the user pick among ambiguous candidates and
//! [`TerminalPrompt`] answers the exporter's overwrite questions. Both use
//! `dialoguer` and need an interactive terminal.

use crate::error::{LineupError, Result};
use crate::export::{Conflict, ExportPrompt};
use crate::matcher::{AmbiguityResolver, Candidate, WantedEntry};
use dialoguer::{Confirm, Input, Select};
use log::warn;
use std::path::Path;

const SKIP_LABEL: &str = "(skip this item)";

/// Asks the user to choose among candidates.
///
/// Escape, the skip entry, or a terminal failure all decline the choice, so
/// the wanted entry is reported as missed.
#[derive(Debug, Default)]
pub struct TerminalResolver;

impl AmbiguityResolver for TerminalResolver {
    fn resolve(&mut self, wanted: &WantedEntry, candidates: &[Candidate]) -> Option<usize> {
        let mut items: Vec<String> = candidates
            .iter()
            .map(|c| format!("{}  ({:.2})", c.entry.name, c.score))
            .collect();
        items.push(SKIP_LABEL.to_string());

        let selection = Select::new()
            .with_prompt(format!(
                "Several matches for '{}' (line {})",
                wanted.raw_text, wanted.line_index
            ))
            .items(&items)
            .default(0)
            .interact_opt();

        match selection {
            Ok(Some(index)) if index < candidates.len() => Some(index),
            Ok(_) => None,
            Err(e) => {
                warn!("Could not ask about '{}': {e}", wanted.raw_text);
                None
            }
        }
    }
}

/// Asks overwrite questions on the terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl ExportPrompt for TerminalPrompt {
    fn confirm_overwrite(&mut self, path: &Path, conflict: Conflict) -> Result<bool> {
        let question = match conflict {
            Conflict::ResultFolder => format!(
                "'{}' already exists. Copy into it anyway? (No lets you pick another folder name)",
                path.display()
            ),
            Conflict::ReportFile => {
                format!("Output file '{}' already exists. Overwrite it?", path.display())
            }
        };

        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .map_err(|e| LineupError::Prompt(e.to_string()))
    }

    fn new_folder_name(&mut self) -> Result<Option<String>> {
        let name: String = Input::new()
            .with_prompt("New output folder name (empty to cancel)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| LineupError::Prompt(e.to_string()))?;

        let trimmed = name.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }
}
