//! # Lineup
//!
//! Matches an ordered list of names against the items of a folder, then
//! copies the matched items out under numbered names and writes a report.
//!
//! ## Usage
//!
//! ```bash
//! # See what would happen
//! lineup preview ~/Music/Album --list order.txt
//!
//! # Copy into ~/Music/Album/Result and write Result.txt
//! lineup run ~/Music/Album --list order.txt
//!
//! # Only write an M3U playlist in list order
//! lineup run ~/Music/Album --sheet order.xlsx --list-only --format m3u
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use lineup::cli::{self, ConfigAction, ListSource, RunArgs};
use lineup::config::{self, LineupConfig};
use lineup::export::{self, AssumeYes, ExportMode, ExportOutcome, ExportPrompt};
use lineup::matcher::WantedEntry;
use lineup::plan::{self, LineupPlan};
use lineup::prompt::{TerminalPrompt, TerminalResolver};
use lineup::{completion, input};
use log::{debug, info};
use std::io;
use std::path::Path;

fn read_wanted(source: &ListSource) -> Result<Vec<WantedEntry>> {
    if let Some(path) = &source.list {
        return input::read_list_file(path).context("Could not load the wanted list");
    }
    if let Some(path) = &source.sheet {
        return input::read_spreadsheet(path).context("Could not load the wanted list");
    }
    Ok(input::parse_lines(source.text.as_deref().unwrap_or_default()))
}

/// Merge config file and flags, then match.
fn prepare(args: &RunArgs, config_path: Option<&Path>) -> Result<(LineupConfig, LineupPlan)> {
    let mut config = LineupConfig::load(config_path)?;
    args.apply_to(&mut config);
    debug!("Effective configuration: {config:?}");

    input::validate_folder(&args.folder)?;
    let wanted = read_wanted(&args.source)?;

    let plan = plan::plan_folder(&args.folder, &wanted, &config, &mut TerminalResolver)?;
    Ok((config, plan))
}

fn run(args: &RunArgs, config_path: Option<&Path>) -> Result<()> {
    let (config, plan) = prepare(args, config_path)?;
    let settings = config.export_settings();

    let mut prompt: Box<dyn ExportPrompt> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompt)
    };

    match export::export(&args.folder, &plan, &settings, prompt.as_mut())? {
        ExportOutcome::Cancelled => println!("Operation cancelled."),
        ExportOutcome::Completed(summary) => {
            for failure in &summary.failures {
                eprintln!(
                    "Failed to copy {} to {}: {}",
                    failure.name,
                    failure.destination.display(),
                    failure.error
                );
            }
            match settings.mode {
                ExportMode::ListOnly => println!("List written to {}", summary.report_path.display()),
                ExportMode::Full => println!(
                    "Done: {} item(s) copied to {}, report saved as {}",
                    summary.copied,
                    summary.result_dir.display(),
                    summary.report_path.display()
                ),
            }
            if !plan.missed.is_empty() {
                println!("{} item(s) from the list were not found", plan.missed.len());
            }
        }
    }

    Ok(())
}

fn config_command(action: &ConfigAction, config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => config::get_config_path()?,
    };

    match action {
        ConfigAction::Show => {
            let config = LineupConfig::load(config_path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(anyhow::anyhow!(
                    "{} already exists. Use --force to replace it.",
                    path.display()
                ));
            }
            LineupConfig::default()
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
        }
        ConfigAction::Path => println!("{}", path.display()),
    }

    Ok(())
}

/// Main entry point for lineup.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug lineup preview ...` - Show every match decision
/// - `RUST_LOG=lineup::export=info lineup run ...` - Module-specific logging
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let config_path = args.config.as_deref();

    match &args.command {
        cli::Command::Run(run_args) => {
            info!("Lining up {}", run_args.folder.display());
            run(run_args, config_path)?;
        }
        cli::Command::Preview(run_args) => {
            let (_, plan) = prepare(run_args, config_path)?;
            print!("{}", export::render_preview(&plan));
        }
        cli::Command::Config { action } => config_command(action, config_path)?,
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(
                completion::shell_to_completion_shell(shell),
                &mut cmd,
                &mut io::stdout(),
            );
        }
    }

    Ok(())
}
