//! # Shell Completion Module
//!
//! Generates completion scripts through clap's completion system.
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! lineup completion bash > ~/.local/share/bash-completion/completions/lineup
//!
//! # Generate zsh completions
//! lineup completion zsh > ~/.config/zsh/completions/_lineup
//! ```

use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::Write;

/// Write completions for `cmd` to `out`
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

/// Convert our CLI shell enum to clap_complete's shell enum
pub fn shell_to_completion_shell(shell: &crate::cli::Shell) -> CompletionShell {
    match shell {
        crate::cli::Shell::Bash => CompletionShell::Bash,
        crate::cli::Shell::Zsh => CompletionShell::Zsh,
        crate::cli::Shell::Fish => CompletionShell::Fish,
        crate::cli::Shell::PowerShell => CompletionShell::PowerShell,
        crate::cli::Shell::Elvish => CompletionShell::Elvish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_shell_conversion() {
        assert_eq!(
            shell_to_completion_shell(&crate::cli::Shell::Bash),
            CompletionShell::Bash
        );
        assert_eq!(
            shell_to_completion_shell(&crate::cli::Shell::Fish),
            CompletionShell::Fish
        );
    }

    #[test]
    fn test_bash_script_mentions_subcommands() {
        let mut cmd = crate::cli::Args::command();
        let mut out = Vec::new();
        generate_completions(CompletionShell::Bash, &mut cmd, &mut out);

        let script = String::from_utf8_lossy(&out);
        assert!(script.contains("_lineup"));
        assert!(script.contains("preview"));
    }
}
