//! # Shell Completion Module
//!
//! - Generation of completion scripts for various shells
//! - Dynamic completion of tag and playlist names from the catalog
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! scaffony completion bash > ~/.local/share/bash-completion/completions/scaffony
//!
//! # Generate zsh completions
//! scaffony completion zsh > ~/.config/zsh/completions/_scaffony
//! ```

use crate::model::CatalogDocument;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io;

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

pub fn shell_to_completion_shell(shell: &crate::cli::Shell) -> CompletionShell {
    match shell {
        crate::cli::Shell::Bash => CompletionShell::Bash,
        crate::cli::Shell::Zsh => CompletionShell::Zsh,
        crate::cli::Shell::Fish => CompletionShell::Fish,
        crate::cli::Shell::PowerShell => CompletionShell::PowerShell,
        crate::cli::Shell::Elvish => CompletionShell::Elvish,
    }
}

pub fn tag_completions(document: &CatalogDocument) -> Vec<String> {
    document.tags.iter().map(|tag| tag.name.clone()).collect()
}

pub fn playlist_completions(document: &CatalogDocument) -> Vec<String> {
    document
        .playlists
        .iter()
        .map(|playlist| playlist.name.clone())
        .collect()
}

/// Quote a completion candidate for the target shell.
pub fn format_completion(candidate: &str, fish: bool) -> String {
    if fish {
        // Fish handles escaping automatically, don't add quotes
        return candidate.to_string();
    }
    if candidate.contains(' ') || candidate.contains('\t') || candidate.contains('\n') {
        format!("\"{}\"", candidate.replace('"', "\\\""))
    } else {
        candidate.to_string()
    }
}
