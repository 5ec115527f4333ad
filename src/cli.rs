//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `scaffony` binary.
//!
//! ## Commands
//!
//! - `library`: set, show or clear the active library root
//! - `scan`: index new audio files under the library root
//! - `track`: list tracks (optionally through a playlist), edit display data
//! - `tag`: manage tag definitions and assign tags to tracks
//! - `playlist`: manage filter playlists
//! - `completion`: generate shell completion scripts
//!
//! ## Examples
//!
//! ```bash
//! scaffony library set ~/Music
//! scaffony scan
//! scaffony tag assign ~/Music/album/song.flac rate:5 yes
//! scaffony track list --playlist "Good stuff"
//! ```

use crate::model::{Filter, TagState};
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
#[derive(Parser)]
#[command(name = "scaffony")]
#[command(about = "Scaffony: personal music library indexer with tags and filter playlists")]
#[command(version)]
pub struct Args {
    /// File holding the active library root
    ///
    /// Defaults to `scaffony_current_library.txt` in the platform data
    /// directory.
    #[arg(long, global = true, env = "SCAFFONY_CACHE_FILE", value_hint = clap::ValueHint::FilePath)]
    pub cache_file: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage the active library root
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },

    /// Scan the library root for new audio files
    ///
    /// Adds tracks not yet in the catalog and switches known tracks to a
    /// better-quality copy when one appears (aac < mp3 < ogg < wav < flac).
    /// Tracks whose files disappeared are kept.
    Scan,

    /// List and edit tracks
    Track {
        #[command(subcommand)]
        action: TrackAction,
    },

    /// Manage tag definitions and assignments
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage filter playlists
    Playlist {
        #[command(subcommand)]
        action: PlaylistAction,
    },

    /// Generate shell completions
    ///
    /// Usage: scaffony completion bash > ~/.local/share/bash-completion/completions/scaffony
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// List tag names for completion (hidden command)
    #[command(hide = true)]
    CompleteTags {
        #[arg(long)]
        fish: bool,
    },

    /// List playlist names for completion (hidden command)
    #[command(hide = true)]
    CompletePlaylists {
        #[arg(long)]
        fish: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum LibraryAction {
    /// Make PATH the active library root
    ///
    /// Relative paths are resolved against the current directory. The
    /// directory must exist.
    Set {
        #[arg(value_hint = clap::ValueHint::DirPath)]
        path: PathBuf,
    },

    /// Print the active library root and catalog summary
    Show,

    /// Forget the active library root
    Unset,
}

#[derive(Subcommand, Debug)]
pub enum TrackAction {
    /// List catalogued tracks
    List {
        /// Only tracks matching this playlist's filters
        #[arg(short, long)]
        playlist: Option<String>,
    },

    /// Change the display name or artist of a track
    Edit {
        /// Path of the track as stored in the catalog
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        artist: Option<String>,
    },
}

/// Display attributes shared by tags and playlists.
#[derive(ClapArgs, Debug, Clone)]
pub struct Style {
    /// Color as a hex string, e.g. #ff69b4
    #[arg(long)]
    pub color: Option<String>,

    /// Lucide icon name, e.g. star
    #[arg(long)]
    pub icon: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TagAction {
    /// List tag definitions
    List,

    /// List tag categories (the part before the colon)
    Categories,

    /// Define a new tag, e.g. mood:happy
    Add {
        name: String,
        #[command(flatten)]
        style: Style,
    },

    /// Rename or restyle a tag; assignments follow the new name
    Edit {
        old_name: String,
        new_name: String,
        #[command(flatten)]
        style: Style,
    },

    /// Delete a tag and all of its assignments
    Delete { name: String },

    /// Assign, reject or clear a tag on one track
    Assign {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,
        tag: String,
        state: AssignState,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum AssignState {
    /// The tag applies
    Yes,
    /// The tag explicitly does not apply
    No,
    /// Undecided
    Clear,
}

impl From<AssignState> for TagState {
    fn from(state: AssignState) -> Self {
        match state {
            AssignState::Yes => TagState::Assigned,
            AssignState::No => TagState::Rejected,
            AssignState::Clear => TagState::Undecided,
        }
    }
}

/// Filters given on the command line, applied in the order listed here.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Track must have this tag
    #[arg(long = "include-tag")]
    pub include_tags: Vec<String>,

    /// Track must not have this tag
    #[arg(long = "exclude-tag")]
    pub exclude_tags: Vec<String>,

    /// Track must have some tag of this category
    #[arg(long = "include-category")]
    pub include_categories: Vec<String>,

    /// Track must have no tag of this category
    #[arg(long = "exclude-category")]
    pub exclude_categories: Vec<String>,
}

impl FilterArgs {
    pub fn is_empty(&self) -> bool {
        self.include_tags.is_empty()
            && self.exclude_tags.is_empty()
            && self.include_categories.is_empty()
            && self.exclude_categories.is_empty()
    }

    pub fn to_filters(&self) -> Vec<Filter> {
        let include_tags = self.include_tags.iter().map(Filter::includes_tag);
        let exclude_tags = self.exclude_tags.iter().map(Filter::excludes_tag);
        let include_categories = self.include_categories.iter().map(Filter::includes_category);
        let exclude_categories = self.exclude_categories.iter().map(Filter::excludes_category);
        include_tags
            .chain(exclude_tags)
            .chain(include_categories)
            .chain(exclude_categories)
            .collect()
    }
}

#[derive(Subcommand, Debug)]
pub enum PlaylistAction {
    /// List playlists and their filters
    List,

    /// Print the tracks a playlist matches
    Show { name: String },

    /// Define a new playlist
    Add {
        name: String,
        #[command(flatten)]
        style: Style,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Replace a playlist's name, style or filters
    ///
    /// Options left out keep their current value.
    Edit {
        old_name: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        style: Style,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Delete a playlist
    Delete { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_playlist_add_filters() {
        let args = Args::try_parse_from([
            "scaffony",
            "playlist",
            "add",
            "Calm",
            "--color",
            "#69ffec",
            "--include-tag",
            "energy:calm",
            "--exclude-category",
            "rate",
        ])
        .unwrap();

        match args.command {
            Command::Playlist {
                action: PlaylistAction::Add { name, style, filters },
            } => {
                assert_eq!(name, "Calm");
                assert_eq!(style.color.as_deref(), Some("#69ffec"));
                assert_eq!(style.icon, None);
                assert_eq!(filters.include_tags, vec!["energy:calm".to_string()]);
                assert_eq!(filters.exclude_categories, vec!["rate".to_string()]);
            }
            _ => panic!("expected playlist add"),
        }
    }

    #[test]
    fn test_filter_args_order() {
        let args = FilterArgs {
            include_tags: vec!["rate:5".into()],
            exclude_categories: vec!["mood".into()],
            ..Default::default()
        };
        assert!(!args.is_empty());
        assert_eq!(
            args.to_filters(),
            vec![Filter::includes_tag("rate:5"), Filter::excludes_category("mood")]
        );
        assert!(FilterArgs::default().to_filters().is_empty());
    }

    #[test]
    fn test_parse_tag_assign() {
        let args =
            Args::try_parse_from(["scaffony", "tag", "assign", "/m/a.flac", "rate:5", "no"]).unwrap();
        match args.command {
            Command::Tag {
                action: TagAction::Assign { tag, state, .. },
            } => {
                assert_eq!(tag, "rate:5");
                assert_eq!(state, AssignState::No);
            }
            _ => panic!("expected tag assign"),
        }
    }

    #[test]
    fn test_global_cache_file_flag() {
        let args =
            Args::try_parse_from(["scaffony", "scan", "--cache-file", "/tmp/cache.txt"]).unwrap();
        assert_eq!(args.cache_file, Some(PathBuf::from("/tmp/cache.txt")));
    }
}
