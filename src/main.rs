//! # Scaffony
//!
//! Command-line front end for the library engine.
//!
//! ## Usage
//!
//! ```bash
//! # Choose the library and index it
//! scaffony library set /path/to/music
//! scaffony scan
//!
//! # Tag tracks and browse playlists
//! scaffony tag assign /path/to/music/song.flac mood:happy yes
//! scaffony playlist show "Not rated"
//! ```

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use log::{info, warn};
use path_absolutize::Absolutize;
use scaffony::cli::{self, LibraryAction, PlaylistAction, TagAction, TrackAction};
use scaffony::completion;
use scaffony::config::LibraryPathCache;
use scaffony::{CatalogDocument, CatalogStore, LibraryEntry, LibraryError, PlaylistEntry, TagEntry};
use std::path::{Path, PathBuf};

const DEFAULT_COLOR: &str = "#888888";
const DEFAULT_TAG_ICON: &str = "tag";
const DEFAULT_PLAYLIST_ICON: &str = "list-music";

fn open_store(cache_file: Option<PathBuf>) -> Result<CatalogStore> {
    let cache = match cache_file {
        Some(path) => LibraryPathCache::with_cache_file(path),
        None => LibraryPathCache::new()?,
    };
    Ok(CatalogStore::new(cache))
}

/// Open the store and load the active library's catalog.
fn load_store(cache_file: Option<PathBuf>) -> Result<CatalogStore> {
    let mut store = open_store(cache_file)?;
    let loaded = store
        .read_data()
        .context("Failed to load the library catalog")?;
    if !loaded {
        bail!("No library set. Run `scaffony library set <PATH>` first.");
    }
    Ok(store)
}

/// Read-only view of the catalog for shell completion.
fn peek_catalog(cache_file: Option<PathBuf>) -> Option<CatalogDocument> {
    open_store(cache_file).ok()?.peek_document().ok().flatten()
}

fn warn_if_unsaved(persisted: bool) {
    if !persisted {
        warn!("Change applied in memory only: no library root is set");
    }
}

fn path_arg(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_owned)
        .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))
}

fn print_track(entry: &LibraryEntry) {
    let assigned: Vec<&str> = entry
        .tags
        .iter()
        .filter(|(_, assigned)| **assigned)
        .map(|(name, _)| name.as_str())
        .collect();
    println!("{} - {}", entry.artist, entry.name);
    println!("    {}", entry.path);
    if !assigned.is_empty() {
        println!("    [{}]", assigned.join(", "));
    }
}

fn run_library(action: LibraryAction, cache_file: Option<PathBuf>) -> Result<()> {
    let mut store = open_store(cache_file)?;
    match action {
        LibraryAction::Set { path } => {
            let absolute = path
                .absolutize()
                .with_context(|| format!("Failed to resolve {}", path.display()))?
                .into_owned();
            if !store.cache().set_library_path(&absolute) {
                bail!("Cannot use {} as library root", absolute.display());
            }
            store.read_data()?;
            println!("Library set to {}", absolute.display());
        }
        LibraryAction::Show => match store.library_root() {
            Some(root) => {
                store.read_data()?;
                let document = store.document();
                println!("Library: {}", root.display());
                println!(
                    "{} tracks, {} tags, {} playlists",
                    document.library.len(),
                    document.tags.len(),
                    document.playlists.len()
                );
            }
            None => println!("No library set"),
        },
        LibraryAction::Unset => {
            store
                .cache()
                .clear_library_path()
                .context("Failed to clear the library cache")?;
            println!("Library unset");
        }
    }
    Ok(())
}

fn run_track(action: TrackAction, store: &mut CatalogStore) -> Result<()> {
    match action {
        TrackAction::List { playlist } => {
            let tracks: Vec<&LibraryEntry> = match playlist {
                Some(name) => store.playlist_tracks(&name)?,
                None => store.document().library.iter().collect(),
            };
            for track in &tracks {
                print_track(track);
            }
            println!("{} tracks", tracks.len());
        }
        TrackAction::Edit { path, name, artist } => {
            let path = path_arg(&path)?;
            warn_if_unsaved(store.edit_entry(&path, name, artist)?);
        }
    }
    Ok(())
}

fn run_tag(action: TagAction, store: &mut CatalogStore) -> Result<()> {
    match action {
        TagAction::List => {
            for tag in &store.document().tags {
                println!("{}\t{}\t{}", tag.name, tag.color_hex, tag.lucide_icon);
            }
        }
        TagAction::Categories => {
            for category in store.tag_categories() {
                println!("{category}");
            }
        }
        TagAction::Add { name, style } => {
            let tag = TagEntry::new(
                name,
                style.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
                style.icon.unwrap_or_else(|| DEFAULT_TAG_ICON.to_string()),
            );
            warn_if_unsaved(store.add_tag_checked(tag)?);
        }
        TagAction::Edit {
            old_name,
            new_name,
            style,
        } => {
            let current = store
                .document()
                .tag(&old_name)
                .cloned()
                .ok_or_else(|| LibraryError::TagNotFound(old_name.clone()))?;
            let tag = TagEntry::new(
                new_name,
                style.color.unwrap_or(current.color_hex),
                style.icon.unwrap_or(current.lucide_icon),
            );
            warn_if_unsaved(store.edit_tag(&old_name, tag)?);
        }
        TagAction::Delete { name } => {
            warn_if_unsaved(store.delete_tag(&name)?);
        }
        TagAction::Assign { path, tag, state } => {
            let path = path_arg(&path)?;
            if store.document().tag(&tag).is_none() {
                warn!("Tag {tag} is not defined; it will not match any playlist filter");
            }
            warn_if_unsaved(store.set_entry_tag(&path, &tag, state.into())?);
        }
    }
    Ok(())
}

fn run_playlist(action: PlaylistAction, store: &mut CatalogStore) -> Result<()> {
    match action {
        PlaylistAction::List => {
            for playlist in &store.document().playlists {
                println!(
                    "{}\t{}\t{}\t{}",
                    playlist.name,
                    playlist.color_hex,
                    playlist.lucide_icon,
                    serde_json::to_string(&playlist.filters)?
                );
            }
        }
        PlaylistAction::Show { name } => {
            let tracks = store.playlist_tracks(&name)?;
            for track in &tracks {
                print_track(track);
            }
            println!("{} tracks", tracks.len());
        }
        PlaylistAction::Add {
            name,
            style,
            filters,
        } => {
            let playlist = PlaylistEntry::new(
                name,
                style.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
                style.icon.unwrap_or_else(|| DEFAULT_PLAYLIST_ICON.to_string()),
                filters.to_filters(),
            );
            warn_if_unsaved(store.add_playlist_checked(playlist)?);
        }
        PlaylistAction::Edit {
            old_name,
            name,
            style,
            filters,
        } => {
            let current = store
                .document()
                .playlist(&old_name)
                .cloned()
                .ok_or_else(|| LibraryError::PlaylistNotFound(old_name.clone()))?;
            let playlist = PlaylistEntry::new(
                name.unwrap_or_else(|| current.name.clone()),
                style.color.unwrap_or(current.color_hex),
                style.icon.unwrap_or(current.lucide_icon),
                if filters.is_empty() {
                    current.filters
                } else {
                    filters.to_filters()
                },
            );
            warn_if_unsaved(store.edit_playlist(&old_name, playlist)?);
        }
        PlaylistAction::Delete { name } => {
            warn_if_unsaved(store.delete_playlist(&name)?);
        }
    }
    Ok(())
}

/// Parses command-line arguments and routes them to the library engine.
///
/// Logging goes through `env_logger`, controlled via `RUST_LOG`:
/// - `RUST_LOG=info scaffony scan` - Scan progress
/// - `RUST_LOG=scaffony::scanner=debug scaffony scan` - Per-file decisions
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let cache_file = args.cache_file;

    match args.command {
        cli::Command::Library { action } => run_library(action, cache_file)?,
        cli::Command::Scan => {
            let mut store = load_store(cache_file)?;
            let report = store.scan()?.context("Library root disappeared before scanning")?;
            info!("Scan report: {report:?}");
            println!(
                "Scanned {} directories: {} new tracks, {} upgraded, {} symlinks skipped",
                report.directories, report.added, report.upgraded, report.skipped_symlinks
            );
        }
        cli::Command::Track { action } => run_track(action, &mut load_store(cache_file)?)?,
        cli::Command::Tag { action } => run_tag(action, &mut load_store(cache_file)?)?,
        cli::Command::Playlist { action } => run_playlist(action, &mut load_store(cache_file)?)?,
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(&shell), &mut cmd);
        }
        cli::Command::CompleteTags { fish } => {
            // Completion must stay silent and never touch the library
            if let Some(document) = peek_catalog(cache_file) {
                for name in completion::tag_completions(&document) {
                    println!("{}", completion::format_completion(&name, fish));
                }
            }
        }
        cli::Command::CompletePlaylists { fish } => {
            if let Some(document) = peek_catalog(cache_file) {
                for name in completion::playlist_completions(&document) {
                    println!("{}", completion::format_completion(&name, fish));
                }
            }
        }
    }

    Ok(())
}
