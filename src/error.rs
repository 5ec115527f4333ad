//! # Error Module
//!
//! Typed errors for the library engine. A missing library root is not an error
//! here: operations report it as `Ok(false)` / `Ok(None)` because it is the normal
//! first-run state.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while loading, scanning or editing a catalog.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Disk read/write failure on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file exists but is not a valid catalog document.
    #[error("Malformed catalog document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Tag with name {0} not found.")]
    TagNotFound(String),

    #[error("Playlist with name {0} not found.")]
    PlaylistNotFound(String),

    #[error("Library entry with path {0} not found.")]
    EntryNotFound(String),

    #[error("Tag with name {0} already exists.")]
    DuplicateTag(String),

    #[error("Playlist with name {0} already exists.")]
    DuplicatePlaylist(String),
}

impl LibraryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the "caller asked for something that does not exist" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TagNotFound(_) | Self::PlaylistNotFound(_) | Self::EntryNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
