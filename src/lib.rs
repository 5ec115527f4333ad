//! Personal music library indexer with tags and filter playlists.
//!
//! Core modules:
//! - [`config`] - Active library root pointer and data directory
//! - [`model`] - Catalog document types and forward-compatible loading
//! - [`store`] - Loading and persisting the catalog
//! - [`scanner`] - Recursive scanning with quality-based deduplication
//! - [`tags`] - Tag definitions, cascading renames, per-track assignment
//! - [`playlists`] - Playlist definitions and filter evaluation
//!
//! ### Supporting Modules
//!
//! - [`error`] - Typed library errors
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use scaffony::config::LibraryPathCache;
//! use scaffony::model::{Filter, PlaylistEntry, TagState};
//! use scaffony::store::CatalogStore;
//! use std::path::Path;
//!
//! let cache = LibraryPathCache::new()?;
//! cache.set_library_path(Path::new("/home/user/Music"));
//!
//! let mut store = CatalogStore::new(cache);
//! store.read_data()?;
//! store.scan()?;
//!
//! store.set_entry_tag("/home/user/Music/album/song.flac", "rate:5", TagState::Assigned)?;
//! store.add_playlist(PlaylistEntry::new(
//!     "Top rated",
//!     "#FFD700",
//!     "star",
//!     vec![Filter::includes_tag("rate:5")],
//! ))?;
//! for track in store.playlist_tracks("Top rated")? {
//!     println!("{} - {}", track.artist, track.name);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Files
//!
//! - `{data-dir}/scaffony/scaffony_current_library.txt`: the active library root
//! - `{library-root}/scaffony_data.json`: the catalog, 4-space pretty JSON
//!
//! Every mutation rewrites the catalog file whole.

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod model;
pub mod playlists;
pub mod scanner;
pub mod store;
pub mod tags;

pub use error::{LibraryError, Result};
pub use model::{CatalogDocument, Filter, LibraryEntry, PlaylistEntry, TagEntry, TagState};
pub use scanner::{CancelToken, ScanReport};
pub use store::{CatalogStore, SharedStore};
