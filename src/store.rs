//! # Catalog Store
//!
//! Owns the in-memory [`CatalogDocument`] and mirrors it to
//! `{library-root}/scaffony_data.json`. The document is loaded once, mutated in
//! memory, and written back whole after every mutation.
//!
//! Every mutating method takes `&mut self`, so one store has one writer at a
//! time. Callers that share a store between threads wrap it in a
//! [`SharedStore`] and hold the lock for the full read-modify-write cycle.

use crate::config::{write_in_place, LibraryPathCache};
use crate::error::{LibraryError, Result};
use crate::model::CatalogDocument;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Fixed name of the catalog file inside the library root.
pub const DATA_FILE_NAME: &str = "scaffony_data.json";

pub type SubscriptionId = u64;

type Observer = Box<dyn Fn(&CatalogDocument) + Send>;

/// A store shared between threads.
pub type SharedStore = Arc<Mutex<CatalogStore>>;

pub struct CatalogStore {
    cache: LibraryPathCache,
    document: CatalogDocument,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
}

impl fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogStore")
            .field("cache", &self.cache)
            .field("document", &self.document)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl CatalogStore {
    /// A store holding the starter document until [`CatalogStore::read_data`]
    /// loads the real one.
    pub fn new(cache: LibraryPathCache) -> Self {
        Self {
            cache,
            document: CatalogDocument::default(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn cache(&self) -> &LibraryPathCache {
        &self.cache
    }

    pub fn document(&self) -> &CatalogDocument {
        &self.document
    }

    pub(crate) fn document_mut(&mut self) -> &mut CatalogDocument {
        &mut self.document
    }

    pub fn library_root(&self) -> Option<PathBuf> {
        self.cache.get_library_path()
    }

    /// Location of the catalog file for the active root, if one is set.
    pub fn data_file(&self) -> Option<PathBuf> {
        self.library_root().map(|root| root.join(DATA_FILE_NAME))
    }

    /// Load the catalog of the active library root.
    ///
    /// Returns `Ok(false)` and leaves memory untouched when no root is set.
    /// A missing file is first created with the starter document; an empty
    /// file receives the current in-memory document.
    ///
    /// # Errors
    ///
    /// I/O failures and malformed JSON are returned as errors. The in-memory
    /// document is only replaced after a successful parse.
    pub fn read_data(&mut self) -> Result<bool> {
        info!("Reading user data from disk...");
        let Some(root) = self.library_root() else {
            warn!("No valid library path found in cache, cannot read data.");
            return Ok(false);
        };

        let data_path = root.join(DATA_FILE_NAME);
        info!("Reading user data from {}...", data_path.display());
        if !data_path.exists() {
            info!(
                "Data file does not exist at {}, creating default data file...",
                data_path.display()
            );
            write_document(&data_path, &CatalogDocument::default())?;
        }

        let contents =
            fs::read_to_string(&data_path).map_err(|e| LibraryError::io(&data_path, e))?;
        if contents.is_empty() {
            debug!("Data file is empty, writing current document");
            self.write_data()?;
            return Ok(true);
        }

        let document: CatalogDocument =
            serde_json::from_str(&contents).map_err(|source| {
                error!("Malformed data file {}: {source}", data_path.display());
                LibraryError::Json {
                    path: data_path.clone(),
                    source,
                }
            })?;
        info!(
            "Loaded {} tracks, {} tags, {} playlists",
            document.library.len(),
            document.tags.len(),
            document.playlists.len()
        );
        self.document = document;
        self.notify();
        Ok(true)
    }

    /// Parse the catalog on disk without creating, rewriting or adopting it.
    ///
    /// Returns `Ok(None)` when no root is set or the file is missing or empty.
    pub fn peek_document(&self) -> Result<Option<CatalogDocument>> {
        let Some(data_path) = self.data_file() else {
            return Ok(None);
        };
        if !data_path.exists() {
            debug!("No catalog at {} yet", data_path.display());
            return Ok(None);
        }
        let contents =
            fs::read_to_string(&data_path).map_err(|e| LibraryError::io(&data_path, e))?;
        if contents.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| LibraryError::Json {
                path: data_path,
                source,
            })
    }

    /// Overwrite the catalog file with the in-memory document.
    ///
    /// Returns `Ok(false)` when no root is set.
    pub fn write_data(&self) -> Result<bool> {
        let Some(data_path) = self.data_file() else {
            error!("No valid library path found in cache, cannot write data.");
            return Ok(false);
        };

        write_document(&data_path, &self.document)?;
        debug!("Wrote catalog to {}", data_path.display());
        self.notify();
        Ok(true)
    }

    /// Re-sort tags, then persist. For callers that edited the document
    /// through several steps.
    pub fn commit(&mut self) -> Result<bool> {
        self.document.sort_tags();
        self.write_data()
    }

    /// Register a callback run with the document after every load and every
    /// successful write.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&CatalogDocument) + Send + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&self) {
        for (_, observer) in &self.observers {
            observer(&self.document);
        }
    }
}

/// Pretty-print a document with a 4-space indent.
pub fn to_pretty_json(document: &CatalogDocument) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer)?;
    Ok(buf)
}

fn write_document(path: &Path, document: &CatalogDocument) -> Result<()> {
    let bytes = to_pretty_json(document).map_err(|source| LibraryError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_in_place(path, &bytes).map_err(|e| LibraryError::io(path, e))
}
