//! # Library Scanner
//!
//! Walks the library root and merges every audio file it finds into the
//! catalog. Scanning is additive: new tracks are appended, known tracks may be
//! upgraded to a better-quality copy, and nothing is ever removed. Running it
//! twice over the same tree gives the same library.
//!
//! Two files that differ only by extension are the same track. Which copy the
//! catalog points at follows [`PREFERRED_AUDIO_EXTENSIONS`].

use crate::error::{LibraryError, Result};
use crate::model::LibraryEntry;
use crate::store::CatalogStore;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Extensions recorded as tracks.
pub const AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "wav", "flac", "aac", "ogg", "m4a"];

/// Extensions considered for a directory's cover image.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Sorted from worst to best.
pub const PREFERRED_AUDIO_EXTENSIONS: [&str; 5] = ["aac", "mp3", "ogg", "wav", "flac"];

/// Stops a running scan from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What one scan did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub directories: usize,
    pub added: usize,
    pub upgraded: usize,
    pub skipped_symlinks: usize,
    pub cancelled: bool,
}

/// One directory entry, classified without following symlinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_file: bool,
    pub is_dir: bool,
    pub is_symlink: bool,
}

/// List the direct entries of `dir`, sorted by name.
///
/// Names that are not valid UTF-8 are left out: the catalog stores paths as
/// JSON strings.
pub fn list_directory(dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!("Skipping non UTF-8 file name {:?} in {}", raw, dir.display());
                continue;
            }
        };
        entries.push(DirEntryInfo {
            name,
            is_file: file_type.is_file(),
            is_dir: file_type.is_dir(),
            is_symlink: file_type.is_symlink(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Lowercased extension without the dot.
fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

pub fn is_audio_file(entry: &DirEntryInfo) -> bool {
    entry.is_file
        && extension_of(&entry.name).is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_image_file(entry: &DirEntryInfo) -> bool {
    entry.is_file
        && extension_of(&entry.name).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// First image whose name contains "cover", in listing order.
pub fn find_cover(entries: &[DirEntryInfo]) -> Option<&str> {
    entries
        .iter()
        .find(|entry| is_image_file(entry) && entry.name.to_lowercase().contains("cover"))
        .map(|entry| entry.name.as_str())
}

/// Path with its extension stripped; copies of one track share it.
pub fn dedup_key(path: &str) -> PathBuf {
    Path::new(path).with_extension("")
}

fn quality_rank(path: &str) -> Option<usize> {
    let ext = extension_of(path)?;
    PREFERRED_AUDIO_EXTENSIONS.iter().position(|p| *p == ext)
}

/// True only if both extensions are ranked and `candidate` ranks strictly
/// higher than `existing`.
pub fn has_better_quality_extension(candidate: &str, existing: &str) -> bool {
    match (quality_rank(candidate), quality_rank(existing)) {
        (Some(new), Some(old)) => new > old,
        _ => false,
    }
}

/// Working copy of the library for one scan. Dedup lookups and inserts all go
/// through `index`, so a key is decided once.
struct ScanState<'a> {
    library: Vec<LibraryEntry>,
    index: HashMap<PathBuf, usize>,
    cancel: &'a CancelToken,
    report: ScanReport,
}

impl<'a> ScanState<'a> {
    fn new(library: Vec<LibraryEntry>, cancel: &'a CancelToken) -> Self {
        let mut index = HashMap::with_capacity(library.len());
        for (i, entry) in library.iter().enumerate() {
            // First entry wins if an edited document holds duplicates
            index.entry(dedup_key(&entry.path)).or_insert(i);
        }
        Self {
            library,
            index,
            cancel,
            report: ScanReport::default(),
        }
    }

    fn stop_requested(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            if !self.report.cancelled {
                info!("Scan cancelled, keeping entries found so far");
            }
            self.report.cancelled = true;
        }
        self.report.cancelled
    }

    fn scan_directory(&mut self, dir: &Path) -> Result<()> {
        if self.stop_requested() {
            return Ok(());
        }
        debug!("Scanning directory: {}", dir.display());
        self.report.directories += 1;

        let entries = list_directory(dir).map_err(|e| LibraryError::io(dir, e))?;
        let cover = find_cover(&entries).and_then(|name| path_string(&dir.join(name)));
        if let Some(cover) = &cover {
            debug!("Found cover image in directory: {cover}");
        }

        for entry in &entries {
            if self.stop_requested() {
                return Ok(());
            }
            if entry.is_symlink {
                debug!("Skipping symlink: {}", entry.name);
                self.report.skipped_symlinks += 1;
                continue;
            }

            let path = dir.join(&entry.name);
            if is_audio_file(entry) {
                let Some(path) = path_string(&path) else {
                    continue;
                };
                self.merge_track(&entry.name, path, cover.clone());
            } else if entry.is_dir {
                self.scan_directory(&path)?;
            }
        }
        Ok(())
    }

    fn merge_track(&mut self, file_name: &str, path: String, cover: Option<String>) {
        let key = dedup_key(&path);
        match self.index.get(&key).copied() {
            None => {
                debug!("Found new audio file: {path}, adding to library...");
                let name = Path::new(file_name)
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .unwrap_or(file_name);
                self.index.insert(key, self.library.len());
                self.library.push(LibraryEntry::new(name, path, cover));
                self.report.added += 1;
            }
            Some(i) => {
                let existing = &mut self.library[i];
                if has_better_quality_extension(&path, &existing.path) {
                    debug!("Found better quality audio file: {path}, updating library entry...");
                    existing.path = path;
                    self.report.upgraded += 1;
                }
            }
        }
    }
}

fn path_string(path: &Path) -> Option<String> {
    let text = path.to_str().map(str::to_owned);
    if text.is_none() {
        warn!("Skipping non UTF-8 path {}", path.display());
    }
    text
}

impl CatalogStore {
    /// Scan the active library root with a token nobody cancels.
    pub fn scan(&mut self) -> Result<Option<ScanReport>> {
        self.scan_with(&CancelToken::new())
    }

    /// Scan the active library root, merge the results and persist.
    ///
    /// Returns `Ok(None)` when no root is set. A cancelled scan still keeps
    /// and persists what it found. On an I/O error nothing is merged.
    pub fn scan_with(&mut self, cancel: &CancelToken) -> Result<Option<ScanReport>> {
        let Some(root) = self.library_root() else {
            error!("No valid library path found in cache, cannot scan.");
            return Ok(None);
        };

        info!("Scanning library path {} for new audio files...", root.display());
        let mut state = ScanState::new(self.document().library.clone(), cancel);
        state.scan_directory(&root)?;
        self.apply_scan(state).map(Some)
    }

    /// Adopt the working copy of a finished or cancelled scan and persist it.
    fn apply_scan(&mut self, state: ScanState<'_>) -> Result<ScanReport> {
        let ScanState { library, report, .. } = state;
        self.document_mut().library = library;
        self.write_data()?;

        info!(
            "Scan finished: {} directories, {} added, {} upgraded, {} symlinks skipped{}",
            report.directories,
            report.added,
            report.upgraded,
            report.skipped_symlinks,
            if report.cancelled { " (cancelled)" } else { "" }
        );
        Ok(report)
    }
}
