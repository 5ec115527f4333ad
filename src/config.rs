//! # Configuration Module
//!
//! Locates the per-user data directory and keeps the "active library root"
//! pointer in it. The pointer is a plain text file holding one absolute path:
//!
//! - Linux: `~/.local/share/scaffony/scaffony_current_library.txt`
//! - macOS: `~/Library/Application Support/scaffony/scaffony_current_library.txt`
//! - Windows: `%APPDATA%\scaffony\scaffony_current_library.txt`
//!
//! The catalog itself lives inside the library root (see [`crate::store`]), so
//! pointing the cache at another directory switches the whole library.

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Fixed name of the file holding the active library root.
pub const LIBRARY_PATH_FILE_NAME: &str = "scaffony_current_library.txt";

/// Returns the platform-appropriate data directory for Scaffony, creating it
/// if needed.
///
/// # Errors
///
/// Fails if the system data directory cannot be determined or the `scaffony`
/// subdirectory cannot be created.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let app_dir = data_dir.join("scaffony");
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create Scaffony data directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Truncate `path` and write `contents` into the same file, so its mode,
/// owner and inode stay as they were. Creates the file if it is missing.
pub(crate) fn write_in_place(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(contents)?;
    file.flush()
}

/// The single "current library root" pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPathCache {
    cache_file: PathBuf,
}

impl LibraryPathCache {
    /// Cache file in the platform data directory.
    pub fn new() -> Result<Self> {
        Ok(Self {
            cache_file: get_data_dir()?.join(LIBRARY_PATH_FILE_NAME),
        })
    }

    /// Cache file at an explicit location.
    pub fn with_cache_file(cache_file: PathBuf) -> Self {
        Self { cache_file }
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Create the containing directory and an empty cache file if either is
    /// missing. Safe to call on every access.
    fn ensure_cache_file(&self) -> io::Result<()> {
        if let Some(dir) = self.cache_file.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        if !self.cache_file.exists() {
            debug!("Creating empty library cache at {}", self.cache_file.display());
            fs::File::create(&self.cache_file)?;
        }
        Ok(())
    }

    /// Returns the stored library root if it is set, absolute and still exists.
    ///
    /// Absence is a normal state, so every failure collapses into `None`.
    pub fn get_library_path(&self) -> Option<PathBuf> {
        if let Err(e) = self.ensure_cache_file() {
            warn!(
                "Could not prepare library cache {}: {e}",
                self.cache_file.display()
            );
            return None;
        }

        let contents = match fs::read_to_string(&self.cache_file) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(
                    "Could not read library cache {}: {e}",
                    self.cache_file.display()
                );
                return None;
            }
        };

        let stored = contents.trim_end_matches(['\r', '\n']);
        if stored.is_empty() {
            return None;
        }

        let path = PathBuf::from(stored);
        if !path.is_absolute() {
            warn!("Cached library path is not absolute: {stored}");
            return None;
        }
        if !path.exists() {
            warn!("Cached library path no longer exists: {stored}");
            return None;
        }
        Some(path)
    }

    /// Validates `library_path` and stores it as the active root.
    ///
    /// Returns false without touching the cache when the path is relative or
    /// missing, or when the cache cannot be written.
    pub fn set_library_path(&self, library_path: &Path) -> bool {
        if !library_path.is_absolute() {
            error!(
                "Provided library path is not absolute: {}",
                library_path.display()
            );
            return false;
        }
        if !library_path.exists() {
            error!(
                "Provided library path does not exist: {}",
                library_path.display()
            );
            return false;
        }
        let Some(text) = library_path.to_str() else {
            error!(
                "Provided library path is not valid UTF-8: {}",
                library_path.display()
            );
            return false;
        };

        if let Err(e) = self.write_cache(text) {
            error!(
                "Failed to write library cache {}: {e}",
                self.cache_file.display()
            );
            return false;
        }
        info!("Library path set to: {text}");
        true
    }

    /// Forget the active library root.
    pub fn clear_library_path(&self) -> io::Result<()> {
        self.write_cache("")?;
        info!("Library path cleared");
        Ok(())
    }

    fn write_cache(&self, text: &str) -> io::Result<()> {
        self.ensure_cache_file()?;
        write_in_place(&self.cache_file, text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir) -> LibraryPathCache {
        LibraryPathCache::with_cache_file(dir.path().join("app").join(LIBRARY_PATH_FILE_NAME))
    }

    #[test]
    fn test_get_data_dir_is_absolute_and_exists() {
        let dir = get_data_dir().expect("data dir should resolve");
        assert!(dir.is_absolute());
        assert!(dir.is_dir());
        assert!(dir.ends_with("scaffony"));
    }

    #[test]
    fn test_first_access_creates_empty_cache() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(&tmp);

        assert_eq!(cache.get_library_path(), None);
        assert!(cache.cache_file().exists());
        assert_eq!(fs::read_to_string(cache.cache_file()).unwrap(), "");
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let tmp = TempDir::new().unwrap();
        let library = TempDir::new().unwrap();
        let cache = cache_in(&tmp);

        assert!(cache.set_library_path(library.path()));
        assert_eq!(cache.get_library_path().as_deref(), Some(library.path()));
    }

    #[test]
    fn test_set_rejects_relative_and_missing_paths() {
        let tmp = TempDir::new().unwrap();
        let library = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        assert!(cache.set_library_path(library.path()));

        assert!(!cache.set_library_path(Path::new("relative/music")));
        assert!(!cache.set_library_path(&library.path().join("does-not-exist")));

        // Previously cached value is untouched
        assert_eq!(cache.get_library_path().as_deref(), Some(library.path()));
    }

    #[test]
    fn test_get_ignores_relative_and_vanished_values() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        cache.get_library_path();

        fs::write(cache.cache_file(), "music/library").unwrap();
        assert_eq!(cache.get_library_path(), None);

        let gone = tmp.path().join("gone");
        fs::write(cache.cache_file(), gone.to_str().unwrap()).unwrap();
        assert_eq!(cache.get_library_path(), None);
    }

    #[test]
    fn test_get_tolerates_trailing_newline() {
        let tmp = TempDir::new().unwrap();
        let library = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        cache.get_library_path();

        fs::write(
            cache.cache_file(),
            format!("{}\n", library.path().display()),
        )
        .unwrap();
        assert_eq!(cache.get_library_path().as_deref(), Some(library.path()));
    }

    #[test]
    fn test_get_keeps_trailing_spaces_of_the_path() {
        let tmp = TempDir::new().unwrap();
        let library = tmp.path().join("Music ");
        fs::create_dir(&library).unwrap();
        let cache = cache_in(&tmp);
        assert!(cache.set_library_path(&library));

        assert_eq!(cache.get_library_path(), Some(library.clone()));

        fs::write(cache.cache_file(), format!("{}\r\n", library.display())).unwrap();
        assert_eq!(cache.get_library_path(), Some(library));
    }

    #[test]
    fn test_clear_unsets_library() {
        let tmp = TempDir::new().unwrap();
        let library = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        assert!(cache.set_library_path(library.path()));

        cache.clear_library_path().unwrap();
        assert_eq!(cache.get_library_path(), None);
    }
}
