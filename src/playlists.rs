//! Playlist engine: playlist definitions and the evaluation of their filters.
//!
//! An entry belongs to a playlist when it passes every filter (logical AND).
//! An empty filter list matches the whole library.
//!
//! Only tags that still have a definition count. An entry key or a filter that
//! names an undefined tag is treated as "not set", so `IncludesTag` on it
//! matches nothing and `ExcludesTag` on it matches everything.

use crate::error::{LibraryError, Result};
use crate::model::{category_of, CatalogDocument, Filter, LibraryEntry, PlaylistEntry, TagEntry};
use crate::store::CatalogStore;
use log::info;
use std::collections::HashSet;

/// Evaluates filters against entries, given the defined tags.
#[derive(Debug, Clone)]
pub struct FilterContext<'a> {
    known_tags: HashSet<&'a str>,
}

impl<'a> FilterContext<'a> {
    pub fn new(tags: &'a [TagEntry]) -> Self {
        Self {
            known_tags: tags.iter().map(|tag| tag.name.as_str()).collect(),
        }
    }

    /// `entry.tags[tag] == true` for a defined tag.
    fn is_assigned(&self, entry: &LibraryEntry, tag: &str) -> bool {
        self.known_tags.contains(tag) && entry.tags.get(tag) == Some(&true)
    }

    /// Some defined tag of `category` is assigned on `entry`.
    fn has_category(&self, entry: &LibraryEntry, category: &str) -> bool {
        entry.tags.iter().any(|(name, assigned)| {
            *assigned
                && category_of(name) == Some(category)
                && self.known_tags.contains(name.as_str())
        })
    }

    pub fn matches_filter(&self, entry: &LibraryEntry, filter: &Filter) -> bool {
        match filter {
            Filter::IncludesTag { tag } => self.is_assigned(entry, tag),
            Filter::ExcludesTag { tag } => !self.is_assigned(entry, tag),
            Filter::IncludesCategory { category } => self.has_category(entry, category),
            Filter::ExcludesCategory { category } => !self.has_category(entry, category),
        }
    }

    pub fn matches(&self, entry: &LibraryEntry, filters: &[Filter]) -> bool {
        filters.iter().all(|filter| self.matches_filter(entry, filter))
    }
}

impl CatalogDocument {
    pub fn add_playlist(&mut self, playlist: PlaylistEntry) {
        self.playlists.push(playlist);
    }

    pub fn add_playlist_checked(&mut self, playlist: PlaylistEntry) -> Result<()> {
        if self.playlist(&playlist.name).is_some() {
            return Err(LibraryError::DuplicatePlaylist(playlist.name));
        }
        self.add_playlist(playlist);
        Ok(())
    }

    pub fn edit_playlist(&mut self, old_name: &str, playlist: PlaylistEntry) -> Result<()> {
        let slot = self
            .playlists
            .iter_mut()
            .find(|existing| existing.name == old_name)
            .ok_or_else(|| LibraryError::PlaylistNotFound(old_name.to_string()))?;
        *slot = playlist;
        Ok(())
    }

    /// Absent names are a no-op.
    pub fn delete_playlist(&mut self, name: &str) {
        self.playlists.retain(|playlist| playlist.name != name);
    }

    /// Library entries passing every filter, in library order.
    pub fn matching_entries(&self, filters: &[Filter]) -> Vec<&LibraryEntry> {
        let context = FilterContext::new(&self.tags);
        self.library
            .iter()
            .filter(|entry| context.matches(entry, filters))
            .collect()
    }

    pub fn playlist_tracks(&self, name: &str) -> Result<Vec<&LibraryEntry>> {
        let playlist = self
            .playlist(name)
            .ok_or_else(|| LibraryError::PlaylistNotFound(name.to_string()))?;
        Ok(self.matching_entries(&playlist.filters))
    }
}

impl CatalogStore {
    pub fn add_playlist(&mut self, playlist: PlaylistEntry) -> Result<bool> {
        info!("Adding playlist {}", playlist.name);
        self.document_mut().add_playlist(playlist);
        self.write_data()
    }

    /// Add a playlist only if no playlist of that name exists yet.
    pub fn add_playlist_checked(&mut self, playlist: PlaylistEntry) -> Result<bool> {
        info!("Adding playlist {}", playlist.name);
        self.document_mut().add_playlist_checked(playlist)?;
        self.write_data()
    }

    /// # Errors
    ///
    /// [`LibraryError::PlaylistNotFound`] if no playlist is named `old_name`.
    pub fn edit_playlist(&mut self, old_name: &str, playlist: PlaylistEntry) -> Result<bool> {
        info!("Editing playlist {old_name} -> {}", playlist.name);
        self.document_mut().edit_playlist(old_name, playlist)?;
        self.write_data()
    }

    pub fn delete_playlist(&mut self, name: &str) -> Result<bool> {
        info!("Deleting playlist {name}");
        self.document_mut().delete_playlist(name);
        self.write_data()
    }

    pub fn playlist_tracks(&self, name: &str) -> Result<Vec<&LibraryEntry>> {
        self.document().playlist_tracks(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, tags: &[(&str, bool)]) -> LibraryEntry {
        let mut entry = LibraryEntry::new(path, path, None);
        for (name, value) in tags {
            entry.tags.insert((*name).to_string(), *value);
        }
        entry
    }

    /// Starter tags plus four tracks covering the rating states.
    fn rated_library() -> CatalogDocument {
        let mut document = CatalogDocument::default();
        document.library = vec![
            entry("/m/five.flac", &[("rate:5", true), ("mood:happy", true)]),
            entry("/m/four.flac", &[("rate:4", true)]),
            entry("/m/rejected.flac", &[("rate:5", false)]),
            entry("/m/blank.flac", &[]),
        ];
        document
    }

    fn paths(entries: Vec<&LibraryEntry>) -> Vec<&str> {
        entries.into_iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_not_rated_playlist() {
        let document = rated_library();
        let tracks = document.playlist_tracks("Not rated").unwrap();
        assert_eq!(paths(tracks), vec!["/m/rejected.flac", "/m/blank.flac"]);
    }

    #[test]
    fn test_filters_are_anded() {
        let document = rated_library();
        let tracks = document.playlist_tracks("Good stuff").unwrap();
        assert!(tracks.is_empty());

        let mut both = document.clone();
        both.library.push(entry("/m/both.flac", &[("rate:5", true), ("rate:4", true)]));
        assert_eq!(paths(both.playlist_tracks("Good stuff").unwrap()), vec!["/m/both.flac"]);
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let document = rated_library();
        assert_eq!(document.matching_entries(&[]).len(), document.library.len());
    }

    #[test]
    fn test_include_and_exclude_tag() {
        let document = rated_library();
        let included = document.matching_entries(&[Filter::includes_tag("rate:5")]);
        assert_eq!(paths(included), vec!["/m/five.flac"]);

        // False and absent both pass an exclusion
        let excluded = document.matching_entries(&[Filter::excludes_tag("rate:5")]);
        assert_eq!(
            paths(excluded),
            vec!["/m/four.flac", "/m/rejected.flac", "/m/blank.flac"]
        );
    }

    #[test]
    fn test_include_category() {
        let document = rated_library();
        let rated = document.matching_entries(&[Filter::includes_category("rate")]);
        assert_eq!(paths(rated), vec!["/m/five.flac", "/m/four.flac"]);

        let happy_and_rated = document.matching_entries(&[
            Filter::includes_category("rate"),
            Filter::includes_category("mood"),
        ]);
        assert_eq!(paths(happy_and_rated), vec!["/m/five.flac"]);
    }

    #[test]
    fn test_dangling_references_never_count() {
        let mut document = rated_library();
        document
            .library
            .push(entry("/m/ghost.flac", &[("ghost:tag", true)]));

        assert!(document
            .matching_entries(&[Filter::includes_tag("ghost:tag")])
            .is_empty());
        assert!(document
            .matching_entries(&[Filter::includes_category("ghost")])
            .is_empty());
        assert_eq!(
            document
                .matching_entries(&[Filter::excludes_tag("ghost:tag")])
                .len(),
            document.library.len()
        );
    }

    #[test]
    fn test_deleted_tag_stops_matching() {
        let mut document = rated_library();
        document.tags.retain(|tag| tag.name != "rate:4");
        let rated = document.matching_entries(&[Filter::includes_category("rate")]);
        assert_eq!(paths(rated), vec!["/m/five.flac"]);
    }

    #[test]
    fn test_playlist_crud() {
        let mut document = CatalogDocument::empty();
        document.add_playlist(PlaylistEntry::new("Happy", "#fff", "smile", vec![]));

        let err = document
            .add_playlist_checked(PlaylistEntry::new("Happy", "#000", "smile", vec![]))
            .unwrap_err();
        assert!(matches!(err, LibraryError::DuplicatePlaylist(_)));

        document
            .edit_playlist(
                "Happy",
                PlaylistEntry::new("Joy", "#fff", "smile", vec![Filter::includes_tag("mood:happy")]),
            )
            .unwrap();
        assert!(document.playlist("Happy").is_none());
        assert_eq!(document.playlist("Joy").unwrap().filters.len(), 1);

        let err = document
            .edit_playlist("Happy", PlaylistEntry::new("x", "", "", vec![]))
            .unwrap_err();
        assert!(matches!(err, LibraryError::PlaylistNotFound(name) if name == "Happy"));

        document.delete_playlist("Joy");
        document.delete_playlist("Joy");
        assert!(document.playlists.is_empty());
    }

    #[test]
    fn test_unknown_playlist_tracks() {
        let document = rated_library();
        assert!(document.playlist_tracks("Nope").unwrap_err().is_not_found());
    }
}
