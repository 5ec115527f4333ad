//! Tag registry: tag definitions plus their assignments on library entries.
//!
//! Renaming or deleting a tag definition cascades into the `tags` map of every
//! entry. The [`CatalogDocument`] methods do the in-memory work; the
//! [`CatalogStore`] methods call them and then persist.

use crate::error::{LibraryError, Result};
use crate::model::{category_of, CatalogDocument, TagEntry, TagState};
use crate::store::CatalogStore;
use log::{debug, info};
use std::collections::BTreeSet;

impl CatalogDocument {
    /// Append `tag` and re-sort. Does not check for an existing name.
    pub fn add_tag(&mut self, tag: TagEntry) {
        self.tags.push(tag);
        self.sort_tags();
    }

    /// Like [`CatalogDocument::add_tag`], refusing names already defined.
    pub fn add_tag_checked(&mut self, tag: TagEntry) -> Result<()> {
        if self.tag(&tag.name).is_some() {
            return Err(LibraryError::DuplicateTag(tag.name));
        }
        self.add_tag(tag);
        Ok(())
    }

    /// Replace the definition named `old_name` and rename its key on every
    /// entry, keeping each entry's assignment value.
    pub fn edit_tag(&mut self, old_name: &str, new_tag: TagEntry) -> Result<()> {
        let index = self
            .tags
            .iter()
            .position(|tag| tag.name == old_name)
            .ok_or_else(|| LibraryError::TagNotFound(old_name.to_string()))?;

        if new_tag.name != old_name {
            let mut renamed = 0;
            for entry in &mut self.library {
                if let Some(value) = entry.tags.remove(old_name) {
                    entry.tags.insert(new_tag.name.clone(), value);
                    renamed += 1;
                }
            }
            debug!("Renamed tag {old_name} to {} on {renamed} entries", new_tag.name);
        }

        self.tags[index] = new_tag;
        self.sort_tags();
        Ok(())
    }

    /// Remove the definition and every assignment of `name`. Absent names are
    /// a no-op.
    pub fn delete_tag(&mut self, name: &str) {
        self.tags.retain(|tag| tag.name != name);
        for entry in &mut self.library {
            entry.tags.remove(name);
        }
    }

    /// Distinct categories across defined tags.
    pub fn tag_categories(&self) -> BTreeSet<String> {
        self.tags
            .iter()
            .filter_map(|tag| category_of(&tag.name))
            .map(str::to_string)
            .collect()
    }

    /// Set the tri-state assignment of `tag` on the entry at `path`.
    pub fn set_entry_tag(&mut self, path: &str, tag: &str, state: TagState) -> Result<()> {
        let entry = self
            .library
            .iter_mut()
            .find(|entry| entry.path == path)
            .ok_or_else(|| LibraryError::EntryNotFound(path.to_string()))?;

        match state {
            TagState::Assigned => {
                entry.tags.insert(tag.to_string(), true);
            }
            TagState::Rejected => {
                entry.tags.insert(tag.to_string(), false);
            }
            TagState::Undecided => {
                entry.tags.remove(tag);
            }
        }
        Ok(())
    }

    /// Change the display name and/or artist of the entry at `path`.
    pub fn edit_entry(&mut self, path: &str, name: Option<String>, artist: Option<String>) -> Result<()> {
        let entry = self
            .library
            .iter_mut()
            .find(|entry| entry.path == path)
            .ok_or_else(|| LibraryError::EntryNotFound(path.to_string()))?;

        if let Some(name) = name {
            entry.name = name;
        }
        if let Some(artist) = artist {
            entry.artist = artist;
        }
        Ok(())
    }
}

impl CatalogStore {
    pub fn add_tag(&mut self, tag: TagEntry) -> Result<bool> {
        info!("Adding tag {}", tag.name);
        self.document_mut().add_tag(tag);
        self.write_data()
    }

    /// Add a tag only if no tag of that name exists yet.
    pub fn add_tag_checked(&mut self, tag: TagEntry) -> Result<bool> {
        info!("Adding tag {}", tag.name);
        self.document_mut().add_tag_checked(tag)?;
        self.write_data()
    }

    /// # Errors
    ///
    /// [`LibraryError::TagNotFound`] if no tag is named `old_name`; nothing
    /// is changed or written in that case.
    pub fn edit_tag(&mut self, old_name: &str, new_tag: TagEntry) -> Result<bool> {
        info!("Editing tag {old_name} -> {}", new_tag.name);
        self.document_mut().edit_tag(old_name, new_tag)?;
        self.write_data()
    }

    pub fn delete_tag(&mut self, name: &str) -> Result<bool> {
        info!("Deleting tag {name}");
        self.document_mut().delete_tag(name);
        self.write_data()
    }

    pub fn tag_categories(&self) -> BTreeSet<String> {
        self.document().tag_categories()
    }

    pub fn set_entry_tag(&mut self, path: &str, tag: &str, state: TagState) -> Result<bool> {
        debug!("Setting {tag} to {state:?} on {path}");
        self.document_mut().set_entry_tag(path, tag, state)?;
        self.write_data()
    }

    pub fn edit_entry(&mut self, path: &str, name: Option<String>, artist: Option<String>) -> Result<bool> {
        self.document_mut().edit_entry(path, name, artist)?;
        self.write_data()
    }
}
