//! Catalog data model: library entries, tag and playlist definitions, and the
//! versioned document that aggregates them.
//!
//! Loading is forward compatible. A document on disk goes through
//! [`StoredDocument`], where every collection is optional, and then through
//! [`normalize`], the one place where missing parts get their defaults.

use log::warn;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Only catalog format written so far.
pub const CURRENT_VERSION: u32 = 1;

/// Artist given to every newly discovered track.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// One track in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub name: String,
    #[serde(default = "unknown_artist")]
    pub artist: String,
    /// Absolute path of the best-quality copy found so far.
    pub path: String,
    #[serde(default)]
    pub cover_path: Option<String>,
    /// Tag name to assignment: `true` assigned, `false` explicitly rejected.
    /// A missing key means the user has not decided yet.
    #[serde(default, deserialize_with = "falsy_as_default")]
    pub tags: BTreeMap<String, bool>,
}

fn unknown_artist() -> String {
    UNKNOWN_ARTIST.to_string()
}

impl LibraryEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>, cover_path: Option<String>) -> Self {
        Self {
            name: name.into(),
            artist: unknown_artist(),
            path: path.into(),
            cover_path,
            tags: BTreeMap::new(),
        }
    }

    /// Assignment state of `tag` on this entry.
    pub fn tag_state(&self, tag: &str) -> TagState {
        match self.tags.get(tag) {
            Some(true) => TagState::Assigned,
            Some(false) => TagState::Rejected,
            None => TagState::Undecided,
        }
    }
}

/// Tri-state tag assignment on a library entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagState {
    Assigned,
    Rejected,
    Undecided,
}

/// A tag definition. The name is `category:value`; the category is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagEntry {
    pub name: String,
    #[serde(default)]
    pub color_hex: String,
    #[serde(default)]
    pub lucide_icon: String,
}

impl TagEntry {
    pub fn new(name: impl Into<String>, color_hex: impl Into<String>, lucide_icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color_hex: color_hex.into(),
            lucide_icon: lucide_icon.into(),
        }
    }

    pub fn category(&self) -> Option<&str> {
        category_of(&self.name)
    }
}

/// A saved filter set. The name is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub name: String,
    #[serde(default)]
    pub color_hex: String,
    #[serde(default)]
    pub lucide_icon: String,
    #[serde(default, deserialize_with = "falsy_as_default")]
    pub filters: Vec<Filter>,
}

impl PlaylistEntry {
    pub fn new(
        name: impl Into<String>,
        color_hex: impl Into<String>,
        lucide_icon: impl Into<String>,
        filters: Vec<Filter>,
    ) -> Self {
        Self {
            name: name.into(),
            color_hex: color_hex.into(),
            lucide_icon: lucide_icon.into(),
            filters,
        }
    }
}

/// One predicate of a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    IncludesCategory { category: String },
    ExcludesCategory { category: String },
    IncludesTag { tag: String },
    ExcludesTag { tag: String },
}

impl Filter {
    pub fn includes_category(category: impl Into<String>) -> Self {
        Self::IncludesCategory { category: category.into() }
    }

    pub fn excludes_category(category: impl Into<String>) -> Self {
        Self::ExcludesCategory { category: category.into() }
    }

    pub fn includes_tag(tag: impl Into<String>) -> Self {
        Self::IncludesTag { tag: tag.into() }
    }

    pub fn excludes_tag(tag: impl Into<String>) -> Self {
        Self::ExcludesTag { tag: tag.into() }
    }
}

/// The persisted aggregate: one per library root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredDocument")]
pub struct CatalogDocument {
    pub version: u32,
    pub library: Vec<LibraryEntry>,
    pub tags: Vec<TagEntry>,
    pub playlists: Vec<PlaylistEntry>,
}

impl CatalogDocument {
    /// Version 1 document with nothing in it.
    pub fn empty() -> Self {
        Self {
            version: CURRENT_VERSION,
            library: Vec::new(),
            tags: Vec::new(),
            playlists: Vec::new(),
        }
    }

    pub fn sort_tags(&mut self) {
        sort_tags(&mut self.tags);
    }

    pub fn tag(&self, name: &str) -> Option<&TagEntry> {
        self.tags.iter().find(|tag| tag.name == name)
    }

    pub fn playlist(&self, name: &str) -> Option<&PlaylistEntry> {
        self.playlists.iter().find(|playlist| playlist.name == name)
    }

    pub fn entry(&self, path: &str) -> Option<&LibraryEntry> {
        self.library.iter().find(|entry| entry.path == path)
    }
}

/// The curated starter document: empty library, a rating/mood/genre/energy
/// tag set and two playlists.
impl Default for CatalogDocument {
    fn default() -> Self {
        let mut tags = vec![
            TagEntry::new("rate:5", "#FFD700", "star"),
            TagEntry::new("rate:4", "#C0C0C0", "star"),
            TagEntry::new("rate:3", "#CD7F32", "star"),
            TagEntry::new("mood:happy", "#69ff8a", "smile"),
            TagEntry::new("mood:sad", "#4b87f7", "frown"),
            TagEntry::new("mood:chill", "#ffbe69", "coffee"),
            TagEntry::new("mood:angry", "#ff4c4c", "angry"),
            TagEntry::new("genre:pop_rock", "#ff69b4", "guitar"),
            TagEntry::new("genre:classical", "#dbdbdbff", "piano"),
            TagEntry::new("genre:orchestral", "#ff9969", "drum"),
            TagEntry::new("genre:electronic", "#69d1ff", "keyboard-music"),
            TagEntry::new("genre:lofi", "#a369ff", "library-big"),
            TagEntry::new("energy:dynamic", "#ff6969", "zap"),
            TagEntry::new("energy:chill_dynamic", "#ffda69", "activity"),
            TagEntry::new("energy:calm", "#69ffec", "haze"),
        ];
        sort_tags(&mut tags);

        Self {
            version: CURRENT_VERSION,
            library: Vec::new(),
            tags,
            playlists: vec![
                PlaylistEntry::new(
                    "Not rated",
                    "#888888",
                    "circle-question-mark",
                    vec![Filter::excludes_category("rate")],
                ),
                PlaylistEntry::new(
                    "Good stuff",
                    "#69ff87",
                    "thumbs-up",
                    vec![Filter::includes_tag("rate:5"), Filter::includes_tag("rate:4")],
                ),
            ],
        }
    }
}

/// A catalog document as found on disk, before defaults are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredDocument {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default, deserialize_with = "falsy_as_default")]
    pub library: Option<Vec<LibraryEntry>>,
    #[serde(default, deserialize_with = "falsy_as_default")]
    pub tags: Option<Vec<TagEntry>>,
    #[serde(default, deserialize_with = "falsy_as_default")]
    pub playlists: Option<Vec<PlaylistEntry>>,
}

impl From<StoredDocument> for CatalogDocument {
    fn from(stored: StoredDocument) -> Self {
        normalize(stored)
    }
}

/// Fill in everything a partial or older document lacks.
///
/// Missing collections become empty, the version is stamped to
/// [`CURRENT_VERSION`], and tags are sorted.
pub fn normalize(stored: StoredDocument) -> CatalogDocument {
    match stored.version {
        Some(CURRENT_VERSION) => {}
        Some(other) => warn!("Catalog declares version {other}, reading it as version {CURRENT_VERSION}"),
        None => warn!("Catalog has no version, reading it as version {CURRENT_VERSION}"),
    }

    let mut document = CatalogDocument {
        version: CURRENT_VERSION,
        library: stored.library.unwrap_or_default(),
        tags: stored.tags.unwrap_or_default(),
        playlists: stored.playlists.unwrap_or_default(),
    };
    document.sort_tags();
    document
}

/// Text before the first colon of a tag name. Names without a colon have no
/// category.
pub fn category_of(tag_name: &str) -> Option<&str> {
    tag_name.split_once(':').map(|(category, _)| category)
}

/// Case-insensitive order. Names equal up to case put the lowercase
/// spelling first, so `mood:x` sorts right before `Mood:x`.
pub fn compare_tag_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

pub fn sort_tags(tags: &mut [TagEntry]) {
    tags.sort_by(|a, b| compare_tag_names(&a.name, &b.name));
}

/// `null`, `false`, `0` and `""` read as the default value, the same way a
/// missing field does.
fn falsy_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let falsy = match &value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    };
    if falsy {
        return Ok(T::default());
    }
    T::deserialize(value).map_err(serde::de::Error::custom)
}
