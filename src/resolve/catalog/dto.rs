//! Catalog file Data Transfer Objects
//!
//! These types match the JSON catalog file layout exactly.
//! DO NOT use these types outside the catalog module - convert to domain types.
//!
//! ```json
//! {
//!   "provider": "fixtures",
//!   "entries": [
//!     { "kind": "movie", "name": "Heat", "year": 1995, "ids": { "imdb": "tt0113277" } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Whole catalog file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogFile {
    /// Provider name reported in provenance and errors
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

fn default_provider() -> String {
    "catalog".to_string()
}

/// One catalog record
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Entry {
    /// Entity kind ("movie", "series", "episode", "track", ...)
    pub kind: String,
    pub name: String,
    pub original_name: Option<String>,
    pub aliases: Vec<String>,
    pub year: Option<i32>,
    pub season: Option<u32>,
    /// Episode or track numbers
    pub numbers: Vec<u32>,
    /// Catalog key → id
    pub ids: BTreeMap<String, String>,
    pub parent: Option<ParentRef>,
    /// Languages the record is available in
    pub languages: Vec<String>,
    pub release: Option<Release>,
    pub details: Option<EntryDetails>,
}

/// Series or album the entry belongs to
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ParentRef {
    pub name: Option<String>,
    pub ids: BTreeMap<String, String>,
}

/// Release facts for tracks and albums
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Release {
    pub artists: Vec<String>,
    pub album_artists: Vec<String>,
    pub album: Option<String>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
    pub compilation: bool,
    pub barcode: Option<String>,
    pub release_group: Option<String>,
    pub cover_art: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EntryDetails {
    pub overview: Option<String>,
    pub rating: Option<f32>,
    pub votes: Option<u32>,
    pub cast: Vec<Person>,
    pub genres: Vec<String>,
    pub directors: Vec<Person>,
    pub writers: Vec<Person>,
    pub characters: Vec<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Person {
    pub name: String,
    /// Character played
    pub role: Option<String>,
    pub id: Option<String>,
}
