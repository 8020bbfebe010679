//! Test utilities and fixtures for media-resolver tests.
//!
//! This module provides query and candidate factories, plus a temporary
//! catalog file, to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{candidate, query};
//!
//! #[test]
//! fn test_something() {
//!     let q = query(EntityKind::Movie, "Heat");
//!     let c = candidate(EntityKind::Movie, "Heat");
//!     // ... test logic
//! }
//! ```

use std::path::PathBuf;

use tempfile::TempDir;

use crate::resolve::domain::{Candidate, EntityKind, MediaEntity, Provenance, Query};

/// Creates a query with only a kind and a name.
pub fn query(kind: EntityKind, name: &str) -> Query {
    Query::new(kind, name)
}

/// Creates a candidate as the mock provider would return it.
pub fn candidate(kind: EntityKind, name: &str) -> Candidate {
    Candidate::new(
        MediaEntity::new(kind, name),
        Provenance {
            provider: "mock".to_string(),
            language: None,
        },
    )
}

/// Creates a track query by title and artist, optionally with an album.
pub fn track_query(title: &str, artist: &str, album: Option<&str>) -> Query {
    let mut q = Query::new(EntityKind::Track, title);
    q.entity.audio.artists = vec![artist.to_string()];
    q.entity.audio.album = album.map(str::to_string);
    q
}

/// Creates a track candidate on the given album.
pub fn track_candidate(title: &str, artist: &str, album: &str) -> Candidate {
    let mut c = candidate(EntityKind::Track, title);
    c.entity.audio.artists = vec![artist.to_string()];
    c.entity.audio.album = Some(album.to_string());
    c
}

/// Creates an episode candidate with season and episode numbers.
pub fn episode_candidate(name: &str, season: u32, numbers: &[u32]) -> Candidate {
    let mut c = candidate(EntityKind::Episode, name);
    c.entity.season = Some(season);
    c.entity.set_numbers(numbers.iter().copied());
    c
}

/// Writes a catalog JSON document into a temporary directory.
///
/// Keep the TempDir alive for the duration of your test.
pub fn temp_catalog(json: &str) -> (PathBuf, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, json).expect("Failed to write catalog");
    (path, dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_query_defaults() {
        let q = track_query("Hurt", "Johnny Cash", None);
        assert_eq!(q.kind(), EntityKind::Track);
        assert_eq!(q.entity.audio.artists, vec!["Johnny Cash".to_string()]);
        assert!(q.entity.audio.album.is_none());
    }

    #[test]
    fn test_episode_candidate_numbers() {
        let c = episode_candidate("Pilot", 1, &[2, 1]);
        assert_eq!(c.entity.season, Some(1));
        assert_eq!(c.entity.numbers.as_slice(), &[1, 2]);
        assert_eq!(c.provenance.provider, "mock");
    }

    #[test]
    fn test_temp_catalog_is_written() {
        let (path, _dir) = temp_catalog("{}");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }
}
