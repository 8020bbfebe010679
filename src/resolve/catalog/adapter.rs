//! Adapter layer: Convert catalog DTOs to domain models
//!
//! This is the ONLY place where catalog DTO types are converted to domain types.

use std::collections::BTreeMap;

use tracing::debug;

use super::dto;
use crate::resolve::domain::{
    AudioInfo, Candidate, Catalog, Credit, Details, EntityKind, ExternalIds, MediaEntity,
    Provenance,
};

/// Convert a catalog entry into a candidate.
///
/// Returns `None` for entries whose kind is not recognised.
pub fn to_candidate(entry: &dto::Entry, provider: &str, language: &str) -> Option<Candidate> {
    let kind: EntityKind = match entry.kind.parse() {
        Ok(kind) => kind,
        Err(e) => {
            debug!(name = %entry.name, error = %e, "skipping entry with unknown kind");
            return None;
        }
    };

    let mut entity = MediaEntity::new(kind, entry.name.clone());
    entity.original_name = entry.original_name.clone();
    entity.alternate_names = entry.aliases.clone();
    entity.year = entry.year;
    entity.season = entry.season;
    entity.set_numbers(entry.numbers.iter().copied());
    entity.ids = to_ids(&entry.ids);
    entity.languages = entry.languages.clone();

    if let Some(ref parent) = entry.parent {
        entity.parent_name = parent.name.clone();
        entity.parent_ids = to_ids(&parent.ids);
    }
    if let Some(ref release) = entry.release {
        entity.audio = to_audio(release);
        if let (EntityKind::Track, Some(track)) = (kind, entity.audio.track_number) {
            entity.set_numbers([track]);
        }
    }
    if let Some(ref details) = entry.details {
        entity.details = to_details(details);
    }

    Some(Candidate::new(
        entity,
        Provenance {
            provider: provider.to_string(),
            language: Some(language.to_string()),
        },
    ))
}

/// Map catalog keys to identifier slots, dropping unknown keys
pub fn to_ids(raw: &BTreeMap<String, String>) -> ExternalIds {
    let mut ids = ExternalIds::new();
    for (key, id) in raw {
        match Catalog::from_key(key) {
            Some(catalog) => ids.set(catalog, id.clone()),
            None => debug!(key = %key, "ignoring identifier from unknown catalog"),
        }
    }
    ids
}

fn to_audio(release: &dto::Release) -> AudioInfo {
    AudioInfo {
        artists: release.artists.clone(),
        album_artists: release.album_artists.clone(),
        album: release.album.clone(),
        track_number: release.track,
        disc_number: release.disc,
        compilation: release.compilation,
        has_barcode: release.barcode.as_deref().is_some_and(|b| !b.trim().is_empty()),
        has_cover_art: release.cover_art,
        release_group_id: release.release_group.clone().filter(|g| !g.trim().is_empty()),
    }
}

fn to_details(details: &dto::EntryDetails) -> Details {
    Details {
        summary: details.overview.clone(),
        rating: details.rating,
        votes: details.votes,
        actors: to_credits(&details.cast),
        genres: details.genres.clone(),
        directors: to_credits(&details.directors),
        writers: to_credits(&details.writers),
        characters: details.characters.clone(),
        thumbnail: details.thumbnail.clone(),
    }
}

fn to_credits(people: &[dto::Person]) -> Vec<Credit> {
    people
        .iter()
        .filter(|p| !p.name.trim().is_empty())
        .map(|p| Credit {
            name: p.name.clone(),
            role: p.role.clone(),
            id: p.id.clone(),
        })
        .collect()
}
