//! Merge several resolved units (episodes, tracks) into one combined record.

use std::collections::HashSet;

use serde::Serialize;
use smallvec::SmallVec;

use super::domain::{Candidate, Credit, Details, ExternalIds};
use super::normalize::normalize;

/// One resolved unit with its fetched details
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRecord {
    pub number: u32,
    pub season: Option<u32>,
    pub name: String,
    pub ids: ExternalIds,
    /// Series or album identifiers
    pub parent_ids: ExternalIds,
    pub details: Details,
}

impl UnitRecord {
    pub fn from_candidate(number: u32, candidate: &Candidate, details: Details) -> Self {
        Self {
            number,
            season: candidate.entity.season,
            name: candidate.entity.name.clone(),
            ids: candidate.entity.ids.clone(),
            parent_ids: candidate.entity.parent_ids.clone(),
            details,
        }
    }
}

/// Merged view over a multi-part recording
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRecord {
    pub numbers: SmallVec<[u32; 2]>,
    pub season: Option<u32>,
    /// "3. Name / 4. Name" for several units, the plain name for one
    pub name: String,
    pub summary: Option<String>,
    /// Mean of the available ratings
    pub rating: Option<f32>,
    /// Sum of the available vote counts
    pub votes: Option<u32>,
    pub actors: Vec<Credit>,
    pub genres: Vec<String>,
    pub directors: Vec<Credit>,
    pub writers: Vec<Credit>,
    pub characters: Vec<String>,
    pub thumbnail: Option<String>,
    /// Identifiers of the first unit
    pub ids: ExternalIds,
    pub parent_ids: ExternalIds,
}

/// Aggregate units in ascending number order.
///
/// Returns `None` for an empty slice. A single unit is copied as is.
pub fn aggregate(units: &[UnitRecord]) -> Option<CombinedRecord> {
    let mut sorted: Vec<&UnitRecord> = units.iter().collect();
    sorted.sort_by_key(|u| u.number);
    let first = *sorted.first()?;

    if let [only] = sorted.as_slice() {
        return Some(single(only));
    }

    let mut numbers: SmallVec<[u32; 2]> = sorted.iter().map(|u| u.number).collect();
    numbers.dedup();

    let name = sorted
        .iter()
        .map(|u| format!("{}. {}", u.number, u.name))
        .collect::<Vec<_>>()
        .join(" / ");

    let summaries: Vec<String> = sorted
        .iter()
        .filter_map(|u| {
            u.details
                .summary
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| format!("{}. {}", u.number, s))
        })
        .collect();

    let ratings: Vec<f32> = sorted.iter().filter_map(|u| u.details.rating).collect();
    let rating = (!ratings.is_empty()).then(|| ratings.iter().sum::<f32>() / ratings.len() as f32);

    let votes = sorted
        .iter()
        .filter_map(|u| u.details.votes)
        .reduce(|a, b| a.saturating_add(b));

    Some(CombinedRecord {
        numbers,
        season: first.season,
        name,
        summary: (!summaries.is_empty()).then(|| summaries.join("\n\n")),
        rating,
        votes,
        actors: union_credits(sorted.iter().map(|u| &u.details.actors)),
        genres: union_names(sorted.iter().map(|u| &u.details.genres)),
        directors: union_credits(sorted.iter().map(|u| &u.details.directors)),
        writers: union_credits(sorted.iter().map(|u| &u.details.writers)),
        characters: union_names(sorted.iter().map(|u| &u.details.characters)),
        thumbnail: first.details.thumbnail.clone(),
        ids: first.ids.clone(),
        parent_ids: first.parent_ids.clone(),
    })
}

fn single(unit: &UnitRecord) -> CombinedRecord {
    let d = &unit.details;
    CombinedRecord {
        numbers: SmallVec::from_slice(&[unit.number]),
        season: unit.season,
        name: unit.name.clone(),
        summary: d.summary.clone(),
        rating: d.rating,
        votes: d.votes,
        actors: d.actors.clone(),
        genres: d.genres.clone(),
        directors: d.directors.clone(),
        writers: d.writers.clone(),
        characters: d.characters.clone(),
        thumbnail: d.thumbnail.clone(),
        ids: unit.ids.clone(),
        parent_ids: unit.parent_ids.clone(),
    }
}

/// Union keyed by catalog ID, falling back to the normalized name.
fn union_credits<'a>(lists: impl Iterator<Item = &'a Vec<Credit>>) -> Vec<Credit> {
    let mut seen = HashSet::new();
    lists
        .flatten()
        .filter(|c| {
            let key = match c.id.as_deref() {
                Some(id) if !id.is_empty() => format!("id:{id}"),
                _ => format!("name:{}", normalize(&c.name)),
            };
            seen.insert(key)
        })
        .cloned()
        .collect()
}

fn union_names<'a>(lists: impl Iterator<Item = &'a Vec<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    lists
        .flatten()
        .filter(|n| seen.insert(normalize(n)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::domain::Catalog;

    fn unit(number: u32, name: &str) -> UnitRecord {
        UnitRecord {
            number,
            season: Some(1),
            name: name.to_string(),
            ids: ExternalIds::new().with(Catalog::Tvdb, format!("ep-{number}")),
            parent_ids: ExternalIds::new().with(Catalog::Tvdb, "80159"),
            details: Details::default(),
        }
    }

    #[test]
    fn test_empty_has_no_record() {
        assert!(aggregate(&[]).is_none());
    }

    #[test]
    fn test_single_unit_is_copied() {
        let mut u = unit(5, "Requiem");
        u.details.rating = Some(6.5);
        u.details.summary = Some("Will is haunted.".to_string());

        let combined = aggregate(&[u]).unwrap();

        assert_eq!(combined.name, "Requiem");
        assert_eq!(combined.summary.as_deref(), Some("Will is haunted."));
        assert_eq!(combined.rating, Some(6.5));
        assert_eq!(combined.numbers.as_slice(), &[5]);
    }

    #[test]
    fn test_two_episodes_combine() {
        let mut e3 = unit(3, "Fragments");
        e3.details.rating = Some(7.0);
        e3.details.votes = Some(10);
        e3.details.summary = Some("Part one.".to_string());
        e3.details.thumbnail = Some("http://img/3.jpg".to_string());
        let mut e4 = unit(4, "Fragments Part 2");
        e4.details.rating = Some(9.0);
        e4.details.votes = Some(20);
        e4.details.summary = Some("Part two.".to_string());
        e4.details.thumbnail = Some("http://img/4.jpg".to_string());

        // Input order does not matter
        let combined = aggregate(&[e4, e3]).unwrap();

        assert_eq!(combined.numbers.as_slice(), &[3, 4]);
        assert_eq!(combined.rating, Some(8.0));
        assert_eq!(combined.votes, Some(30));
        assert_eq!(combined.name, "3. Fragments / 4. Fragments Part 2");
        assert_eq!(combined.summary.as_deref(), Some("3. Part one.\n\n4. Part two."));
        assert_eq!(combined.thumbnail.as_deref(), Some("http://img/3.jpg"));
        assert_eq!(combined.ids.get(Catalog::Tvdb), Some("ep-3"));
        assert_eq!(combined.parent_ids.get(Catalog::Tvdb), Some("80159"));
    }

    #[test]
    fn test_missing_ratings_are_skipped() {
        let mut a = unit(1, "A");
        a.details.rating = Some(6.0);
        let b = unit(2, "B");

        let combined = aggregate(&[a, b]).unwrap();

        assert_eq!(combined.rating, Some(6.0));
        assert_eq!(combined.votes, None);
        assert_eq!(combined.summary, None);
    }

    #[test]
    fn test_credits_are_deduplicated() {
        let mut a = unit(1, "A");
        a.details.actors = vec![
            Credit {
                name: "Amanda Tapping".to_string(),
                role: Some("Helen Magnus".to_string()),
                id: Some("p1".to_string()),
            },
            Credit::named("Robin Dunne"),
        ];
        a.details.genres = vec!["Drama".to_string()];
        let mut b = unit(2, "B");
        b.details.actors = vec![
            Credit {
                name: "A. Tapping".to_string(),
                role: None,
                id: Some("p1".to_string()),
            },
            Credit::named("robin dunne"),
            Credit::named("Christopher Heyerdahl"),
        ];
        b.details.genres = vec!["drama".to_string(), "Sci-Fi".to_string()];

        let combined = aggregate(&[a, b]).unwrap();

        let names: Vec<_> = combined.actors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Amanda Tapping", "Robin Dunne", "Christopher Heyerdahl"]);
        assert_eq!(combined.genres, vec!["Drama".to_string(), "Sci-Fi".to_string()]);
    }
}
