//! Candidate narrowing and outcome classification.
//!
//! Every filter step follows the same rule: compute the subset, commit it only
//! if it is non-empty. A step can therefore shrink a set but never wipe it
//! out, and the last survivor of an earlier step is never lost.
//!
//! ```text
//! 0 candidates  -> NotFound
//! 1 candidate   -> Unique if the name test passes, otherwise NotFound
//! n candidates  -> year -> exact name -> mostly equal -> language
//!                  -> Unique (1 left) | Ambiguous (more left)
//! ```

use tracing::{debug, trace};

use super::audio;
use super::domain::{Candidate, EntityKind, LanguagePreference, MatchOutcome, MediaEntity, Query};
use super::normalize::normalize;
use super::similarity::{MAX_DISTANCE, mostly_equal, name_distance, names_equal};

/// Test one stage's candidates against the query.
pub fn test_candidates(
    query: &Query,
    candidates: &[Candidate],
    languages: &LanguagePreference,
) -> MatchOutcome {
    if query.kind().is_audio() {
        return audio::test_audio_candidates(query, candidates, languages);
    }

    match candidates {
        [] => MatchOutcome::NotFound,
        [single] => {
            if accepts_single(query, single) {
                MatchOutcome::Unique(single.clone())
            } else {
                debug!(
                    query = %query.name(),
                    candidate = %single.name(),
                    "single candidate rejected"
                );
                MatchOutcome::NotFound
            }
        }
        _ => {
            let survivors = run_pipeline(query, candidates.iter().collect(), languages);
            classify(query.kind(), survivors)
        }
    }
}

/// Acceptance rule for a lone candidate.
pub(crate) fn accepts_single(query: &Query, candidate: &Candidate) -> bool {
    if query.name().trim().is_empty() {
        return true;
    }
    if query.kind().is_episode_like() && numbers_match(&query.entity, &candidate.entity) {
        return true;
    }
    name_distance(&candidate.entity, &query.entity) <= MAX_DISTANCE
        || mostly_equal(&candidate.entity, &query.entity)
}

/// Season (and episode numbers, for episodes) match exactly.
fn numbers_match(query: &MediaEntity, candidate: &MediaEntity) -> bool {
    if query.season.is_none() || query.season != candidate.season {
        return false;
    }
    match query.kind {
        EntityKind::Season => true,
        _ => !query.numbers.is_empty() && query.numbers == candidate.numbers,
    }
}

/// The generic multi-candidate pipeline.
pub(crate) fn run_pipeline<'c>(
    query: &Query,
    set: Vec<&'c Candidate>,
    languages: &LanguagePreference,
) -> Vec<&'c Candidate> {
    let q = &query.entity;

    let set = match q.year {
        Some(year) => narrow(set, "year", |c| c.entity.year == Some(year)),
        None => set,
    };

    let set = narrow(set, "exact name", |c| {
        names_equal(&c.entity, q) || name_distance(&c.entity, q) == 0
    });

    let set = narrow(set, "mostly equal", |c| mostly_equal(&c.entity, q));

    let preferred = query
        .language_hint
        .as_deref()
        .unwrap_or(languages.preferred.as_str());
    if set.len() > 1 && !preferred.is_empty() {
        narrow(set, "language", |c| {
            c.entity.speaks(preferred) || !c.entity.has_languages()
        })
    } else {
        set
    }
}

/// Commit the filtered subset only if it is non-empty.
pub(crate) fn narrow<'c>(
    set: Vec<&'c Candidate>,
    step: &str,
    keep: impl Fn(&Candidate) -> bool,
) -> Vec<&'c Candidate> {
    let filtered: Vec<&Candidate> = set.iter().copied().filter(|c| keep(c)).collect();
    if filtered.is_empty() {
        trace!(step, kept = set.len(), "filter would eliminate every candidate, skipped");
        set
    } else {
        trace!(step, before = set.len(), after = filtered.len(), "filter applied");
        filtered
    }
}

/// Turn the survivors into an outcome, applying the kind's ambiguity policy.
pub(crate) fn classify(kind: EntityKind, survivors: Vec<&Candidate>) -> MatchOutcome {
    match survivors.len() {
        0 => MatchOutcome::NotFound,
        1 => MatchOutcome::Unique(survivors[0].clone()),
        2 if kind.collapses_near_duplicates() && near_duplicates(survivors[0], survivors[1]) => {
            debug!(name = %survivors[0].name(), "collapsing two near-identical candidates");
            MatchOutcome::Unique(survivors[0].clone())
        }
        remaining => {
            debug!(remaining, "candidates remain ambiguous");
            MatchOutcome::Ambiguous(survivors.into_iter().cloned().collect())
        }
    }
}

fn near_duplicates(a: &Candidate, b: &Candidate) -> bool {
    let years_compatible = match (a.entity.year, b.entity.year) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    };
    years_compatible && normalize(a.name()) == normalize(b.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{candidate, query};

    fn prefs() -> LanguagePreference {
        LanguagePreference::new("de", "en")
    }

    fn with_year(mut c: Candidate, year: i32) -> Candidate {
        c.entity.year = Some(year);
        c
    }

    #[test]
    fn test_no_candidates_is_not_found() {
        let q = query(EntityKind::Movie, "Heat");
        assert_eq!(test_candidates(&q, &[], &prefs()), MatchOutcome::NotFound);
    }

    #[test]
    fn test_single_similar_candidate_is_unique() {
        let q = query(EntityKind::Movie, "The Matrix");
        let c = candidate(EntityKind::Movie, "Matrix");
        assert!(test_candidates(&q, &[c], &prefs()).is_unique());
    }

    #[test]
    fn test_single_mostly_equal_candidate_is_unique() {
        let q = query(EntityKind::Movie, "Sanctuary - Wächter der Kreaturen");
        let c = candidate(EntityKind::Movie, "Sanctuary");
        assert!(test_candidates(&q, &[c], &prefs()).is_unique());
    }

    #[test]
    fn test_single_dissimilar_candidate_is_rejected() {
        let q = query(EntityKind::Movie, "Heat");
        let c = candidate(EntityKind::Movie, "Ronin");
        assert_eq!(test_candidates(&q, &[c], &prefs()), MatchOutcome::NotFound);
    }

    #[test]
    fn test_single_candidate_accepted_for_empty_name() {
        let q = query(EntityKind::Movie, "");
        let c = candidate(EntityKind::Movie, "Anything At All");
        assert!(test_candidates(&q, &[c], &prefs()).is_unique());
    }

    #[test]
    fn test_episode_numbers_bypass_name_check() {
        let mut q = query(EntityKind::Episode, "Folge 3");
        q.entity.season = Some(1);
        q.entity.set_numbers([3]);
        let mut c = candidate(EntityKind::Episode, "Trail of Blood");
        c.entity.season = Some(1);
        c.entity.set_numbers([3]);
        assert!(test_candidates(&q, &[c.clone()], &prefs()).is_unique());

        c.entity.set_numbers([4]);
        assert_eq!(test_candidates(&q, &[c], &prefs()), MatchOutcome::NotFound);
    }

    #[test]
    fn test_year_filter_picks_unique() {
        let mut q = query(EntityKind::Movie, "Dune");
        q.entity.year = Some(2021);
        let candidates = vec![
            with_year(candidate(EntityKind::Movie, "Dune"), 1984),
            with_year(candidate(EntityKind::Movie, "Dune"), 2021),
        ];

        match test_candidates(&q, &candidates, &prefs()) {
            MatchOutcome::Unique(c) => assert_eq!(c.entity.year, Some(2021)),
            other => panic!("expected unique, got {other:?}"),
        }
    }

    #[test]
    fn test_year_filter_without_match_is_skipped() {
        let mut q = query(EntityKind::Movie, "Dune");
        q.entity.year = Some(1999);
        let candidates = vec![
            with_year(candidate(EntityKind::Movie, "Dune"), 1984),
            with_year(candidate(EntityKind::Movie, "Dune Messiah"), 2021),
        ];
        // Year filter is a no-op; exact name then narrows to one
        match test_candidates(&q, &candidates, &prefs()) {
            MatchOutcome::Unique(c) => assert_eq!(c.entity.year, Some(1984)),
            other => panic!("expected unique, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_name_narrows() {
        let q = query(EntityKind::Movie, "Alien");
        let candidates = vec![
            candidate(EntityKind::Movie, "Aliens"),
            candidate(EntityKind::Movie, "Alien"),
            candidate(EntityKind::Movie, "Alien: Covenant"),
        ];
        assert_eq!(
            test_candidates(&q, &candidates, &prefs()).unique().map(Candidate::name),
            Some("Alien")
        );
    }

    #[test]
    fn test_language_filter_prefers_hint_or_undeclared() {
        let mut q = query(EntityKind::Movie, "Heat");
        q.language_hint = Some("fr".to_string());
        let mut german = candidate(EntityKind::Movie, "Heat");
        german.entity.languages = vec!["de".to_string()];
        let mut french = candidate(EntityKind::Movie, "Heat");
        french.entity.languages = vec!["fr".to_string()];

        match test_candidates(&q, &[german, french], &prefs()) {
            MatchOutcome::Unique(c) => assert_eq!(c.entity.languages, vec!["fr".to_string()]),
            other => panic!("expected unique, got {other:?}"),
        }
    }

    #[test]
    fn test_never_narrowing_pipeline_is_ambiguous() {
        let q = query(EntityKind::Movie, "Heat");
        let candidates = vec![
            candidate(EntityKind::Movie, "Heat"),
            candidate(EntityKind::Movie, "Heat"),
            candidate(EntityKind::Movie, "Heat"),
        ];
        match test_candidates(&q, &candidates, &prefs()) {
            MatchOutcome::Ambiguous(set) => assert!(set.len() >= 2),
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_unrelated_candidates_stay_ambiguous() {
        let q = query(EntityKind::Company, "Pixar");
        let candidates = vec![
            candidate(EntityKind::Company, "Warner Bros."),
            candidate(EntityKind::Company, "Universal Pictures"),
        ];
        assert_eq!(
            test_candidates(&q, &candidates, &prefs()),
            MatchOutcome::Ambiguous(candidates.clone())
        );
    }

    #[test]
    fn test_person_near_duplicates_collapse() {
        let q = query(EntityKind::Person, "Ken Watanabe");
        let candidates = vec![
            with_year(candidate(EntityKind::Person, "Ken Watanabe"), 1959),
            candidate(EntityKind::Person, "Ken Watanabe"),
        ];
        match test_candidates(&q, &candidates, &prefs()) {
            MatchOutcome::Unique(c) => assert_eq!(c.entity.year, Some(1959)),
            other => panic!("expected unique, got {other:?}"),
        }
    }

    #[test]
    fn test_movie_near_duplicates_do_not_collapse() {
        let q = query(EntityKind::Movie, "Heat");
        let candidates = vec![
            candidate(EntityKind::Movie, "Heat"),
            candidate(EntityKind::Movie, "Heat"),
        ];
        assert!(matches!(
            test_candidates(&q, &candidates, &prefs()),
            MatchOutcome::Ambiguous(_)
        ));
    }

    #[test]
    fn test_narrow_keeps_set_when_filter_empties_it() {
        let a = candidate(EntityKind::Movie, "A");
        let b = candidate(EntityKind::Movie, "B");
        let set = narrow(vec![&a, &b], "never", |_| false);
        assert_eq!(set.len(), 2);
        let set = narrow(set, "only b", |c| c.name() == "B");
        assert_eq!(set.len(), 1);
    }
}
