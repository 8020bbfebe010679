//! Similarity scoring between names and entities.
//!
//! Two tests exist and they are NOT interchangeable:
//! - [`is_similar_or_equal`] is the primary test (edit distance ≤ [`MAX_DISTANCE`])
//! - [`mostly_equal`] is a looser containment test, only ever consulted after
//!   the strict test has failed

use super::domain::{EntityKind, MediaEntity};
use super::normalize::normalize;

/// Edit distance at which two normalized names are still considered equal.
pub const MAX_DISTANCE: usize = 4;

/// Edit distance between the normalized forms of `a` and `b`.
pub fn distance(a: &str, b: &str) -> usize {
    normalized_distance(&normalize(a), &normalize(b))
}

fn normalized_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Normalized equality or distance within [`MAX_DISTANCE`].
pub fn is_similar_or_equal(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    a == b || normalized_distance(&a, &b) <= MAX_DISTANCE
}

/// Smallest distance between any name of `candidate` and any name of `query`.
///
/// Both primary and original names take part, so a match in either is enough.
/// Returns `usize::MAX` when one side has no usable name.
pub fn name_distance(candidate: &MediaEntity, query: &MediaEntity) -> usize {
    let query_names: Vec<String> = query.names().map(normalize).collect();

    candidate
        .names()
        .map(normalize)
        .flat_map(|c| {
            query_names
                .iter()
                .map(move |q| normalized_distance(&c, q))
                .collect::<Vec<_>>()
        })
        .min()
        .unwrap_or(usize::MAX)
}

/// Exact normalized equality of the primary names, or of an original or
/// alternate name of the candidate with one of the query's names.
pub fn names_equal(candidate: &MediaEntity, query: &MediaEntity) -> bool {
    let query_names: Vec<String> = query
        .names()
        .map(normalize)
        .filter(|n| !n.is_empty())
        .collect();
    if query_names.is_empty() {
        return false;
    }

    candidate
        .names()
        .chain(candidate.alternate_names.iter().map(String::as_str))
        .map(normalize)
        .any(|c| query_names.contains(&c))
}

/// Looser, entity-specific equality used as a second chance.
///
/// True when one normalized name starts with or contains the other, when an
/// alternate name of the candidate equals the query name, or (people and
/// characters) when both names have the same tokens in a different order.
pub fn mostly_equal(candidate: &MediaEntity, query: &MediaEntity) -> bool {
    let query_name = normalize(&query.name);
    if query_name.is_empty() {
        return false;
    }

    let contained = candidate.names().map(normalize).any(|c| {
        !c.is_empty()
            && (c.starts_with(&query_name)
                || query_name.starts_with(&c)
                || c.contains(&query_name)
                || query_name.contains(&c))
    });
    if contained {
        return true;
    }

    if candidate
        .alternate_names
        .iter()
        .any(|alt| normalize(alt) == query_name)
    {
        return true;
    }

    match query.kind {
        EntityKind::Person | EntityKind::Character => candidate
            .names()
            .any(|c| same_tokens(&normalize(c), &query_name)),
        _ => false,
    }
}

/// Loose containment between two free-form strings (artists, album titles).
pub fn loosely_equal(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

fn same_tokens(a: &str, b: &str) -> bool {
    let mut a: Vec<&str> = a.split(' ').collect();
    let mut b: Vec<&str> = b.split(' ').collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(name: &str) -> MediaEntity {
        MediaEntity::new(EntityKind::Movie, name)
    }

    #[test]
    fn test_distance_uses_normalized_names() {
        assert_eq!(distance("Wächter", "wachter"), 0);
        assert_eq!(distance("Kill Bill: Vol. 1", "kill bill vol 1"), 0);
        assert_eq!(distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_similar_threshold() {
        assert!(is_similar_or_equal("The Matrix", "The Matrix"));
        assert!(is_similar_or_equal("Matrix", "The Matrix")); // 4 insertions
        assert!(!is_similar_or_equal("Matrix", "The Matrix Reloaded"));
    }

    #[test]
    fn test_name_distance_takes_minimum_over_original_name() {
        let mut candidate = movie("Das Leben der Anderen");
        candidate.original_name = Some("The Lives of Others".to_string());
        let query = movie("The Lives of Others");

        assert_eq!(name_distance(&candidate, &query), 0);
    }

    #[test]
    fn test_name_distance_without_names() {
        assert_eq!(name_distance(&movie(""), &movie("Heat")), usize::MAX);
    }

    #[test]
    fn test_names_equal_with_alternate() {
        let mut candidate = movie("Crouching Tiger, Hidden Dragon");
        candidate.alternate_names = vec!["Wo hu cang long".to_string()];
        assert!(names_equal(&candidate, &movie("Wo Hu Cang Long")));
        assert!(!names_equal(&candidate, &movie("Hidden Dragon")));
    }

    #[test]
    fn test_mostly_equal_containment() {
        assert!(mostly_equal(
            &movie("Sanctuary"),
            &movie("Sanctuary - Wächter der Kreaturen")
        ));
        assert!(mostly_equal(&movie("Alien: Covenant"), &movie("Alien")));
        assert!(!mostly_equal(&movie("Heat"), &movie("Ronin")));
    }

    #[test]
    fn test_mostly_equal_never_matches_empty_names() {
        assert!(!mostly_equal(&movie("Heat"), &movie("")));
        assert!(!mostly_equal(&movie(""), &movie("Heat")));
    }

    #[test]
    fn test_mostly_equal_person_token_order() {
        let candidate = MediaEntity::new(EntityKind::Person, "Watanabe Ken");
        let query = MediaEntity::new(EntityKind::Person, "Ken Watanabe");
        assert!(mostly_equal(&candidate, &query));

        // Token order only counts for people and characters
        assert!(!mostly_equal(&movie("Watanabe Ken"), &movie("Ken Watanabe")));
    }

    #[test]
    fn test_loosely_equal() {
        assert!(loosely_equal("Queen", "Queen & David Bowie"));
        assert!(!loosely_equal("", "Queen"));
        assert!(!loosely_equal("Blur", "Oasis"));
    }
}

/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A name is always at distance zero from itself
        #[test]
        fn distance_is_reflexive(a in "\\PC{0,30}") {
            prop_assert_eq!(distance(&a, &a), 0);
        }

        /// Distance does not depend on argument order
        #[test]
        fn distance_is_symmetric(a in "[a-zA-Z ]{0,20}", b in "[a-zA-Z ]{0,20}") {
            prop_assert_eq!(distance(&a, &b), distance(&b, &a));
        }

        /// Equal names are always similar
        #[test]
        fn equal_names_are_similar(a in "[a-zA-Zäöü0-9 :-]{0,30}") {
            prop_assert!(is_similar_or_equal(&a, &a));
        }
    }
}
