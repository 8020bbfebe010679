//! Audio (track and album) disambiguation.
//!
//! Music catalogs return many releases of the same recording: remasters,
//! regional pressings, compilations. Before the generic pipeline runs, the
//! candidates go through a strictly ordered checklist, each step committed
//! only if it leaves at least one candidate.
//!
//! A unique audio result must also be corroborated by the query (shared
//! album, artist or release year), otherwise it is downgraded to `NotFound`.

use tracing::debug;

use super::domain::{Candidate, LanguagePreference, MatchOutcome, MediaEntity, Query};
use super::normalize::normalize;
use super::similarity::{is_similar_or_equal, loosely_equal};
use super::tester::{accepts_single, classify, narrow, run_pipeline};

/// Checklist steps, in the order they are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AudioFilter {
    ArtistLoose,
    ArtistStrict,
    AlbumLoose,
    AlbumStrict,
    ReleaseYear,
    TrackNumber,
    DiscNumber,
    DiscPresence,
    Language,
    Compilation,
    Barcode,
    ReleaseGroup,
    CoverArt,
}

const CHECKLIST: [AudioFilter; 13] = [
    AudioFilter::ArtistLoose,
    AudioFilter::ArtistStrict,
    AudioFilter::AlbumLoose,
    AudioFilter::AlbumStrict,
    AudioFilter::ReleaseYear,
    AudioFilter::TrackNumber,
    AudioFilter::DiscNumber,
    AudioFilter::DiscPresence,
    AudioFilter::Language,
    AudioFilter::Compilation,
    AudioFilter::Barcode,
    AudioFilter::ReleaseGroup,
    AudioFilter::CoverArt,
];

pub(crate) fn test_audio_candidates(
    query: &Query,
    candidates: &[Candidate],
    languages: &LanguagePreference,
) -> MatchOutcome {
    let outcome = match candidates {
        [] => return MatchOutcome::NotFound,
        [single] if accepts_single(query, single) => MatchOutcome::Unique(single.clone()),
        [_] => MatchOutcome::NotFound,
        _ => {
            let set = run_checklist(query, candidates.iter().collect(), languages);
            let set = if set.len() > 1 {
                run_pipeline(query, set, languages)
            } else {
                set
            };
            classify(query.kind(), set)
        }
    };

    match outcome {
        MatchOutcome::Unique(c) if !corroborates(&query.entity, &c.entity) => {
            debug!(
                query = %query.name(),
                candidate = %c.name(),
                "audio match not corroborated by album, artist or year"
            );
            MatchOutcome::NotFound
        }
        other => other,
    }
}

fn run_checklist<'c>(
    query: &Query,
    set: Vec<&'c Candidate>,
    languages: &LanguagePreference,
) -> Vec<&'c Candidate> {
    let mut last_good = set;
    for filter in CHECKLIST {
        if last_good.len() <= 1 {
            break;
        }
        last_good = apply(filter, &query.entity, last_good, languages);
    }
    last_good
}

fn apply<'c>(
    filter: AudioFilter,
    q: &MediaEntity,
    set: Vec<&'c Candidate>,
    languages: &LanguagePreference,
) -> Vec<&'c Candidate> {
    match filter {
        AudioFilter::ArtistLoose if q.audio.has_any_artist() => {
            narrow(set, "artist (loose)", |c| {
                shares_artist(q, &c.entity, loosely_equal)
            })
        }
        AudioFilter::ArtistStrict if q.audio.has_any_artist() => {
            narrow(set, "artist (strict)", |c| {
                shares_artist(q, &c.entity, |a, b| normalize(a) == normalize(b))
            })
        }
        AudioFilter::AlbumLoose => match q.album_title() {
            Some(album) => narrow(set, "album (loose)", |c| {
                c.entity.album_title().is_some_and(|a| loosely_equal(a, album))
            }),
            None => set,
        },
        AudioFilter::AlbumStrict => match q.album_title() {
            Some(album) => {
                let album = normalize(album);
                narrow(set, "album (strict)", |c| {
                    c.entity.album_title().is_some_and(|a| normalize(a) == album)
                })
            }
            None => set,
        },
        AudioFilter::ReleaseYear => match q.year {
            Some(year) => narrow(set, "release year", |c| c.entity.year == Some(year)),
            None => set,
        },
        AudioFilter::TrackNumber => match q.audio.track_number {
            Some(n) => narrow(set, "track number", |c| c.entity.audio.track_number == Some(n)),
            None => set,
        },
        AudioFilter::DiscNumber => match q.audio.disc_number {
            Some(n) => narrow(set, "disc number", |c| c.entity.audio.disc_number == Some(n)),
            None => set,
        },
        // No disc on the query: prefer single-disc releases
        AudioFilter::DiscPresence if q.audio.disc_number.is_none() => {
            narrow(set, "disc presence", |c| {
                matches!(c.entity.audio.disc_number, None | Some(1))
            })
        }
        AudioFilter::Language => first_matching_language(set, languages),
        AudioFilter::Compilation => narrow(set, "compilation", |c| {
            c.entity.audio.compilation == q.audio.compilation
        }),
        AudioFilter::Barcode => narrow(set, "barcode", |c| c.entity.audio.has_barcode),
        AudioFilter::ReleaseGroup => narrow(set, "release group", |c| {
            c.entity.audio.release_group_id.is_some()
        }),
        AudioFilter::CoverArt => narrow(set, "cover art", |c| c.entity.audio.has_cover_art),
        // Artist steps without query artists, disc presence with a query disc
        _ => set,
    }
}

/// Preferred language, then each region in order, then default.
fn first_matching_language<'c>(
    set: Vec<&'c Candidate>,
    languages: &LanguagePreference,
) -> Vec<&'c Candidate> {
    for lang in languages.audio_chain() {
        let subset: Vec<&Candidate> = set.iter().copied().filter(|c| c.entity.speaks(lang)).collect();
        if !subset.is_empty() {
            debug!(language = lang, before = set.len(), after = subset.len(), "language filter applied");
            return subset;
        }
    }
    set
}

fn shares_artist(q: &MediaEntity, c: &MediaEntity, eq: impl Fn(&str, &str) -> bool) -> bool {
    q.audio
        .all_artists()
        .filter(|a| !a.trim().is_empty())
        .any(|qa| c.audio.all_artists().any(|ca| eq(qa, ca)))
}

/// The survivor must share album, an artist or the release year.
fn corroborates(q: &MediaEntity, c: &MediaEntity) -> bool {
    let album = match (q.album_title(), c.album_title()) {
        (Some(a), Some(b)) => is_similar_or_equal(a, b),
        _ => false,
    };
    let year = q.year.is_some() && q.year == c.year;

    album || year || shares_artist(q, c, loosely_equal)
}
