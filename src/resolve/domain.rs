//! Internal domain models for entity resolution.
//!
//! These types are OUR types - providers convert their catalog responses into
//! them before anything reaches the matching engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Kind of media entity being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Movie,
    Series,
    Episode,
    Season,
    Person,
    Character,
    Company,
    Track,
    Album,
}

impl EntityKind {
    /// Episodes and seasons can be matched on their numbers alone.
    pub fn is_episode_like(self) -> bool {
        matches!(self, Self::Episode | Self::Season)
    }

    /// Tracks and albums go through the audio checklist.
    pub fn is_audio(self) -> bool {
        matches!(self, Self::Track | Self::Album)
    }

    /// The natural parent kind, if any.
    pub fn parent(self) -> Option<EntityKind> {
        match self {
            Self::Episode | Self::Season => Some(Self::Series),
            Self::Track => Some(Self::Album),
            _ => None,
        }
    }

    /// Whether two near-identical survivors are assumed to be the same entity.
    ///
    /// Catalogs routinely list the same person twice (a stub plus the full
    /// record). Titles and companies with the same name are genuinely
    /// different entities, so they stay ambiguous.
    pub fn collapses_near_duplicates(self) -> bool {
        matches!(self, Self::Person)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Episode => "episode",
            Self::Season => "season",
            Self::Person => "person",
            Self::Character => "character",
            Self::Company => "company",
            Self::Track => "track",
            Self::Album => "album",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "series" | "show" | "tvshow" => Ok(Self::Series),
            "episode" => Ok(Self::Episode),
            "season" => Ok(Self::Season),
            "person" => Ok(Self::Person),
            "character" => Ok(Self::Character),
            "company" => Ok(Self::Company),
            "track" => Ok(Self::Track),
            "album" => Ok(Self::Album),
            other => Err(format!("unknown entity kind: {other}")),
        }
    }
}

/// External catalog an identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Catalog {
    Imdb,
    Tmdb,
    Tvdb,
    #[serde(rename = "tvmaze")]
    TvMaze,
    #[serde(rename = "musicbrainz")]
    MusicBrainz,
    #[serde(rename = "musicbrainz_release_group")]
    MusicBrainzReleaseGroup,
    Discogs,
    #[serde(rename = "anidb")]
    AniDb,
}

impl Catalog {
    pub const ALL: [Catalog; 8] = [
        Self::Imdb,
        Self::Tmdb,
        Self::Tvdb,
        Self::TvMaze,
        Self::MusicBrainz,
        Self::MusicBrainzReleaseGroup,
        Self::Discogs,
        Self::AniDb,
    ];

    /// Key used in catalog files and CLI output
    pub fn key(self) -> &'static str {
        match self {
            Self::Imdb => "imdb",
            Self::Tmdb => "tmdb",
            Self::Tvdb => "tvdb",
            Self::TvMaze => "tvmaze",
            Self::MusicBrainz => "musicbrainz",
            Self::MusicBrainzReleaseGroup => "musicbrainz_release_group",
            Self::Discogs => "discogs",
            Self::AniDb => "anidb",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Known external identifiers, one slot per catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalIds(BTreeMap<Catalog, String>);

impl ExternalIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; empty ids are ignored.
    pub fn with(mut self, catalog: Catalog, id: impl Into<String>) -> Self {
        self.set(catalog, id);
        self
    }

    /// Set a slot. An empty id clears it.
    pub fn set(&mut self, catalog: Catalog, id: impl Into<String>) {
        let id = id.into();
        if id.trim().is_empty() {
            self.0.remove(&catalog);
        } else {
            self.0.insert(catalog, id);
        }
    }

    pub fn get(&self, catalog: Catalog) -> Option<&str> {
        self.0.get(&catalog).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Catalog, &str)> {
        self.0.iter().map(|(c, id)| (*c, id.as_str()))
    }

    /// Copy every slot present in `other`, overwriting our value for that slot
    pub fn merge_from(&mut self, other: &ExternalIds) {
        for (catalog, id) in other.iter() {
            self.set(catalog, id);
        }
    }
}

/// Audio-specific discriminators (tracks and albums)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioInfo {
    /// Track or release artists
    pub artists: Vec<String>,
    /// Album artists
    pub album_artists: Vec<String>,
    /// Album title (tracks only; an album's title is its name)
    pub album: Option<String>,
    /// Position on the medium
    pub track_number: Option<u32>,
    /// Medium position for multi-disc releases
    pub disc_number: Option<u32>,
    /// Release is a compilation
    pub compilation: bool,
    /// Release carries a barcode
    pub has_barcode: bool,
    /// Release has front cover art
    pub has_cover_art: bool,
    /// MusicBrainz release group ID
    pub release_group_id: Option<String>,
}

impl AudioInfo {
    /// Artists and album artists together
    pub fn all_artists(&self) -> impl Iterator<Item = &str> {
        self.artists
            .iter()
            .chain(self.album_artists.iter())
            .map(String::as_str)
    }

    pub fn has_any_artist(&self) -> bool {
        self.all_artists().any(|a| !a.trim().is_empty())
    }
}

/// A credited person (actor, director, writer)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credit {
    pub name: String,
    /// Role played (actors only)
    pub role: Option<String>,
    /// Catalog-specific person ID
    pub id: Option<String>,
}

impl Credit {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Descriptive fields fetched for a resolved unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Details {
    pub summary: Option<String>,
    /// Average rating as reported by the catalog
    pub rating: Option<f32>,
    /// Number of votes behind the rating
    pub votes: Option<u32>,
    pub actors: Vec<Credit>,
    pub genres: Vec<String>,
    pub directors: Vec<Credit>,
    pub writers: Vec<Credit>,
    pub characters: Vec<String>,
    /// Thumbnail URL
    pub thumbnail: Option<String>,
}

/// The shape shared by queries and candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaEntity {
    pub kind: EntityKind,
    /// Primary (display) name
    pub name: String,
    /// Original-language name
    pub original_name: Option<String>,
    /// Further known names (aliases, translations)
    pub alternate_names: Vec<String>,
    pub year: Option<i32>,
    pub season: Option<u32>,
    /// Episode or track numbers, sorted and de-duplicated
    pub numbers: SmallVec<[u32; 2]>,
    pub ids: ExternalIds,
    /// Name of the parent entity (series for episodes, album for tracks)
    pub parent_name: Option<String>,
    /// Identifiers of the parent entity
    pub parent_ids: ExternalIds,
    /// Languages this record is available in (empty = undeclared)
    pub languages: Vec<String>,
    pub audio: AudioInfo,
    pub details: Details,
}

impl MediaEntity {
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            original_name: None,
            alternate_names: Vec::new(),
            year: None,
            season: None,
            numbers: SmallVec::new(),
            ids: ExternalIds::new(),
            parent_name: None,
            parent_ids: ExternalIds::new(),
            languages: Vec::new(),
            audio: AudioInfo::default(),
            details: Details::default(),
        }
    }

    /// Replace the number set, keeping it sorted and unique
    pub fn set_numbers(&mut self, numbers: impl IntoIterator<Item = u32>) {
        let mut numbers: SmallVec<[u32; 2]> = numbers.into_iter().collect();
        numbers.sort_unstable();
        numbers.dedup();
        self.numbers = numbers;
    }

    /// Primary name plus the original name, skipping empty ones
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.original_name.as_deref())
            .filter(|n| !n.trim().is_empty())
    }

    /// The album title as used for audio matching
    pub fn album_title(&self) -> Option<&str> {
        let album = match self.kind {
            EntityKind::Album => Some(self.name.as_str()),
            _ => self.audio.album.as_deref(),
        };
        album.filter(|a| !a.trim().is_empty())
    }

    pub fn has_languages(&self) -> bool {
        !self.languages.is_empty()
    }

    pub fn speaks(&self, language: &str) -> bool {
        self.languages.iter().any(|l| l.eq_ignore_ascii_case(language))
    }
}

/// A local, partial description of an entity to be resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub entity: MediaEntity,
    /// Language the local record is in; overrides the preferred language
    pub language_hint: Option<String>,
}

impl Query {
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            entity: MediaEntity::new(kind, name),
            language_hint: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.entity.kind
    }

    pub fn name(&self) -> &str {
        &self.entity.name
    }

    /// Narrow to the parent entity (episode → series, track → album)
    ///
    /// Returns `None` for kinds without a parent or when there is nothing
    /// to search the parent by.
    pub fn parent(&self) -> Option<Query> {
        let parent_kind = self.kind().parent()?;
        let e = &self.entity;

        let name = match parent_kind {
            EntityKind::Album => e.audio.album.clone().or_else(|| e.parent_name.clone()),
            _ => e.parent_name.clone(),
        }
        .filter(|n| !n.trim().is_empty());

        if name.is_none() && e.parent_ids.is_empty() {
            return None;
        }

        let mut parent = MediaEntity::new(parent_kind, name.unwrap_or_default());
        parent.ids = e.parent_ids.clone();

        if parent_kind == EntityKind::Album {
            parent.year = e.year;
            parent.audio.artists = if e.audio.album_artists.is_empty() {
                e.audio.artists.clone()
            } else {
                e.audio.album_artists.clone()
            };
            parent.audio.album_artists = e.audio.album_artists.clone();
            parent.audio.disc_number = e.audio.disc_number;
            parent.audio.compilation = e.audio.compilation;
        }

        Some(Query {
            entity: parent,
            language_hint: self.language_hint.clone(),
        })
    }
}

/// Where a candidate came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Provider name
    pub provider: String,
    /// Language the search was issued in
    pub language: Option<String>,
}

/// One provider's proposal for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub entity: MediaEntity,
    pub provenance: Provenance,
}

impl Candidate {
    pub fn new(entity: MediaEntity, provenance: Provenance) -> Self {
        Self { entity, provenance }
    }

    pub fn name(&self) -> &str {
        &self.entity.name
    }
}

/// Ordered language chain, passed explicitly with every call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePreference {
    pub preferred: String,
    pub default: String,
    /// Region fallbacks, only used to disambiguate audio releases
    pub regions: Vec<String>,
}

impl LanguagePreference {
    pub fn new(preferred: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            preferred: preferred.into(),
            default: default.into(),
            regions: Vec::new(),
        }
    }

    pub fn with_regions(mut self, regions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    /// Whether stage 2 of the cascade is worth running
    pub fn has_distinct_default(&self) -> bool {
        !self.preferred.eq_ignore_ascii_case(&self.default)
    }

    /// Preferred, each region in order, then default; without repeats
    pub fn audio_chain(&self) -> Vec<&str> {
        let mut chain: Vec<&str> = Vec::with_capacity(self.regions.len() + 2);
        let all = std::iter::once(self.preferred.as_str())
            .chain(self.regions.iter().map(String::as_str))
            .chain(std::iter::once(self.default.as_str()));
        for lang in all {
            if !lang.is_empty() && !chain.iter().any(|l| l.eq_ignore_ascii_case(lang)) {
                chain.push(lang);
            }
        }
        chain
    }
}

impl Default for LanguagePreference {
    fn default() -> Self {
        Self::new("en", "en")
    }
}

/// Result of testing one candidate set
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Unique(Candidate),
    Ambiguous(Vec<Candidate>),
    NotFound,
}

impl MatchOutcome {
    pub fn is_unique(&self) -> bool {
        matches!(self, Self::Unique(_))
    }

    pub fn unique(&self) -> Option<&Candidate> {
        match self {
            Self::Unique(c) => Some(c),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unique(_) => "unique",
            Self::Ambiguous(_) => "ambiguous",
            Self::NotFound => "not found",
        }
    }
}

/// Cascade stage that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PreferredLanguage,
    DefaultLanguage,
    CombinedTitle,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PreferredLanguage => "preferred language",
            Self::DefaultLanguage => "default language",
            Self::CombinedTitle => "combined-title fallback",
        })
    }
}

/// A query merged with the identifiers of its accepted candidate
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntity {
    /// The query with identifiers written back
    pub query: Query,
    /// The candidate that was accepted
    pub candidate: Candidate,
    pub stage: Stage,
}

/// Outcome of a full resolution call
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedEntity),
    Ambiguous(Vec<Candidate>),
    NotFound,
}

/// Transport or protocol failure reported by a provider
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Errors that abort a resolution
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("Provider {provider} unavailable: {source}")]
    ProviderUnavailable {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("Invalid {kind} query: {reason}")]
    InvalidQuery { kind: EntityKind, reason: String },

    #[error("Resolution cancelled")]
    Cancelled,
}

impl ResolveError {
    pub fn invalid(kind: EntityKind, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            kind,
            reason: reason.into(),
        }
    }
}

/// Copy identifier fields, never display fields, from `candidate` into `query`
pub fn merge_identifiers(query: &mut Query, candidate: &Candidate) {
    let target = &mut query.entity;
    let source = &candidate.entity;

    target.ids.merge_from(&source.ids);
    target.parent_ids.merge_from(&source.parent_ids);
    if let Some(ref rg) = source.audio.release_group_id {
        target.audio.release_group_id = Some(rg.clone());
    }
}

/// Copy display names from the candidate (only on explicit request)
pub fn merge_names(query: &mut Query, candidate: &Candidate) {
    let source = &candidate.entity;
    if !source.name.trim().is_empty() {
        query.entity.name = source.name.clone();
    }
    if source.original_name.is_some() {
        query.entity.original_name = source.original_name.clone();
    }
}
