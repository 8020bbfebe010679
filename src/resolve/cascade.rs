//! Search cascade - orchestrates provider searches and candidate testing
//!
//! Stages run strictly in order and stop at the first unique match:
//! 1. Search in the preferred language
//! 2. Search in the default language (only if it differs)
//! 3. Combined-title fallback: retry 1-2 with the text before the first "-"
//!    ("Sanctuary - Wächter der Kreaturen" -> "Sanctuary"), then restore
//!    the original name
//!
//! On a unique match only identifiers are merged back into the query.

use futures::future::join_all;
use smallvec::SmallVec;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::aggregate::{CombinedRecord, UnitRecord, aggregate};
use super::domain::{
    Candidate, EntityKind, LanguagePreference, MatchOutcome, Query, Resolution, ResolveError,
    ResolvedEntity, Stage, merge_identifiers, merge_names,
};
use super::tester::test_candidates;
use super::traits::{ProviderPort, SearchRequest};

/// Per-call resolution settings
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub languages: LanguagePreference,
    /// Also copy display names from the accepted candidate
    pub update_names: bool,
    /// Resolve the parent (series, album) first when the child has no ids
    pub resolve_parent_first: bool,
    /// Checked before every stage
    pub cancel: Option<CancellationToken>,
}

impl ResolveOptions {
    pub fn new(languages: LanguagePreference) -> Self {
        Self {
            languages,
            ..Default::default()
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// Result of resolving a query that spans several episodes or tracks
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPartResolution {
    /// Combined record of every unit that resolved uniquely
    pub combined: Option<CombinedRecord>,
    /// Units that did not resolve, with their outcome
    pub unresolved: Vec<(u32, MatchOutcome)>,
}

/// Per-unit results of a multi-part resolution
struct ResolvedUnits {
    units: Vec<UnitRecord>,
    /// Candidate of the lowest-numbered unit that resolved
    first: Option<Candidate>,
    unresolved: Vec<(u32, MatchOutcome)>,
}

/// Tracks what to report once every stage is exhausted
#[derive(Default)]
struct Exhaustion {
    ambiguous: Option<Vec<Candidate>>,
    last_stage: Option<Stage>,
}

impl Exhaustion {
    fn record(&mut self, outcome: MatchOutcome, stage: Stage) {
        self.last_stage = Some(stage);
        if let MatchOutcome::Ambiguous(set) = outcome {
            self.ambiguous = Some(set);
        }
    }

    fn finish(self) -> (MatchOutcome, Stage) {
        let stage = self.last_stage.unwrap_or(Stage::PreferredLanguage);
        match self.ambiguous {
            Some(set) => (MatchOutcome::Ambiguous(set), stage),
            None => (MatchOutcome::NotFound, stage),
        }
    }
}

/// Resolution engine over one provider
pub struct SearchCascade<P> {
    provider: P,
}

impl<P: ProviderPort> SearchCascade<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolve a query and hand back the merged entity.
    pub async fn resolve(
        &self,
        mut query: Query,
        options: &ResolveOptions,
    ) -> Result<Resolution, ResolveError> {
        let (outcome, stage) = self.run(&mut query, options).await?;
        Ok(match outcome {
            MatchOutcome::Unique(candidate) => Resolution::Resolved(ResolvedEntity {
                query,
                candidate,
                stage,
            }),
            MatchOutcome::Ambiguous(set) => Resolution::Ambiguous(set),
            MatchOutcome::NotFound => Resolution::NotFound,
        })
    }

    /// Resolve a query, writing identifiers into it on a unique match.
    ///
    /// Parent identifiers found by the parent-first step stay in the query
    /// when the child itself ends `NotFound` or `Ambiguous`. They are rolled
    /// back only when resolution fails with an error.
    pub async fn resolve_in_place(
        &self,
        query: &mut Query,
        options: &ResolveOptions,
    ) -> Result<MatchOutcome, ResolveError> {
        self.run(query, options).await.map(|(outcome, _)| outcome)
    }

    /// Resolve independent queries concurrently.
    ///
    /// Results come back in input order.
    pub async fn resolve_all(
        &self,
        queries: Vec<Query>,
        options: &ResolveOptions,
    ) -> Vec<Result<Resolution, ResolveError>> {
        join_all(queries.into_iter().map(|q| self.resolve(q, options))).await
    }

    /// Return the first non-empty raw candidate list, without uniqueness testing.
    ///
    /// For callers that want any plausible list (e.g. to offer a choice).
    pub async fn search_any(
        &self,
        query: &Query,
        options: &ResolveOptions,
    ) -> Result<Vec<Candidate>, ResolveError> {
        validate(query)?;

        for (stage, language) in language_stages(&options.languages) {
            let found = self.search(query, language, stage, options).await?;
            if !found.is_empty() {
                return Ok(found);
            }
        }

        if let Some(prefix) = combined_title_prefix(query.name()) {
            let mut truncated = query.clone();
            truncated.entity.name = prefix;
            for (_, language) in language_stages(&options.languages) {
                let found = self
                    .search(&truncated, language, Stage::CombinedTitle, options)
                    .await?;
                if !found.is_empty() {
                    return Ok(found);
                }
            }
        }

        Ok(Vec::new())
    }

    /// Resolve a query covering several episode or track numbers.
    ///
    /// Each number is resolved on its own, details are fetched for every
    /// unique unit, and the units are merged into one record. The first
    /// unit's identifiers (and names, with `update_names`) are written back
    /// into the query. A query without numbers is rejected as invalid.
    pub async fn resolve_multi_part(
        &self,
        query: &mut Query,
        options: &ResolveOptions,
    ) -> Result<MultiPartResolution, ResolveError> {
        validate(query)?;
        if query.entity.numbers.is_empty() {
            return Err(ResolveError::invalid(
                query.kind(),
                "no episode or track numbers to resolve",
            ));
        }

        let snapshot = query.entity.parent_ids.clone();
        let resolved = match self.resolve_units(query, options).await {
            Ok(resolved) => resolved,
            Err(e) => {
                query.entity.parent_ids = snapshot;
                return Err(e);
            }
        };

        if let Some(ref first) = resolved.first {
            merge_identifiers(query, first);
            if options.update_names {
                merge_names(query, first);
            }
        }

        Ok(MultiPartResolution {
            combined: aggregate(&resolved.units),
            unresolved: resolved.unresolved,
        })
    }

    async fn resolve_units(
        &self,
        query: &mut Query,
        options: &ResolveOptions,
    ) -> Result<ResolvedUnits, ResolveError> {
        self.resolve_parent(query, options).await?;

        let numbers: SmallVec<[u32; 2]> = query.entity.numbers.clone();
        let mut units = Vec::with_capacity(numbers.len());
        let mut first = None;
        let mut unresolved = Vec::new();

        for number in numbers {
            let mut unit = single_unit(query, number);
            let (outcome, _) = self.cascade(&mut unit, options).await?;
            match outcome {
                MatchOutcome::Unique(candidate) => {
                    let details = self
                        .provider
                        .fetch_details(&candidate, &options.languages.preferred)
                        .await
                        .map_err(|source| self.unavailable(source))?;
                    units.push(UnitRecord::from_candidate(number, &candidate, details));
                    first.get_or_insert(candidate);
                }
                other => {
                    debug!(number, outcome = other.label(), "unit not resolved");
                    unresolved.push((number, other));
                }
            }
        }
        Ok(ResolvedUnits {
            units,
            first,
            unresolved,
        })
    }

    async fn run(
        &self,
        query: &mut Query,
        options: &ResolveOptions,
    ) -> Result<(MatchOutcome, Stage), ResolveError> {
        validate(query)?;

        let snapshot = query.entity.parent_ids.clone();
        let result = match self.resolve_parent(query, options).await {
            Ok(()) => self.cascade(query, options).await,
            Err(e) => Err(e),
        };
        let (outcome, stage) = match result {
            Ok(found) => found,
            Err(e) => {
                query.entity.parent_ids = snapshot;
                return Err(e);
            }
        };

        if let MatchOutcome::Unique(ref candidate) = outcome {
            merge_identifiers(query, candidate);
            if options.update_names {
                merge_names(query, candidate);
            }
            info!(
                kind = %query.kind(),
                name = %query.name(),
                matched = %candidate.name(),
                %stage,
                "resolved"
            );
        }

        Ok((outcome, stage))
    }

    /// The three-stage state machine.
    async fn cascade(
        &self,
        query: &mut Query,
        options: &ResolveOptions,
    ) -> Result<(MatchOutcome, Stage), ResolveError> {
        let mut exhaustion = Exhaustion::default();

        if let Some(found) = self.language_pass(query, options, false, &mut exhaustion).await? {
            return Ok(found);
        }

        if let Some(prefix) = combined_title_prefix(query.name()) {
            debug!(name = %query.name(), %prefix, "trying combined-title fallback");
            let original = std::mem::replace(&mut query.entity.name, prefix);
            let result = self.language_pass(query, options, true, &mut exhaustion).await;
            query.entity.name = original;

            if let Some(found) = result? {
                return Ok(found);
            }
        }

        Ok(exhaustion.finish())
    }

    /// Preferred then default language with the query's current name.
    async fn language_pass(
        &self,
        query: &Query,
        options: &ResolveOptions,
        fallback: bool,
        exhaustion: &mut Exhaustion,
    ) -> Result<Option<(MatchOutcome, Stage)>, ResolveError> {
        for (stage, language) in language_stages(&options.languages) {
            let stage = if fallback { Stage::CombinedTitle } else { stage };
            let candidates = self.search(query, language, stage, options).await?;
            let outcome = test_candidates(query, &candidates, &options.languages);
            debug!(
                %stage,
                language,
                candidates = candidates.len(),
                outcome = outcome.label(),
                "stage finished"
            );

            if outcome.is_unique() {
                return Ok(Some((outcome, stage)));
            }
            exhaustion.record(outcome, stage);
        }
        Ok(None)
    }

    async fn search(
        &self,
        query: &Query,
        language: &str,
        stage: Stage,
        options: &ResolveOptions,
    ) -> Result<Vec<Candidate>, ResolveError> {
        if options.is_cancelled() {
            debug!(%stage, "resolution cancelled at stage boundary");
            return Err(ResolveError::Cancelled);
        }

        self.provider
            .search(&SearchRequest::new(query, language))
            .await
            .map_err(|source| self.unavailable(source))
    }

    /// Resolve the parent entity first when enabled and the child carries no identifiers.
    async fn resolve_parent(
        &self,
        query: &mut Query,
        options: &ResolveOptions,
    ) -> Result<(), ResolveError> {
        if !options.resolve_parent_first
            || !query.entity.ids.is_empty()
            || !query.entity.parent_ids.is_empty()
        {
            return Ok(());
        }
        let Some(mut parent) = query.parent() else {
            return Ok(());
        };
        if let Err(e) = validate(&parent) {
            debug!(error = %e, "parent projection not searchable");
            return Ok(());
        }

        match self.cascade(&mut parent, options).await? {
            (MatchOutcome::Unique(candidate), _) => {
                debug!(parent = %candidate.name(), "parent resolved");
                query.entity.parent_ids.merge_from(&candidate.entity.ids);
            }
            (other, _) => {
                debug!(
                    outcome = other.label(),
                    "parent unresolved, searching child without parent ids"
                );
            }
        }
        Ok(())
    }

    fn unavailable(&self, source: super::domain::ProviderError) -> ResolveError {
        warn!(provider = self.provider.name(), error = %source, "provider unavailable");
        ResolveError::ProviderUnavailable {
            provider: self.provider.name().to_string(),
            source,
        }
    }
}

/// Reject queries that lack the minimum discriminators for their kind.
pub fn validate(query: &Query) -> Result<(), ResolveError> {
    let e = &query.entity;
    let has_name = !e.name.trim().is_empty();

    match e.kind {
        EntityKind::Track | EntityKind::Album if !e.audio.has_any_artist() => Err(
            ResolveError::invalid(e.kind, "no artist or album artist"),
        ),
        EntityKind::Season if e.season.is_none() => {
            Err(ResolveError::invalid(e.kind, "no season number"))
        }
        EntityKind::Episode if !has_name && (e.season.is_none() || e.numbers.is_empty()) => Err(
            ResolveError::invalid(e.kind, "neither a name nor season and episode numbers"),
        ),
        EntityKind::Movie
        | EntityKind::Series
        | EntityKind::Person
        | EntityKind::Character
        | EntityKind::Company
            if !has_name && e.ids.is_empty() =>
        {
            Err(ResolveError::invalid(e.kind, "neither a name nor any identifier"))
        }
        _ => Ok(()),
    }
}

/// Text before the first "-", if it is a usable shorter title.
fn combined_title_prefix(name: &str) -> Option<String> {
    let (head, _) = name.split_once('-')?;
    let head = head.trim();
    (!head.is_empty() && head != name.trim()).then(|| head.to_string())
}

fn language_stages(languages: &LanguagePreference) -> Vec<(Stage, &str)> {
    let mut stages = vec![(Stage::PreferredLanguage, languages.preferred.as_str())];
    if languages.has_distinct_default() {
        stages.push((Stage::DefaultLanguage, languages.default.as_str()));
    }
    stages
}

/// Narrow a multi-part query to one episode or track number.
fn single_unit(query: &Query, number: u32) -> Query {
    let mut unit = query.clone();
    unit.entity.set_numbers([number]);
    if unit.kind() == EntityKind::Track {
        unit.entity.audio.track_number = Some(number);
    }
    unit
}
