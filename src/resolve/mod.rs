//! Entity resolution - match local records against external catalogs.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - queries, candidates, outcomes, errors
//! - **Normalizer** (`normalize.rs`) - the canonical comparison form of a name
//! - **Similarity** (`similarity.rs`) - edit distance and looser name tests
//! - **Tester** (`tester.rs`, `audio.rs`) - decides whether a candidate set
//!   contains exactly one match
//! - **Cascade** (`cascade.rs`) - orders the provider searches and merges
//!   identifiers back into the query
//! - **Aggregate** (`aggregate.rs`) - merges multi-part units into one record
//! - **Provider port** (`traits.rs`) - the catalog boundary, with mocks
//! - **Catalog** (`catalog/`) - a JSON file provider (DTO, adapter, client)
//!
//! # Usage
//!
//! ```ignore
//! use media_resolver::resolve::{
//!     EntityKind, FileCatalog, LanguagePreference, Query, ResolveOptions, SearchCascade,
//! };
//!
//! let catalog = FileCatalog::open("catalog.json").await?;
//! let cascade = SearchCascade::new(catalog);
//! let options = ResolveOptions::new(LanguagePreference::new("de", "en"));
//!
//! let mut query = Query::new(EntityKind::Series, "Sanctuary - Wächter der Kreaturen");
//! let outcome = cascade.resolve_in_place(&mut query, &options).await?;
//! println!("{}: {:?}", outcome.label(), query.entity.ids);
//! ```

pub mod aggregate;
mod audio;
pub mod cascade;
pub mod catalog;
pub mod domain;
pub mod normalize;
pub mod similarity;
pub mod tester;
pub mod traits;

pub use aggregate::{CombinedRecord, UnitRecord, aggregate};
pub use cascade::{MultiPartResolution, ResolveOptions, SearchCascade, validate};
pub use catalog::{CatalogError, FileCatalog};
pub use domain::{
    Candidate, Catalog, EntityKind, ExternalIds, LanguagePreference, MatchOutcome, MediaEntity,
    ProviderError, Query, Resolution, ResolveError, ResolvedEntity, Stage,
};
pub use normalize::normalize;
pub use tester::test_candidates;
pub use traits::{ProviderPort, SearchRequest};
