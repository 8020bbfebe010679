//! The provider boundary.
//!
//! [`ProviderPort`] is the only way the engine talks to a catalog. Production
//! code plugs in a real catalog client, the CLI uses
//! [`FileCatalog`](super::catalog::FileCatalog), and tests substitute the
//! mocks below.
//!
//! # Example
//!
//! ```ignore
//! use media_resolver::resolve::{SearchCascade, ProviderPort};
//!
//! fn build<P: ProviderPort>(provider: P) -> SearchCascade<P> {
//!     SearchCascade::new(provider)
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use super::domain::{Candidate, Details, EntityKind, ProviderError, Query};

/// One search issued by a cascade stage
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    /// The query as seen by this stage (its name may be truncated)
    pub query: &'a Query,
    /// Language this stage searches in
    pub language: &'a str,
}

impl<'a> SearchRequest<'a> {
    pub fn new(query: &'a Query, language: &'a str) -> Self {
        Self { query, language }
    }

    pub fn kind(&self) -> EntityKind {
        self.query.kind()
    }

    pub fn name(&self) -> &'a str {
        &self.query.entity.name
    }
}

/// A metadata catalog.
///
/// Implementations must return an empty list when there is simply no result
/// and reserve errors for transport or protocol failures. Candidates must
/// already be in the canonical [`Candidate`] shape.
#[async_trait]
pub trait ProviderPort: Send + Sync {
    /// Provider name, used in provenance and errors
    fn name(&self) -> &str;

    /// Search the catalog.
    async fn search(&self, request: &SearchRequest<'_>) -> Result<Vec<Candidate>, ProviderError>;

    /// Fetch descriptive details for an accepted candidate.
    ///
    /// Catalogs that return details with their search results can rely on
    /// the default, which hands back what the candidate already carries.
    async fn fetch_details(
        &self,
        candidate: &Candidate,
        _language: &str,
    ) -> Result<Details, ProviderError> {
        Ok(candidate.entity.details.clone())
    }
}

#[async_trait]
impl<P: ProviderPort + ?Sized> ProviderPort for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn search(&self, request: &SearchRequest<'_>) -> Result<Vec<Candidate>, ProviderError> {
        (**self).search(request).await
    }

    async fn fetch_details(
        &self,
        candidate: &Candidate,
        language: &str,
    ) -> Result<Details, ProviderError> {
        (**self).fetch_details(candidate, language).await
    }
}
