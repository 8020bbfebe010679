//! File-backed catalog client
//!
//! Loads a JSON catalog once and answers searches from memory. Search mimics
//! a remote catalog: it is deliberately loose on names and leaves the
//! disambiguation to the cascade.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{adapter, dto};
use crate::resolve::domain::{Candidate, ExternalIds, MediaEntity, ProviderError};
use crate::resolve::similarity::{is_similar_or_equal, loosely_equal};
use crate::resolve::traits::{ProviderPort, SearchRequest};

/// Errors opening a catalog file
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// ProviderPort over an in-memory catalog
pub struct FileCatalog {
    provider: String,
    entries: Vec<dto::Entry>,
}

impl FileCatalog {
    /// Read and parse a catalog file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let file: dto::CatalogFile =
            serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            path = %path.display(),
            provider = %file.provider,
            entries = file.entries.len(),
            "catalog loaded"
        );
        let catalog = Self::from_file(file);
        if catalog.is_empty() {
            warn!(path = %path.display(), "catalog has no entries");
        }
        Ok(catalog)
    }

    pub fn from_file(file: dto::CatalogFile) -> Self {
        Self {
            provider: file.provider,
            entries: file.entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ProviderPort for FileCatalog {
    fn name(&self) -> &str {
        &self.provider
    }

    async fn search(&self, request: &SearchRequest<'_>) -> Result<Vec<Candidate>, ProviderError> {
        let found: Vec<Candidate> = self
            .entries
            .iter()
            .filter_map(|e| adapter::to_candidate(e, &self.provider, request.language))
            .filter(|c| matches_request(&c.entity, request))
            .collect();

        debug!(
            provider = %self.provider,
            kind = %request.kind(),
            name = %request.name(),
            language = request.language,
            found = found.len(),
            "catalog search"
        );
        Ok(found)
    }
}

fn matches_request(entry: &MediaEntity, request: &SearchRequest<'_>) -> bool {
    let q = &request.query.entity;

    if entry.kind != q.kind {
        return false;
    }
    if entry.has_languages() && !entry.speaks(request.language) {
        return false;
    }
    if !q.parent_ids.is_empty()
        && !entry.parent_ids.is_empty()
        && !shares_id(&q.parent_ids, &entry.parent_ids)
    {
        return false;
    }
    if q.kind.is_episode_like() {
        if q.season.is_some() && entry.season.is_some() && q.season != entry.season {
            return false;
        }
        if !q.numbers.is_empty() && !entry.numbers.is_empty() && q.numbers != entry.numbers {
            return false;
        }
        // Exact season and episode numbers find the episode whatever it is called
        if q.season.is_some()
            && q.season == entry.season
            && !q.numbers.is_empty()
            && q.numbers == entry.numbers
        {
            return true;
        }
    }

    let name = request.name().trim();
    if name.is_empty() {
        // Lookup by identifier, or by numbers for episodes
        return shares_id(&q.ids, &entry.ids)
            || (q.kind.is_episode_like() && !q.numbers.is_empty());
    }

    entry
        .names()
        .chain(entry.alternate_names.iter().map(String::as_str))
        .any(|n| loosely_equal(n, name) || is_similar_or_equal(n, name))
}

fn shares_id(a: &ExternalIds, b: &ExternalIds) -> bool {
    a.iter().any(|(catalog, id)| b.get(catalog) == Some(id))
}
