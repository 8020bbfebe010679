//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`
//! ([`ResolveError`], [`CatalogError`], [`ConfigError`]), while the binary
//! uses `anyhow` at the top level.
//!
//! # Example
//!
//! ```ignore
//! use media_resolver::error::{Result, ResultExt};
//!
//! async fn open(path: &Path) -> Result<FileCatalog> {
//!     let catalog = FileCatalog::open(path).await?; // Catalog errors auto-convert
//!     Ok(catalog)
//! }
//! ```

use crate::config::ConfigError;
use crate::resolve::{CatalogError, ResolveError};

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Resolution aborted (provider failure, invalid query, cancellation)
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Catalog file could not be opened
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command-line input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, ResolveError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Resolve(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, CatalogError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Catalog(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::EntityKind;

    #[test]
    fn test_error_display() {
        let err: Error = ResolveError::invalid(EntityKind::Track, "no artist or album artist").into();
        let msg = err.to_string();
        assert!(msg.contains("track"));
        assert!(msg.contains("no artist"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::invalid_input("unknown kind 'podcast'").context("while parsing arguments");
        let msg = err.to_string();
        assert!(msg.contains("while parsing arguments"));
        assert!(msg.contains("podcast"));
    }

    #[test]
    fn test_config_and_json_errors_convert() {
        let err: Error = ConfigError::NoConfigDir.into();
        assert!(matches!(err, Error::Config(_)));

        let err: Error = serde_json::from_str::<u32>("three").unwrap_err().into();
        assert!(err.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_result_ext() {
        let result: std::result::Result<(), ResolveError> = Err(ResolveError::Cancelled);
        let with_ctx = result.with_context("resolving Heat");
        assert!(with_ctx.unwrap_err().to_string().contains("resolving Heat"));
    }
}
