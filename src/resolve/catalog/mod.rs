//! JSON file catalog
//!
//! A [`ProviderPort`](super::traits::ProviderPort) backed by a local JSON
//! file. Used by the command line and by end-to-end tests.

pub mod dto;
mod adapter;
mod client;

pub use adapter::to_candidate;
pub use client::{CatalogError, FileCatalog};
