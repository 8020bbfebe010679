//! Media Resolver - federated entity resolution for media metadata.
//!
//! Matches local records (movies, series, episodes, people, albums, tracks)
//! against external catalogs and decides, without a human in the loop,
//! whether a unique match exists.

pub mod cli;
pub mod config;
pub mod error;
pub mod resolve;
#[cfg(test)]
pub mod test_utils;
