//! Imagery catalog access.
//!
//! The catalog speaks OpenSearch over HTTP with basic auth. This module
//! builds point-intersection queries from a [`Candidate`](crate::sampler::Candidate),
//! classifies transport outcomes (rate limited vs. transient), and parses the
//! JSON feed into normalized [`SceneResult`] records.

mod client;
mod feed;
mod types;

pub use client::{CatalogClient, CatalogError};
pub use feed::{parse_feed, FeedParseError};
pub use types::{ProductType, SceneResult};
