//! earthshot - random satellite scene acquisition and compositing
//!
//! This library draws a random point on Earth and a random time window,
//! queries an imagery catalog for a matching scene, gates it on a cheap
//! low-resolution preview, downloads the full-resolution spectral bands,
//! and composites them into a colour-balanced 8-bit image ready for
//! publishing.
//!
//! # High-Level API
//!
//! ```ignore
//! use earthshot::config::EarthshotConfig;
//! use earthshot::http::{Credentials, ReqwestClient};
//! use earthshot::pipeline::{AcquisitionPipeline, TokioBackoff};
//!
//! let config = EarthshotConfig::new()
//!     .with_credentials(Credentials::new(user, password));
//! let http = ReqwestClient::new()?;
//! let pipeline = AcquisitionPipeline::new(http, config, TokioBackoff, work_dir);
//!
//! let acquisition = pipeline.run_until_success(&mut rand::thread_rng()).await?;
//! ```

pub mod bands;
pub mod caption;
pub mod catalog;
pub mod composite;
pub mod config;
pub mod history;
pub mod http;
pub mod logging;
pub mod pipeline;
pub mod preview;
pub mod publish;
pub mod sampler;
pub mod select;

/// Version of the earthshot library and CLI.
///
/// Synchronized across the workspace; injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
