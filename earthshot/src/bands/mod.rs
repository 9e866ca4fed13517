//! Full-resolution band retrieval.
//!
//! Covers everything between an accepted scene and compositing: choosing
//! which three spectral bands to use, downloading and extracting the product
//! archive, detecting the granule directory layout, and resolving the band
//! file paths.

mod bandset;
mod fetch;
mod layout;
mod limiter;

pub use bandset::{Band, BandSet};
pub use fetch::{download_archive, download_files, extract_archive, FetchError, TransferJob};
pub use layout::{locate_bands, BandLayout, LayoutError};
pub use limiter::TransferLimiter;
