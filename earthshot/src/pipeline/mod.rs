//! The outer acquisition loop.
//!
//! One cycle runs sampler → catalog → selector → preview gate → fetch →
//! composite. Every failure short of [`AcquireError::Fatal`] abandons the
//! current candidate and restarts from the sampler with no state carried
//! over; the same scene is never retried, which keeps a deterministic
//! failure from looping forever.

mod backoff;
mod error;
mod runner;

pub use backoff::{Backoff, RecordingBackoff, TokioBackoff};
pub use error::AcquireError;
pub use runner::{Acquisition, AcquisitionPipeline};
