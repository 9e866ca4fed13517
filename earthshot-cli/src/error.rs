//! CLI error type.

use earthshot::http::HttpError;
use earthshot::pipeline::AcquireError;
use earthshot::publish::PublishError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
