use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Why a single stylesheet could not be localized. None of these abort the run.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot resolve {href:?}: {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP {status}")]
    Status { status: StatusCode },

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
