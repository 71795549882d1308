use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to download {url}")]
    Network {
        url: String,
        #[source]
        source: TransferError,
    },

    #[error("filesystem error at {path:?}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to construct http client")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FetchError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn network(url: impl Into<String>, source: impl Into<TransferError>) -> Self {
        FetchError::Network {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// Why a single artifact transfer failed.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Connection, timeout, or non-success status.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The response body stream broke mid-transfer.
    #[error("response stream interrupted: {0}")]
    Stream(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("artifact manifest is empty")]
    Empty,

    #[error("duplicate artifact identifier {0:?}")]
    Duplicate(String),

    #[error("artifact identifier {0:?} is not a plain file name")]
    InvalidIdentifier(String),
}
