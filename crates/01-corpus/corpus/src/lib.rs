//! Diagnostic ROM corpus acquisition: manifest, fetch policy, and local cache.

mod config;
mod error;
mod fetch;
mod manifest;
mod status;

pub use config::{CorpusConfig, FetchPolicy, REFERENCE_BASE_URL, REFERENCE_CACHE_ROOT};
pub use error::{FetchError, FetchResult, ManifestError, TransferError};
pub use fetch::{ensure_corpus, CorpusFetcher, FetchSummary, CHUNK_SIZE};
pub use manifest::{ArtifactManifest, REFERENCE_ARTIFACTS};
pub use status::{corpus_status, ArtifactStatus, CacheState};
