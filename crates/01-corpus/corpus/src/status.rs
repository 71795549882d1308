//! Offline view of which manifest artifacts are already cached.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{FetchError, FetchResult};
use crate::manifest::ArtifactManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Cached { bytes: u64 },
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub id: String,
    pub state: CacheState,
}

impl ArtifactStatus {
    pub fn is_cached(&self) -> bool {
        matches!(self.state, CacheState::Cached { .. })
    }
}

/// Reports the cache state of every manifest entry, in manifest order.
///
/// Only existence is checked; file contents are never inspected.
pub fn corpus_status(
    manifest: &ArtifactManifest,
    cache_root: &Path,
) -> FetchResult<Vec<ArtifactStatus>> {
    manifest
        .iter()
        .map(|id| {
            let path = ArtifactManifest::destination(cache_root, id);
            let state = match fs::metadata(&path) {
                Ok(meta) => CacheState::Cached { bytes: meta.len() },
                Err(err) if err.kind() == ErrorKind::NotFound => CacheState::Missing,
                Err(err) => return Err(FetchError::filesystem(path, err)),
            };
            Ok(ArtifactStatus {
                id: id.to_owned(),
                state,
            })
        })
        .collect()
}
