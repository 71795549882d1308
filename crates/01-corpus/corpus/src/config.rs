use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::manifest::ArtifactManifest;

/// Archive root serving the 8080 diagnostic images.
pub const REFERENCE_BASE_URL: &str = "http://altairclone.com/downloads/cpu_tests/";

/// Cache directory the emulator's own tests read ROMs from.
pub const REFERENCE_CACHE_ROOT: &str = "./res/cpu_tests";

/// What to do when an artifact is already present under the cache root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Leave existing files untouched and issue no request for them.
    #[default]
    SkipExisting,
    /// Download every artifact and truncate-overwrite whatever is on disk.
    Overwrite,
}

/// Everything the fetcher needs to map identifiers to URLs and paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusConfig {
    pub base_url: String,
    pub cache_root: PathBuf,
    pub manifest: ArtifactManifest,
    pub policy: FetchPolicy,
    /// Whole-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            base_url: REFERENCE_BASE_URL.to_owned(),
            cache_root: PathBuf::from(REFERENCE_CACHE_ROOT),
            manifest: ArtifactManifest::reference(),
            policy: FetchPolicy::default(),
            timeout: None,
        }
    }
}

impl CorpusConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache_root(mut self, cache_root: impl Into<PathBuf>) -> Self {
        self.cache_root = cache_root.into();
        self
    }

    pub fn with_manifest(mut self, manifest: ArtifactManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
