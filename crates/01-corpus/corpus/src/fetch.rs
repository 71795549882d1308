//! Sequential download of manifest artifacts into the cache root.

use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::config::{CorpusConfig, FetchPolicy};
use crate::error::{FetchError, FetchResult};
use crate::manifest::ArtifactManifest;

/// Response bodies are copied to disk in chunks of this size.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Identifiers touched by one `ensure_corpus` call, in manifest order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub fetched: Vec<String>,
    pub skipped: Vec<String>,
}

impl FetchSummary {
    pub fn total(&self) -> usize {
        self.fetched.len() + self.skipped.len()
    }
}

/// Blocking HTTP fetcher bound to one archive base URL.
pub struct CorpusFetcher {
    client: Client,
    base_url: String,
    policy: FetchPolicy,
}

impl CorpusFetcher {
    pub fn new(config: &CorpusConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            policy: config.policy,
        })
    }

    /// Makes sure every manifest entry exists under `cache_root`.
    ///
    /// Artifacts are handled strictly in manifest order. The first failure is
    /// returned as-is: files written before it stay on disk and later entries
    /// are never requested.
    pub fn ensure_corpus(
        &self,
        manifest: &ArtifactManifest,
        cache_root: &Path,
    ) -> FetchResult<FetchSummary> {
        create_cache_root(cache_root)?;

        let mut summary = FetchSummary::default();
        for id in manifest.iter() {
            let dest = ArtifactManifest::destination(cache_root, id);
            if self.policy == FetchPolicy::SkipExisting && dest.exists() {
                info!("skipping {id}, already cached at {}", dest.display());
                summary.skipped.push(id.to_owned());
                continue;
            }

            let url = ArtifactManifest::source_url(&self.base_url, id);
            info!("fetching {url}");
            let bytes = self.download(&url, &dest)?;
            debug!("wrote {bytes} bytes to {}", dest.display());
            summary.fetched.push(id.to_owned());
        }

        Ok(summary)
    }

    fn download(&self, url: &str, dest: &Path) -> FetchResult<u64> {
        // Status is checked before the destination is opened so a rejected
        // request never leaves an empty file behind.
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|err| FetchError::network(url, err))?;

        let mut file = File::create(dest).map_err(|err| FetchError::filesystem(dest, err))?;
        let mut chunk = [0u8; CHUNK_SIZE];
        let mut written = 0u64;
        loop {
            let len = match response.read(&mut chunk) {
                Ok(0) => break,
                Ok(len) => len,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FetchError::network(url, err)),
            };
            file.write_all(&chunk[..len])
                .map_err(|err| FetchError::filesystem(dest, err))?;
            written += len as u64;
        }
        file.flush()
            .map_err(|err| FetchError::filesystem(dest, err))?;

        Ok(written)
    }
}

/// Convenience wrapper: build a fetcher from `config` and populate its cache root.
pub fn ensure_corpus(config: &CorpusConfig) -> FetchResult<FetchSummary> {
    CorpusFetcher::new(config)?.ensure_corpus(&config.manifest, &config.cache_root)
}

fn create_cache_root(path: &Path) -> FetchResult<()> {
    if path.is_dir() {
        return Ok(());
    }

    info!("creating cache directory {}", path.display());
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(path)
        .map_err(|err| FetchError::filesystem(path, err))
}
