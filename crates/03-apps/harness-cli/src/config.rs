//! TOML configuration file, layered over the reference defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use corpus::{
    ArtifactManifest, CorpusConfig, FetchPolicy, REFERENCE_BASE_URL, REFERENCE_CACHE_ROOT,
};
use driver::{CommandInvocation, HarnessPlans};
use serde::Deserialize;

/// Every key is optional; missing keys keep the reference value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub base_url: String,
    pub cache_root: PathBuf,
    pub policy: FetchPolicy,
    pub timeout_secs: Option<u64>,
    pub artifacts: ArtifactManifest,
    pub single: Vec<CommandInvocation>,
    pub suite: Vec<CommandInvocation>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let plans = HarnessPlans::default();
        Self {
            base_url: REFERENCE_BASE_URL.to_owned(),
            cache_root: PathBuf::from(REFERENCE_CACHE_ROOT),
            policy: FetchPolicy::default(),
            timeout_secs: None,
            artifacts: ArtifactManifest::reference(),
            single: plans.single,
            suite: plans.suite,
        }
    }
}

impl HarnessConfig {
    /// Reads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {path:?}"))?;
                Self::parse(&text).with_context(|| format!("parsing config {path:?}"))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Applies command-line overrides, which take precedence over the file.
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        cache_root: Option<PathBuf>,
    ) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if let Some(cache_root) = cache_root {
            self.cache_root = cache_root;
        }
        self
    }

    pub fn corpus(&self) -> CorpusConfig {
        CorpusConfig::default()
            .with_base_url(self.base_url.clone())
            .with_cache_root(self.cache_root.clone())
            .with_manifest(self.artifacts.clone())
            .with_policy(self.policy)
            .with_timeout(self.timeout_secs.map(Duration::from_secs))
    }

    pub fn plans(&self) -> HarnessPlans {
        HarnessPlans {
            single: self.single.clone(),
            suite: self.suite.clone(),
        }
    }
}
