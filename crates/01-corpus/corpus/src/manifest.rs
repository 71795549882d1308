//! Ordered list of artifact identifiers making up the diagnostic corpus.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// Artifacts published by the reference CPU test archive, in fetch order.
pub const REFERENCE_ARTIFACTS: &[&str] = &[
    "+README.TXT",
    "8080EXER.COM",
    "8080EXER.MAC",
    "8080EXER.PNG",
    "8080EXER.PRN",
    "8080EXM.COM",
    "8080EXM.MAC",
    "8080EXM.PRN",
    "8080PRE.COM",
    "8080PRE.MAC",
    "8080PRE.PRN",
    "8080_8085 CPU Exerciser.pdf",
    "CPUTEST.COM",
    "TST8080.ASM",
    "TST8080.COM",
    "TST8080.PRN",
];

/// Validated, immutable manifest of artifact identifiers.
///
/// Identifiers are flat file names: they double as the suffix appended to the
/// archive base URL and as the file name under the cache root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ArtifactManifest {
    entries: Vec<String>,
}

impl ArtifactManifest {
    pub fn new<I, S>(entries: I) -> Result<Self, ManifestError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        if entries.is_empty() {
            return Err(ManifestError::Empty);
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for id in &entries {
            validate_identifier(id)?;
            if !seen.insert(id.as_str()) {
                return Err(ManifestError::Duplicate(id.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// The 16-entry manifest of the reference deployment.
    pub fn reference() -> Self {
        Self {
            entries: REFERENCE_ARTIFACTS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Remote location of `id`: the base URL with the identifier appended.
    ///
    /// Only `%`, `#` and `?` are escaped; left raw they would start an escape,
    /// a fragment, or a query and the request would name a different file.
    /// Everything else, spaces included, is passed through verbatim.
    pub fn source_url(base_url: &str, id: &str) -> String {
        let mut url = String::with_capacity(base_url.len() + id.len());
        url.push_str(base_url);
        for c in id.chars() {
            match c {
                '%' => url.push_str("%25"),
                '#' => url.push_str("%23"),
                '?' => url.push_str("%3F"),
                _ => url.push(c),
            }
        }
        url
    }

    /// Local destination of `id` under `cache_root`.
    pub fn destination(cache_root: &Path, id: &str) -> PathBuf {
        cache_root.join(id)
    }
}

impl Default for ArtifactManifest {
    fn default() -> Self {
        Self::reference()
    }
}

impl TryFrom<Vec<String>> for ArtifactManifest {
    type Error = ManifestError;

    fn try_from(entries: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<ArtifactManifest> for Vec<String> {
    fn from(manifest: ArtifactManifest) -> Self {
        manifest.entries
    }
}

fn validate_identifier(id: &str) -> Result<(), ManifestError> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains('/')
        || id.contains('\\')
        || id.contains('\0');
    if invalid {
        return Err(ManifestError::InvalidIdentifier(id.to_owned()));
    }
    Ok(())
}
