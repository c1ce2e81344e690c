//! Filesystem infrastructure — implements `ArtifactReader`.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::ArtifactReader;

/// Certificate bundles and keys are small; anything larger is a wrong path.
const MAX_ARTIFACT_BYTES: u64 = 1024 * 1024;

/// Production filesystem implementation of `ArtifactReader`.
pub struct LocalFs;

impl ArtifactReader for LocalFs {
    fn read_artifact(&self, path: &Path) -> Result<Vec<u8>> {
        let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut data = Vec::new();
        file.take(MAX_ARTIFACT_BYTES + 1)
            .read_to_end(&mut data)
            .with_context(|| format!("reading {}", path.display()))?;
        anyhow::ensure!(!data.is_empty(), "{} is empty", path.display());
        anyhow::ensure!(
            data.len() as u64 <= MAX_ARTIFACT_BYTES,
            "{} is larger than {MAX_ARTIFACT_BYTES} bytes",
            path.display()
        );
        Ok(data)
    }
}
