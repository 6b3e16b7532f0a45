//! Fast subdomain enumeration via assetfinder.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::run_to_file;

pub struct AssetfinderEnumerator {
    binary: PathBuf,
    timeout: Duration,
}

impl AssetfinderEnumerator {
    pub fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// Run assetfinder against the target, capturing one hostname per line
    /// into `artifact`. Returns the number of candidates captured.
    pub async fn enumerate(&self, domain: &str, artifact: &Path) -> Result<usize> {
        let count = run_to_file(
            &self.binary,
            &["--subs-only", domain],
            artifact,
            self.timeout,
        )
        .await?;
        debug!("assetfinder found {} candidates for {}", count, domain);
        Ok(count)
    }
}
