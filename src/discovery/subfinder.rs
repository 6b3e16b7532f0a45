//! Passive subdomain enumeration via Project Discovery's subfinder.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::run_to_file;

pub struct SubfinderEnumerator {
    binary: PathBuf,
    timeout: Duration,
}

impl SubfinderEnumerator {
    pub fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// Run subfinder against the target, capturing one hostname per line
    /// into `artifact`. Returns the number of candidates captured.
    pub async fn enumerate(&self, domain: &str, artifact: &Path) -> Result<usize> {
        let count = run_to_file(
            &self.binary,
            &["-d", domain, "-all", "-silent"],
            artifact,
            self.timeout,
        )
        .await?;
        debug!("subfinder found {} candidates for {}", count, domain);
        Ok(count)
    }
}
