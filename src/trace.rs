//! Network path tracing, one invocation per unique address.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

pub struct RouteTracer {
    binary: PathBuf,
    timeout: Duration,
}

/// Artifact filename for one address, with `:` (IPv6) made filesystem-safe.
pub fn trace_filename(address: &str) -> String {
    format!("trace_{}.txt", address.replace(':', "_"))
}

impl RouteTracer {
    pub fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// Trace every address, one artifact file per address under `trace_dir`.
    /// Each invocation is independent; a failure on one address is logged
    /// and the rest still run. Returns the number of traces written.
    pub async fn trace_all(&self, addresses: &[String], trace_dir: &Path) -> Result<usize> {
        std::fs::create_dir_all(trace_dir)
            .with_context(|| format!("Failed to create {}", trace_dir.display()))?;

        let mut written = 0;
        for address in addresses {
            match self.trace_one(address, trace_dir).await {
                Ok(()) => written += 1,
                Err(e) => warn!("Trace failed for {}: {}", address, e),
            }
        }
        Ok(written)
    }

    async fn trace_one(&self, address: &str, trace_dir: &Path) -> Result<()> {
        debug!("Tracing route to {}", address);

        let child = Command::new(&self.binary)
            .arg(address)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.binary.display()))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| anyhow::anyhow!("traceroute timed out after {:?}", self.timeout))?
            .context("Failed to run traceroute")?;

        // Partial hop output is still worth keeping on a non-zero exit.
        let artifact = trace_dir.join(trace_filename(address));
        std::fs::write(&artifact, &output.stdout)
            .with_context(|| format!("Failed to write {}", artifact.display()))?;

        if !output.status.success() {
            return Err(anyhow::anyhow!("traceroute exited with {}", output.status));
        }
        Ok(())
    }
}
