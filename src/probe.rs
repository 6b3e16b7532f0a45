//! HTTP probing via httpx, one invocation fed the full host list on stdin.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::discovery::count_lines;

pub struct HttpProber {
    binary: PathBuf,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// Probe every normalized host for a live HTTP(S) service, capturing
    /// the prober's report into `artifact`. Returns the number of live
    /// services reported.
    pub async fn probe(&self, hosts: &[String], artifact: &Path) -> Result<usize> {
        info!("Probing {} hosts with httpx", hosts.len());

        let mut child = Command::new(&self.binary)
            .args(["-silent", "-status-code", "-title"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.binary.display()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("Failed to open httpx stdin"))?;
        let input = hosts.join("\n");

        let run = async {
            stdin.write_all(input.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            drop(stdin);
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| anyhow!("httpx timed out after {:?}", self.timeout))?
            .context("Failed to run httpx")?;

        std::fs::write(artifact, &output.stdout)
            .with_context(|| format!("Failed to write {}", artifact.display()))?;

        let count = count_lines(&output.stdout);
        debug!("httpx reported {} live services", count);

        if !output.status.success() {
            return Err(anyhow!("httpx exited with {}", output.status));
        }
        Ok(count)
    }
}
