//! Enumerator adapters: each wraps one external subdomain-discovery tool
//! behind the invoke-if-available contract.

pub mod assetfinder;
pub mod ct_logs;
pub mod subfinder;

pub use assetfinder::AssetfinderEnumerator;
pub use ct_logs::{CtLogClient, CtParser};
pub use subfinder::SubfinderEnumerator;

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

/// Run an external tool, streaming stdout into `artifact`. Whatever the tool
/// managed to write before failing or timing out is still persisted; the
/// returned count is the number of non-empty output lines. A non-zero exit or
/// timeout is an error for the caller to log, never to abort on.
pub(crate) async fn run_to_file(
    binary: &Path,
    args: &[&str],
    artifact: &Path,
    timeout: Duration,
) -> Result<usize> {
    debug!("Running {:?} {:?}", binary, args);

    let mut child = Command::new(binary)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn {}", binary.display()))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("Failed to capture stdout of {}", binary.display()))?;
    let mut lines = BufReader::new(stdout).lines();

    let mut captured = String::new();
    let read_all = async {
        while let Some(line) = lines.next_line().await? {
            captured.push_str(&line);
            captured.push('\n');
        }
        Ok::<(), std::io::Error>(())
    };

    let read_result = tokio::time::timeout(timeout, read_all).await;
    if read_result.is_err() {
        warn!(
            "{} timed out after {:?}, keeping partial output",
            binary.display(),
            timeout
        );
        child.kill().await.ok();
    }

    std::fs::write(artifact, &captured)
        .with_context(|| format!("Failed to write {}", artifact.display()))?;

    match read_result {
        Err(_) => {
            return Err(anyhow!("{} timed out after {:?}", binary.display(), timeout));
        }
        Ok(read) => {
            read.with_context(|| format!("Failed to read output of {}", binary.display()))?
        }
    }

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("Failed to run {}", binary.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "{} exited with {} ({})",
            binary.display(),
            output.status,
            stderr.trim().lines().next().unwrap_or("no stderr")
        ));
    }

    Ok(count_lines(captured.as_bytes()))
}

pub(crate) fn count_lines(bytes: &[u8]) -> usize {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .count()
}
