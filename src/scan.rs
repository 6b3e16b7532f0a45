//! Port/service scanning via nmap, one batched invocation over the whole
//! unique-address set.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

pub struct NmapScanner {
    binary: PathBuf,
    timeout: Duration,
}

impl NmapScanner {
    pub fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// Scan all addresses in a single call with service/version detection
    /// and default scripts, writing multi-format output (`-oA`) under
    /// `scan_dir`. A non-zero exit is an error for the caller to record,
    /// never to abort on.
    pub async fn scan(&self, addresses: &[String], scan_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(scan_dir)
            .with_context(|| format!("Failed to create {}", scan_dir.display()))?;

        let prefix = scan_dir.join("nmap");
        let mut args: Vec<String> = vec![
            "-sV".to_string(),
            "-sC".to_string(),
            "-oA".to_string(),
            prefix.to_string_lossy().to_string(),
        ];
        args.extend(addresses.iter().cloned());

        info!("Scanning {} addresses with nmap", addresses.len());
        debug!("nmap args: {:?}", args);

        let child = Command::new(&self.binary)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.binary.display()))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| anyhow!("nmap timed out after {:?}", self.timeout))?
            .context("Failed to run nmap")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "nmap exited with {} ({})",
                output.status,
                stderr.trim().lines().next().unwrap_or("no stderr")
            ));
        }

        Ok(())
    }
}
