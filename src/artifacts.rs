//! Stable artifact layout inside one run directory.
//!
//! Names are fixed for the lifetime of a run so the final summary can
//! enumerate everything a stage produced.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RunPaths {
    root: PathBuf,
}

impl RunPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the run directory (idempotent).
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create run directory {}", self.root.display()))
    }

    /// Per-enumerator raw output
    pub fn enumerator_output(&self, tool: &str) -> PathBuf {
        self.root.join(format!("{}.txt", tool))
    }

    /// Concatenated raw candidates from all enumerators
    pub fn raw_candidates(&self) -> PathBuf {
        self.root.join("raw_candidates.txt")
    }

    /// Normalized, deduplicated host list
    pub fn hosts(&self) -> PathBuf {
        self.root.join("hosts.txt")
    }

    /// `host,ip ip ...` records for hosts that resolved
    pub fn resolved(&self) -> PathBuf {
        self.root.join("resolved.csv")
    }

    /// Deduplicated, sorted unique addresses
    pub fn addresses(&self) -> PathBuf {
        self.root.join("addresses.txt")
    }

    /// Multi-format nmap output directory
    pub fn scan_dir(&self) -> PathBuf {
        self.root.join("scans")
    }

    /// Per-address traceroute directory
    pub fn trace_dir(&self) -> PathBuf {
        self.root.join("traces")
    }

    /// HTTP probe report
    pub fn probe(&self) -> PathBuf {
        self.root.join("httpx.txt")
    }

    /// Final human-readable summary
    pub fn summary(&self) -> PathBuf {
        self.root.join("summary.txt")
    }

    /// Enumerate every artifact present under the run directory, as sorted
    /// paths relative to the root. The summary file itself is excluded so
    /// the listing inside it stays stable.
    pub fn list_artifacts(&self) -> Vec<String> {
        let mut found = Vec::new();
        collect_relative(&self.root, &self.root, &mut found);
        found.retain(|p| p != "summary.txt");
        found.sort();
        found
    }
}

fn collect_relative(root: &Path, dir: &Path, found: &mut Vec<String>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_relative(root, &path, found);
        } else if let Ok(rel) = path.strip_prefix(root) {
            found.push(rel.to_string_lossy().to_string());
        }
    }
}
