//! Pipeline coordinator.
//!
//! Sequences the stages Init → Enumerate → Normalize → Resolve →
//! ExtractAddresses → Scan → Trace → Probe → Finalize. Every transition is
//! unconditional: a missing tool, a failing tool, or an empty input skips
//! the stage's work and the run keeps going. The only fatal error after
//! pre-flight is being unable to create the run directory itself.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::artifacts::RunPaths;
use crate::config::AppConfig;
use crate::discovery::{AssetfinderEnumerator, CtLogClient, SubfinderEnumerator};
use crate::normalize::normalize_candidates;
use crate::probe::HttpProber;
use crate::report::SummaryReport;
use crate::resolve::{extract_unique_addresses, HostResolver, ResolvedHost};
use crate::scan::NmapScanner;
use crate::tools::ToolLocator;
use crate::trace::RouteTracer;

/// Tri-state result of one pipeline stage, inspected only for logging and
/// the summary — never to abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Completed { count: usize, artifact: String },
    Skipped(String),
    Failed(String),
}

impl StageOutcome {
    fn completed(count: usize, artifact: &Path) -> Self {
        StageOutcome::Completed {
            count,
            artifact: artifact
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| artifact.display().to_string()),
        }
    }
}

/// Per-run stage toggles from the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub skip_ct: bool,
    pub skip_scan: bool,
    pub skip_trace: bool,
    pub skip_probe: bool,
}

pub struct Pipeline {
    config: AppConfig,
    locator: Box<dyn ToolLocator>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(config: AppConfig, locator: Box<dyn ToolLocator>, options: PipelineOptions) -> Self {
        Self {
            config,
            locator,
            options,
        }
    }

    fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.config.tools.timeout_secs)
    }

    /// Run the full pipeline for `target`, producing artifacts under
    /// `run_dir`. Always returns `Ok` once the run directory exists; partial
    /// completion (missing tools, failed stages) is reflected in the summary
    /// only.
    pub async fn run(&self, target: &str, run_dir: &Path) -> Result<()> {
        let paths = RunPaths::new(run_dir);
        paths.ensure_root()?;
        info!("Recon run for {} -> {}", target, run_dir.display());

        let mut report = SummaryReport::new(target);

        // Enumerate: each adapter appends to the shared raw accumulator.
        let mut raw = String::new();
        self.enumerate(target, &paths, &mut raw, &mut report).await;

        std::fs::write(paths.raw_candidates(), &raw)
            .with_context(|| format!("Failed to write {}", paths.raw_candidates().display()))
            .unwrap_or_else(|e| warn!("{}", e));

        // Normalize: the canonical dedupe point.
        let hosts = normalize_candidates(&raw);
        let outcome = write_lines(&paths.hosts(), &hosts)
            .map(|_| StageOutcome::completed(hosts.len(), &paths.hosts()))
            .unwrap_or_else(|e| StageOutcome::Failed(e.to_string()));
        info!("Normalized {} unique hosts", hosts.len());
        report.record("normalize", &outcome);

        // Resolve.
        let resolved = match self.resolve(&hosts, &paths, &mut report).await {
            Some(resolved) => resolved,
            None => Vec::new(),
        };

        // Extract addresses.
        let addresses = extract_unique_addresses(&resolved);
        let outcome = if resolved.is_empty() {
            StageOutcome::Skipped("no resolved hosts".to_string())
        } else {
            write_lines(&paths.addresses(), &addresses)
                .map(|_| StageOutcome::completed(addresses.len(), &paths.addresses()))
                .unwrap_or_else(|e| StageOutcome::Failed(e.to_string()))
        };
        report.record("addresses", &outcome);

        // Scan, trace, probe: all optional, all independent.
        let outcome = self.scan(&addresses, &paths).await;
        report.record("scan", &outcome);

        let outcome = self.trace(&addresses, &paths).await;
        report.record("trace", &outcome);

        let outcome = self.probe(&hosts, &paths).await;
        report.record("probe", &outcome);

        // Finalize.
        let artifacts = paths.list_artifacts();
        report.finalize(&artifacts, &paths.summary())?;
        Ok(())
    }

    /// Run every enumerator in order. Each adapter's artifact is appended to
    /// the raw accumulator when non-empty, whether or not the tool exited
    /// cleanly — partial output still counts.
    async fn enumerate(
        &self,
        target: &str,
        paths: &RunPaths,
        raw: &mut String,
        report: &mut SummaryReport,
    ) {
        let timeout = self.tool_timeout();

        // Passive enumerator
        let artifact = paths.enumerator_output("subfinder");
        let outcome = match self.locator.locate(&self.config.tools.subfinder) {
            None => skip_tool("subfinder"),
            Some(binary) => SubfinderEnumerator::new(binary, timeout)
                .enumerate(target, &artifact)
                .await
                .map(|count| StageOutcome::completed(count, &artifact))
                .unwrap_or_else(|e| StageOutcome::Failed(e.to_string())),
        };
        log_stage("enumerate:subfinder", &outcome);
        report.record("enumerate:subfinder", &outcome);
        append_artifact(&artifact, raw);

        // Fast enumerator
        let artifact = paths.enumerator_output("assetfinder");
        let outcome = match self.locator.locate(&self.config.tools.assetfinder) {
            None => skip_tool("assetfinder"),
            Some(binary) => AssetfinderEnumerator::new(binary, timeout)
                .enumerate(target, &artifact)
                .await
                .map(|count| StageOutcome::completed(count, &artifact))
                .unwrap_or_else(|e| StageOutcome::Failed(e.to_string())),
        };
        log_stage("enumerate:assetfinder", &outcome);
        report.record("enumerate:assetfinder", &outcome);
        append_artifact(&artifact, raw);

        // Certificate transparency (no binary involved, an HTTPS query)
        let artifact = paths.enumerator_output("crtsh");
        let outcome = if self.options.skip_ct {
            StageOutcome::Skipped("disabled".to_string())
        } else {
            let client = CtLogClient::new(&self.config.http, &self.config.ct);
            match client.fetch(target).await {
                Ok(names) => write_lines(&artifact, &names)
                    .map(|_| StageOutcome::completed(names.len(), &artifact))
                    .unwrap_or_else(|e| StageOutcome::Failed(e.to_string())),
                Err(e) => StageOutcome::Failed(e.to_string()),
            }
        };
        log_stage("enumerate:crtsh", &outcome);
        report.record("enumerate:crtsh", &outcome);
        append_artifact(&artifact, raw);
    }

    async fn resolve(
        &self,
        hosts: &[String],
        paths: &RunPaths,
        report: &mut SummaryReport,
    ) -> Option<Vec<ResolvedHost>> {
        let outcome;
        let resolved = if hosts.is_empty() {
            outcome = StageOutcome::Skipped("no hosts to resolve".to_string());
            None
        } else {
            match HostResolver::new(&self.config.resolve) {
                Err(e) => {
                    outcome = StageOutcome::Failed(e.to_string());
                    None
                }
                Ok(resolver) => {
                    let resolved = resolver.resolve_all(hosts).await;
                    outcome = write_resolved(&paths.resolved(), &resolved)
                        .map(|_| StageOutcome::completed(resolved.len(), &paths.resolved()))
                        .unwrap_or_else(|e| StageOutcome::Failed(e.to_string()));
                    Some(resolved)
                }
            }
        };
        log_stage("resolve", &outcome);
        report.record("resolve", &outcome);
        resolved
    }

    async fn scan(&self, addresses: &[String], paths: &RunPaths) -> StageOutcome {
        let outcome = if self.options.skip_scan {
            StageOutcome::Skipped("disabled".to_string())
        } else if addresses.is_empty() {
            StageOutcome::Skipped("no addresses to scan".to_string())
        } else {
            match self.locator.locate(&self.config.tools.nmap) {
                None => skip_tool("nmap"),
                Some(binary) => NmapScanner::new(binary, self.tool_timeout())
                    .scan(addresses, &paths.scan_dir())
                    .await
                    .map(|_| StageOutcome::completed(addresses.len(), &paths.scan_dir()))
                    .unwrap_or_else(|e| StageOutcome::Failed(e.to_string())),
            }
        };
        log_stage("scan", &outcome);
        outcome
    }

    async fn trace(&self, addresses: &[String], paths: &RunPaths) -> StageOutcome {
        let outcome = if self.options.skip_trace {
            StageOutcome::Skipped("disabled".to_string())
        } else if addresses.is_empty() {
            StageOutcome::Skipped("no addresses to trace".to_string())
        } else {
            match self.locator.locate(&self.config.tools.traceroute) {
                None => skip_tool("traceroute"),
                Some(binary) => RouteTracer::new(binary, self.tool_timeout())
                    .trace_all(addresses, &paths.trace_dir())
                    .await
                    .map(|count| StageOutcome::completed(count, &paths.trace_dir()))
                    .unwrap_or_else(|e| StageOutcome::Failed(e.to_string())),
            }
        };
        log_stage("trace", &outcome);
        outcome
    }

    async fn probe(&self, hosts: &[String], paths: &RunPaths) -> StageOutcome {
        let outcome = if self.options.skip_probe {
            StageOutcome::Skipped("disabled".to_string())
        } else if hosts.is_empty() {
            StageOutcome::Skipped("no hosts to probe".to_string())
        } else {
            match self.locator.locate(&self.config.tools.httpx) {
                None => skip_tool("httpx"),
                Some(binary) => HttpProber::new(binary, self.tool_timeout())
                    .probe(hosts, &paths.probe())
                    .await
                    .map(|count| StageOutcome::completed(count, &paths.probe()))
                    .unwrap_or_else(|e| StageOutcome::Failed(e.to_string())),
            }
        };
        log_stage("probe", &outcome);
        outcome
    }
}

fn skip_tool(name: &str) -> StageOutcome {
    StageOutcome::Skipped(format!("{} not found", name))
}

fn log_stage(stage: &str, outcome: &StageOutcome) {
    match outcome {
        StageOutcome::Completed { count, artifact } => {
            info!("[{}] {} -> {}", stage, count, artifact)
        }
        StageOutcome::Skipped(reason) => info!("[{}] skipped: {}", stage, reason),
        StageOutcome::Failed(error) => warn!("[{}] failed: {}", stage, error),
    }
}

/// Append an enumerator artifact to the raw accumulator when it exists and
/// is non-empty.
fn append_artifact(artifact: &Path, raw: &mut String) {
    match std::fs::read_to_string(artifact) {
        Ok(content) if !content.trim().is_empty() => {
            raw.push_str(&content);
            if !content.ends_with('\n') {
                raw.push('\n');
            }
        }
        _ => {}
    }
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn write_resolved(path: &Path, resolved: &[ResolvedHost]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for record in resolved {
        let (host, addresses) = record.to_record();
        writer
            .write_record([host.as_str(), addresses.as_str()])
            .context("Failed to write resolved record")?;
    }
    writer.flush().context("Failed to flush resolved records")?;
    Ok(())
}
