//! End-to-end coordinator behavior with controlled tool availability.
//!
//! A StaticToolLocator stands in for PATH lookups so skip logic runs
//! deterministically without any recon binaries installed, and fake shell
//! scripts stand in for the tools that should be "present".

use reconpipe::config::AppConfig;
use reconpipe::pipeline::{Pipeline, PipelineOptions};
use reconpipe::tools::StaticToolLocator;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn options_without_ct() -> PipelineOptions {
    PipelineOptions {
        skip_ct: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_run_with_no_tools_at_all_still_completes() {
    let dir = tempfile::tempdir().unwrap();
    let run_dir = dir.path().join("run");

    let pipeline = Pipeline::new(
        AppConfig::default(),
        Box::new(StaticToolLocator::new()),
        options_without_ct(),
    );
    pipeline.run("example.com", &run_dir).await.unwrap();

    // The run completed: summary and host list exist, optional artifacts do not
    assert!(run_dir.join("summary.txt").exists());
    assert!(run_dir.join("hosts.txt").exists());
    assert!(!run_dir.join("scans").exists());
    assert!(!run_dir.join("traces").exists());
    assert!(!run_dir.join("httpx.txt").exists());

    let summary = std::fs::read_to_string(run_dir.join("summary.txt")).unwrap();
    assert!(summary.contains("skipped: subfinder not found"));
    assert!(summary.contains("skipped: no hosts to resolve"));
}

#[tokio::test]
async fn test_enumerator_output_flows_into_normalized_hosts() {
    let dir = tempfile::tempdir().unwrap();
    let run_dir = dir.path().join("run");

    // Both enumerators report overlapping, messy candidates
    let subfinder = write_script(
        dir.path(),
        "fake-subfinder",
        "printf 'One.Example.invalid.\\ntwo.example.invalid\\n'",
    );
    let assetfinder = write_script(
        dir.path(),
        "fake-assetfinder",
        "printf 'TWO.example.invalid\\n\\n'",
    );

    let locator = StaticToolLocator::new()
        .with_tool("subfinder", subfinder)
        .with_tool("assetfinder", assetfinder);

    let pipeline = Pipeline::new(AppConfig::default(), Box::new(locator), options_without_ct());
    pipeline.run("example.invalid", &run_dir).await.unwrap();

    let hosts = std::fs::read_to_string(run_dir.join("hosts.txt")).unwrap();
    assert_eq!(hosts, "one.example.invalid\ntwo.example.invalid\n");

    // Raw artifact keeps the unmerged view
    let raw = std::fs::read_to_string(run_dir.join("raw_candidates.txt")).unwrap();
    assert!(raw.contains("One.Example.invalid."));
    assert!(raw.contains("TWO.example.invalid"));

    // .invalid never resolves, so the host stays out of the resolved set
    let summary = std::fs::read_to_string(run_dir.join("summary.txt")).unwrap();
    assert!(summary.contains("skipped: no resolved hosts"));
    assert!(!run_dir.join("addresses.txt").exists());
}

#[tokio::test]
async fn test_failing_enumerator_does_not_abort_and_partial_output_counts() {
    let dir = tempfile::tempdir().unwrap();
    let run_dir = dir.path().join("run");

    // Emits one candidate, then fails
    let subfinder = write_script(
        dir.path(),
        "fake-subfinder",
        "printf 'partial.example.invalid\\n'; exit 1",
    );
    let locator = StaticToolLocator::new().with_tool("subfinder", subfinder);

    let pipeline = Pipeline::new(AppConfig::default(), Box::new(locator), options_without_ct());
    pipeline.run("example.invalid", &run_dir).await.unwrap();

    let summary = std::fs::read_to_string(run_dir.join("summary.txt")).unwrap();
    assert!(summary.contains("enumerate:subfinder"));
    assert!(summary.contains("failed:"));

    // The partial output still reached the normalized set
    let hosts = std::fs::read_to_string(run_dir.join("hosts.txt")).unwrap();
    assert_eq!(hosts, "partial.example.invalid\n");
}

#[tokio::test]
async fn test_missing_scanner_does_not_stop_probe() {
    let dir = tempfile::tempdir().unwrap();
    let run_dir = dir.path().join("run");

    let subfinder = write_script(
        dir.path(),
        "fake-subfinder",
        "printf 'web.example.invalid\\n'",
    );
    // Prober just echoes stdin back, ignoring its flags
    let httpx = write_script(dir.path(), "fake-httpx", "cat");

    let locator = StaticToolLocator::new()
        .with_tool("subfinder", subfinder)
        .with_tool("httpx", httpx);

    let pipeline = Pipeline::new(AppConfig::default(), Box::new(locator), options_without_ct());
    pipeline.run("example.invalid", &run_dir).await.unwrap();

    // No scanner: scan skipped, no scan artifacts
    assert!(!run_dir.join("scans").exists());
    let summary = std::fs::read_to_string(run_dir.join("summary.txt")).unwrap();
    assert!(summary.contains("skipped: no addresses to scan") || summary.contains("skipped: nmap not found"));

    // The probe stage still ran against the host list
    let probe = std::fs::read_to_string(run_dir.join("httpx.txt")).unwrap();
    assert!(probe.contains("web.example.invalid"));
}

#[tokio::test]
async fn test_skip_flags_disable_stages() {
    let dir = tempfile::tempdir().unwrap();
    let run_dir = dir.path().join("run");

    let options = PipelineOptions {
        skip_ct: true,
        skip_scan: true,
        skip_trace: true,
        skip_probe: true,
    };
    let pipeline = Pipeline::new(AppConfig::default(), Box::new(StaticToolLocator::new()), options);
    pipeline.run("example.com", &run_dir).await.unwrap();

    let summary = std::fs::read_to_string(run_dir.join("summary.txt")).unwrap();
    assert!(summary.contains("enumerate:crtsh"));
    let disabled_lines = summary
        .lines()
        .filter(|l| l.contains("skipped: disabled"))
        .count();
    // crtsh, scan, trace, and probe were all disabled
    assert_eq!(disabled_lines, 4);
}

#[tokio::test]
async fn test_summary_lists_produced_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let run_dir = dir.path().join("run");

    let subfinder = write_script(
        dir.path(),
        "fake-subfinder",
        "printf 'a.example.invalid\\n'",
    );
    let locator = StaticToolLocator::new().with_tool("subfinder", subfinder);

    let pipeline = Pipeline::new(AppConfig::default(), Box::new(locator), options_without_ct());
    pipeline.run("example.invalid", &run_dir).await.unwrap();

    let summary = std::fs::read_to_string(run_dir.join("summary.txt")).unwrap();
    assert!(summary.contains("Artifacts:"));
    assert!(summary.contains("hosts.txt"));
    assert!(summary.contains("raw_candidates.txt"));
    assert!(summary.contains("subfinder.txt"));
    // The summary never lists itself
    assert!(!summary.contains("summary.txt"));
}
