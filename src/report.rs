//! Summary accumulation and the final human-readable report.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::pipeline::StageOutcome;

/// Accumulates per-stage results over one run. Created at Init, appended by
/// every stage, rendered and written at Finalize.
#[derive(Debug)]
pub struct SummaryReport {
    target: String,
    started_at: DateTime<Utc>,
    stage_lines: Vec<String>,
}

impl SummaryReport {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            started_at: Utc::now(),
            stage_lines: Vec::new(),
        }
    }

    /// Record one stage's outcome.
    pub fn record(&mut self, stage: &str, outcome: &StageOutcome) {
        let line = match outcome {
            StageOutcome::Completed { count, artifact } => {
                format!("{:<22} {} -> {}", stage, count, artifact)
            }
            StageOutcome::Skipped(reason) => format!("{:<22} skipped: {}", stage, reason),
            StageOutcome::Failed(error) => format!("{:<22} failed: {}", stage, error),
        };
        self.stage_lines.push(line);
    }

    /// Render the full report, including the artifact listing.
    pub fn render(&self, artifacts: &[String]) -> String {
        let finished_at = Utc::now();
        let mut out = String::new();
        out.push_str(&format!("reconpipe summary for {}\n", self.target));
        out.push_str(&format!(
            "Started:  {}\n",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push_str(&format!(
            "Finished: {}\n\n",
            finished_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        out.push_str("Stages:\n");
        for line in &self.stage_lines {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }

        out.push_str("\nArtifacts:\n");
        if artifacts.is_empty() {
            out.push_str("  (none)\n");
        } else {
            for artifact in artifacts {
                out.push_str("  ");
                out.push_str(artifact);
                out.push('\n');
            }
        }
        out
    }

    /// Write the rendered report to the summary artifact and echo it to the
    /// operator.
    pub fn finalize(&self, artifacts: &[String], summary_path: &Path) -> Result<()> {
        let rendered = self.render(artifacts);
        std::fs::write(summary_path, &rendered)
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;
        println!("{}", rendered);
        Ok(())
    }
}
