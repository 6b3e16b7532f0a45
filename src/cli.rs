use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reconpipe")]
#[command(about = "Best-effort reconnaissance pipeline for a target domain")]
#[command(version)]
pub struct Cli {
    /// Target domain to investigate (e.g. example.com)
    #[arg(required_unless_present = "init")]
    pub target: Option<String>,

    /// Output directory for run artifacts (defaults to recon-<target>-<timestamp>)
    pub output_dir: Option<PathBuf>,

    /// Create a default configuration file at ./reconpipe.toml and exit
    #[arg(long)]
    pub init: bool,

    /// Verbose logging (use -v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Number of concurrent DNS resolutions (default: 10)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Per-tool timeout in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip the certificate-transparency query
    #[arg(long)]
    pub skip_ct: bool,

    /// Skip the port/service scan stage
    #[arg(long)]
    pub skip_scan: bool,

    /// Skip the per-address traceroute stage
    #[arg(long)]
    pub skip_trace: bool,

    /// Skip the HTTP probe stage
    #[arg(long)]
    pub skip_probe: bool,
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        if !self.init {
            match &self.target {
                None => return Err("Target domain is required".to_string()),
                Some(t) if t.trim().is_empty() => {
                    return Err("Target domain cannot be empty".to_string())
                }
                _ => {}
            }
        }

        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err("Jobs must be greater than 0".to_string());
            }
            if jobs > 100 {
                return Err("Jobs cannot exceed 100 to avoid overwhelming DNS servers".to_string());
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Resolve the run directory: explicit argument, or a name derived from
    /// the target and the current local time.
    pub fn run_dir(&self, target: &str) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => {
                let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
                PathBuf::from(format!("recon-{}-{}", target, stamp))
            }
        }
    }
}
