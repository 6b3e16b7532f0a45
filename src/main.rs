use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use reconpipe::cli::Cli;
use reconpipe::config::AppConfig;
use reconpipe::pipeline::{Pipeline, PipelineOptions};
use reconpipe::tools::SystemToolLocator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Pre-flight: usage errors are the only fatal, non-zero exits.
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    if cli.init {
        match AppConfig::create_default_config() {
            Ok(path) => {
                println!("Created default configuration file at: {}", path.display());
                return Ok(());
            }
            Err(e) => {
                eprintln!("Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // CLI overrides
    if let Some(jobs) = cli.jobs {
        config.resolve.jobs = jobs;
    }
    if let Some(timeout) = cli.timeout {
        config.tools.timeout_secs = timeout;
    }

    let options = PipelineOptions {
        skip_ct: cli.skip_ct,
        skip_scan: cli.skip_scan,
        skip_trace: cli.skip_trace,
        skip_probe: cli.skip_probe,
    };

    // validate() guarantees the target is present past this point
    let target = cli.target.clone().unwrap_or_default();
    let run_dir = cli.run_dir(&target);

    let pipeline = Pipeline::new(config, Box::new(SystemToolLocator), options);
    pipeline.run(&target, &run_dir).await?;

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "reconpipe=info",
        1 => "reconpipe=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
