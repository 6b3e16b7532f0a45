//! Configuration for reconpipe.
//!
//! Settings are loaded from `./reconpipe.toml` when it exists; every field has
//! a default so the pipeline runs with no setup at all. `--init` writes the
//! default template for editing.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file path relative to the working directory
pub const CONFIG_PATH: &str = "./reconpipe.toml";

/// Default configuration template written by `--init`
pub const DEFAULT_CONFIG: &str = r#"# reconpipe configuration
# Every setting here has a built-in default; delete anything you don't
# want to override.

[tools]
# Binary names or absolute paths. A tool that cannot be located on PATH
# is skipped, never an error.
subfinder = "subfinder"
assetfinder = "assetfinder"
nmap = "nmap"
traceroute = "traceroute"
httpx = "httpx"
# Upper bound on any single external tool invocation, in seconds.
timeout_secs = 300

[http]
user_agent = "reconpipe/0.1"
request_timeout_secs = 30

[ct]
# Certificate-transparency endpoint queried for %.<target>
base_url = "https://crt.sh"

[resolve]
# Concurrent DNS lookups during the resolution fan-out.
jobs = 10
# Per-lookup timeout in seconds.
timeout_secs = 3
"#;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration file already exists at {0}")]
    AlreadyExists(PathBuf),
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolsConfig,
    pub http: HttpConfig,
    pub ct: CtConfig,
    pub resolve: ResolveConfig,
}

/// External tool names/paths and the shared invocation timeout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub subfinder: String,
    pub assetfinder: String,
    pub nmap: String,
    pub traceroute: String,
    pub httpx: String,
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            subfinder: "subfinder".to_string(),
            assetfinder: "assetfinder".to_string(),
            nmap: "nmap".to_string(),
            traceroute: "traceroute".to_string(),
            httpx: "httpx".to_string(),
            timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "reconpipe/0.1".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CtConfig {
    pub base_url: String,
}

impl Default for CtConfig {
    fn default() -> Self {
        Self {
            base_url: "https://crt.sh".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    pub jobs: usize,
    pub timeout_secs: u64,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            jobs: 10,
            timeout_secs: 3,
        }
    }
}

impl AppConfig {
    /// Load configuration from `./reconpipe.toml`, falling back to built-in
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Write the default configuration template to `./reconpipe.toml`.
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = PathBuf::from(CONFIG_PATH);
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path));
        }
        fs::write(&path, DEFAULT_CONFIG)?;
        Ok(path)
    }
}
