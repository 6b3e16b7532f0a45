//! Capability lookup for external tools.
//!
//! Every pipeline stage that shells out asks a [`ToolLocator`] whether its
//! tool exists before doing anything. Absence is a valid answer, not an
//! error; the stage logs a skip and the run continues.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub trait ToolLocator: Send + Sync {
    /// Resolve a tool name (or configured absolute path) to an executable.
    /// Returns `None` when the tool is not present in the environment.
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Production locator: honors absolute paths from the config, otherwise
/// searches PATH.
pub struct SystemToolLocator;

impl ToolLocator for SystemToolLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }
        which::which(name).ok()
    }
}

/// Test locator with a fixed set of "installed" tools, so skip logic can be
/// exercised without any real binaries.
#[derive(Default)]
pub struct StaticToolLocator {
    tools: HashMap<String, PathBuf>,
}

impl StaticToolLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.tools.insert(name.to_string(), path.into());
        self
    }
}

impl ToolLocator for StaticToolLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.tools.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_locator_reports_registered_tools() {
        let locator = StaticToolLocator::new().with_tool("nmap", "/usr/bin/nmap");
        assert_eq!(locator.locate("nmap"), Some(PathBuf::from("/usr/bin/nmap")));
        assert_eq!(locator.locate("traceroute"), None);
    }

    #[test]
    fn test_system_locator_absolute_path_must_exist() {
        let locator = SystemToolLocator;
        assert_eq!(locator.locate("/nonexistent/definitely-not-a-tool"), None);
    }

    #[test]
    fn test_system_locator_finds_common_binary() {
        // `sh` is present on any POSIX system the tests run on
        let locator = SystemToolLocator;
        assert!(locator.locate("sh").is_some());
    }
}
