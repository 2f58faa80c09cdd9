//! Node.js runtime provisioning
//!
//! Run once at task startup: queries the runtime currently on PATH and, if
//! it falls outside the acceptable range, downloads the target version into
//! a version-keyed cache and prepends it to the process PATH so every later
//! child process resolves the intended runtime.

pub mod fetcher;

use crate::error::{AgentError, AgentResult};
use fetcher::{create_fetcher, RuntimeFetcher};
use semver::Version;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Node version provisioned when the found runtime is out of range
pub const DEFAULT_NODE_TARGET: &str = "5.9.1";

/// Provisions a compatible Node.js runtime for the task
pub struct NodeProvisioner {
    cache_root: PathBuf,
    fetcher: Box<dyn RuntimeFetcher>,
}

impl NodeProvisioner {
    /// Provisioner for the current platform, cache root from
    /// `NODE_VERSION_CACHE` or the platform default.
    pub fn new() -> Self {
        Self {
            cache_root: Self::default_root(),
            fetcher: create_fetcher(),
        }
    }

    /// Provisioner with explicit root and strategy (used by tests)
    pub fn with_root_and_fetcher(cache_root: PathBuf, fetcher: Box<dyn RuntimeFetcher>) -> Self {
        Self { cache_root, fetcher }
    }

    /// Default runtime cache root for the current platform
    pub fn default_root() -> PathBuf {
        if let Ok(dir) = std::env::var("NODE_VERSION_CACHE") {
            return PathBuf::from(dir);
        }
        if cfg!(windows) {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("node-version-cache")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".node-version-cache")
        }
    }

    /// Ensure a runtime within `[min, max]` is first on PATH, provisioning
    /// `target` when the found one is out of bounds or missing entirely.
    pub async fn ensure_in_range(
        &self,
        min: Option<&str>,
        max: Option<&str>,
        target: &str,
        install_npm: bool,
    ) -> AgentResult<()> {
        let min = min.map(parse_bound).transpose()?;
        let max = max.map(parse_bound).transpose()?;

        match Self::query_node_version().await {
            Ok(current) => {
                if out_of_range(&current, min.as_ref(), max.as_ref()) {
                    info!("Node {} out of range, downloading node {}", current, target);
                    self.provision(target, install_npm).await
                } else {
                    info!("Found node {}", current);
                    adopt_system_node();
                    Ok(())
                }
            }
            Err(AgentError::NodeNotFound) => {
                info!("node not found on PATH, downloading node {}", target);
                self.provision(target, install_npm).await
            }
            Err(e) => Err(e),
        }
    }

    /// Adopt whatever `node` currently resolves to, without range checks
    pub fn use_system_node() {
        adopt_system_node();
    }

    /// Version reported by the `node` currently on PATH
    async fn query_node_version() -> AgentResult<Version> {
        let node = which::which("node").map_err(|_| AgentError::NodeNotFound)?;
        let output = Command::new(&node)
            .arg("--version")
            .output()
            .await
            .map_err(|e| AgentError::command_failed("node --version", e))?;
        if !output.status.success() {
            return Err(AgentError::NodeNotFound);
        }
        parse_node_version(&String::from_utf8_lossy(&output.stdout))
    }

    /// Download/extract the target runtime if absent and put it on PATH
    async fn provision(&self, target: &str, install_npm: bool) -> AgentResult<()> {
        if !self.cache_root.exists() {
            tokio::fs::create_dir_all(&self.cache_root).await.map_err(|e| {
                AgentError::io(format!("creating {}", self.cache_root.display()), e)
            })?;
        }

        debug!("Runtime strategy: {}", self.fetcher.fetcher_name());
        self.fetcher
            .ensure(&self.cache_root, target, install_npm)
            .await?;

        for dir in self.fetcher.path_dirs(&self.cache_root, target).iter().rev() {
            prepend_path(dir);
        }
        Ok(())
    }
}

impl Default for NodeProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

/// Prepend the directory holding the system `node` to PATH, if one resolves
fn adopt_system_node() {
    match which::which("node") {
        Ok(node) => {
            if let Some(dir) = node.parent() {
                prepend_path(dir);
            }
        }
        Err(_) => debug!("node not found on PATH; leaving PATH unchanged"),
    }
}

/// True when `current` falls below `min` or above `max`
pub fn out_of_range(current: &Version, min: Option<&Version>, max: Option<&Version>) -> bool {
    if let Some(min) = min {
        if current < min {
            return true;
        }
    }
    if let Some(max) = max {
        if current > max {
            return true;
        }
    }
    false
}

/// Parse `node --version` output, stripping the `v` prefix and exec noise
pub fn parse_node_version(raw: &str) -> AgentResult<Version> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '"' | ',' | '\n' | '\r' | '\u{b}' | '\u{c}'))
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('v');
    Version::parse(cleaned).map_err(|e| AgentError::VersionInvalid {
        package: "node".to_string(),
        version: cleaned.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bound(bound: &str) -> AgentResult<Version> {
    Version::parse(bound.trim_start_matches('v')).map_err(|e| AgentError::VersionInvalid {
        package: "node".to_string(),
        version: bound.to_string(),
        reason: e.to_string(),
    })
}

/// Prepend a directory to the process-wide PATH
pub fn prepend_path(dir: &Path) {
    let current = std::env::var_os("PATH").unwrap_or_default();
    let mut parts = vec![dir.to_path_buf()];
    parts.extend(std::env::split_paths(&current));
    if let Ok(joined) = std::env::join_paths(parts) {
        std::env::set_var("PATH", joined);
        debug!("Prepended to PATH: {}", dir.display());
    }
}
