//! Platform-specific Node.js runtime acquisition
//!
//! Windows gets a bare `node.exe` (plus an optionally pinned npm) fetched
//! with curl; Unix-likes get a release tarball extracted with gunzip/tar.
//! Both land in a version-keyed directory under the runtime cache root.

use crate::error::{AgentError, AgentResult};
use async_trait::async_trait;
use semver::Version;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// npm major pinned on Windows runtimes below the Node 5 cutoff
const NPM_PIN_LEGACY: &str = "^2.11.3";
/// npm major pinned at/above the cutoff
const NPM_PIN_MODERN: &str = "^3.5.2";
const NPM_PIN_CUTOFF: &str = "5.0.0";

/// Detected target platform for runtime acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
}

impl Platform {
    /// Detect the current platform. Anything that is not Windows or macOS
    /// takes the Linux acquisition path.
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOS,
            _ => Platform::Linux,
        }
    }
}

/// Abstract runtime acquisition strategy
#[async_trait]
pub trait RuntimeFetcher: Send + Sync {
    /// Directories to prepend to PATH for this runtime version, in the
    /// order they should appear on PATH.
    fn path_dirs(&self, cache_root: &Path, version: &str) -> Vec<PathBuf>;

    /// Whether the version-keyed cache entry already exists
    fn is_provisioned(&self, cache_root: &Path, version: &str) -> bool;

    /// Download (if absent) and finish setting up the runtime
    async fn ensure(&self, cache_root: &Path, version: &str, install_npm: bool)
        -> AgentResult<()>;

    /// Human-readable strategy name for logs
    fn fetcher_name(&self) -> &'static str;
}

/// Create the acquisition strategy for the current platform
pub fn create_fetcher() -> Box<dyn RuntimeFetcher> {
    match Platform::detect() {
        Platform::Windows => Box::new(WindowsFetcher),
        Platform::MacOS => Box::new(UnixFetcher::darwin()),
        Platform::Linux => Box::new(UnixFetcher::linux()),
    }
}

/// npm version range compatible with the given Node target on Windows
pub fn npm_pin_for(node_version: &str) -> AgentResult<&'static str> {
    let target = parse_version(node_version)?;
    let cutoff = Version::parse(NPM_PIN_CUTOFF).expect("valid cutoff");
    Ok(if target < cutoff {
        NPM_PIN_LEGACY
    } else {
        NPM_PIN_MODERN
    })
}

fn parse_version(version: &str) -> AgentResult<Version> {
    Version::parse(version).map_err(|e| AgentError::VersionInvalid {
        package: "node".to_string(),
        version: version.to_string(),
        reason: e.to_string(),
    })
}

/// Locate curl on PATH; its absence is fatal, there is no fallback
/// download path.
fn require_curl() -> AgentResult<PathBuf> {
    which::which("curl").map_err(|_| AgentError::CurlNotFound)
}

/// Run a download/extract sub-process with inherited stdio; a non-zero
/// exit is a provisioning failure.
async fn run_step(mut command: Command, version: &str, what: &str) -> AgentResult<()> {
    let status = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| AgentError::command_failed(what.to_string(), e))?;

    if status.success() {
        Ok(())
    } else {
        Err(AgentError::RuntimeProvision {
            version: version.to_string(),
            reason: format!("{what} exited with code {}", status.code().unwrap_or(-1)),
        })
    }
}

/// Windows strategy: single `node.exe` download, optional pinned npm
pub struct WindowsFetcher;

impl WindowsFetcher {
    /// `<root>/node-win-x86-<v>`
    pub fn runtime_dir(cache_root: &Path, version: &str) -> PathBuf {
        cache_root.join(format!("node-win-x86-{version}"))
    }
}

#[async_trait]
impl RuntimeFetcher for WindowsFetcher {
    fn path_dirs(&self, cache_root: &Path, version: &str) -> Vec<PathBuf> {
        let dir = Self::runtime_dir(cache_root, version);
        // npm shims first if npm happens to be installed - does no harm if not
        vec![dir.join("node_modules").join(".bin"), dir]
    }

    fn is_provisioned(&self, cache_root: &Path, version: &str) -> bool {
        Self::runtime_dir(cache_root, version).exists()
    }

    async fn ensure(
        &self,
        cache_root: &Path,
        version: &str,
        install_npm: bool,
    ) -> AgentResult<()> {
        let dir = Self::runtime_dir(cache_root, version);

        if !self.is_provisioned(cache_root, version) {
            let curl = require_curl()?;
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| AgentError::io(format!("creating {}", dir.display()), e))?;

            let url = format!("https://nodejs.org/dist/v{version}/win-x86/node.exe");
            info!("Downloading {}", url);
            let mut command = Command::new(curl);
            command
                .arg("-o")
                .arg(dir.join("node.exe"))
                .arg(&url);
            run_step(command, version, "curl").await?;
        } else {
            debug!("Node {} already cached at {}", version, dir.display());
        }

        // Applies even to an already-cached runtime: the npm pin may have
        // been skipped on an earlier run.
        if install_npm && !dir.join("node_modules").join("npm").exists() {
            let pin = npm_pin_for(version)?;
            info!("Installing npm@{} into {}", pin, dir.display());
            let mut command = Command::new("cmd");
            command
                .arg("/c")
                .arg(format!("npm install --force npm@{pin}"))
                .current_dir(&dir);
            run_step(command, version, "npm install").await?;
        }

        Ok(())
    }

    fn fetcher_name(&self) -> &'static str {
        "windows (node.exe via curl)"
    }
}

/// Unix strategy: release tarball download plus gunzip/tar extraction
pub struct UnixFetcher {
    flavor: &'static str,
}

impl UnixFetcher {
    pub fn darwin() -> Self {
        Self {
            flavor: "darwin-x64",
        }
    }

    pub fn linux() -> Self {
        Self {
            flavor: "linux-x86",
        }
    }

    /// `node-v<v>-<flavor>`, the folder name inside the release tarball
    pub fn folder_name(&self, version: &str) -> String {
        format!("node-v{version}-{}", self.flavor)
    }
}

#[async_trait]
impl RuntimeFetcher for UnixFetcher {
    fn path_dirs(&self, cache_root: &Path, version: &str) -> Vec<PathBuf> {
        vec![cache_root.join(self.folder_name(version)).join("bin")]
    }

    fn is_provisioned(&self, cache_root: &Path, version: &str) -> bool {
        cache_root
            .join(self.folder_name(version))
            .join("bin")
            .exists()
    }

    async fn ensure(
        &self,
        cache_root: &Path,
        version: &str,
        _install_npm: bool,
    ) -> AgentResult<()> {
        if self.is_provisioned(cache_root, version) {
            debug!("Node {} already cached", version);
            return Ok(());
        }

        let curl = require_curl()?;
        let folder = self.folder_name(version);
        info!("Node target: {}", folder);

        let gz_path = cache_root.join(format!("{folder}.tar.gz"));
        let url = format!("https://nodejs.org/dist/v{version}/{folder}.tar.gz");
        info!("Downloading {}", gz_path.display());
        let mut download = Command::new(curl);
        download.arg("-o").arg(&gz_path).arg(&url);
        run_step(download, version, "curl").await?;

        info!("Extracting {}", gz_path.display());
        let mut extract = Command::new("bash");
        extract.arg("-c").arg(format!(
            "cd \"{}\" && gunzip -c \"{folder}.tar.gz\" | tar xopf -",
            cache_root.display()
        ));
        run_step(extract, version, "tar extract").await?;

        Ok(())
    }

    fn fetcher_name(&self) -> &'static str {
        "unix (tarball via curl)"
    }
}
