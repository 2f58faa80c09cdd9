//! Versioned module cache for the wrapped CLI packages
//!
//! Each installed version of a package lives in its own slot under the
//! cache root: `<root>/<version>/node_modules/<package>`. Existence of that
//! path is the sole hit check; entries are permanent until externally
//! deleted. Misses are installed with npm scoped to the version directory,
//! under a per-entry advisory lock.

pub mod lock;

use crate::error::{AgentError, AgentResult};
use crate::project::Project;
use crate::runner;
use crate::CORDOVA_PACKAGE;
use lock::CacheLock;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Fallback version of the wrapped tool when nothing pins one
pub const DEFAULT_CORDOVA_VERSION: &str = "5.3.3";

/// Fallback version of the companion scaffolding tool
pub const DEFAULT_IONIC_VERSION: &str = "1.7.16";

/// A resolved, installed cache entry
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// npm package name
    pub package: String,
    /// Resolved semantic version
    pub version: String,
    /// `<root>/<version>/node_modules/<package>`
    pub module_path: PathBuf,
}

impl CacheEntry {
    /// Path to the package's command-line executable
    /// (`<version>/node_modules/.bin/<package>`, `.cmd` on Windows).
    pub fn bin_path(&self) -> PathBuf {
        self.module_path
            .parent()
            .unwrap_or(&self.module_path)
            .join(".bin")
            .join(runner::executable_name(&self.package))
    }
}

/// Version-keyed on-disk cache of npm package installs
pub struct ModuleCache {
    root: PathBuf,
    default_cordova_version: String,
    installer: String,
}

impl ModuleCache {
    /// Create a cache rooted at `CORDOVA_CACHE` or the platform default
    /// (`%APPDATA%\cordova-cache` on Windows, `~/.cordova-cache` elsewhere).
    pub fn new() -> Self {
        Self::with_root(Self::default_root())
    }

    /// Create a cache with an explicit root directory
    pub fn with_root(root: PathBuf) -> Self {
        let default_cordova_version = std::env::var("CORDOVA_DEFAULT_VERSION")
            .unwrap_or_else(|_| DEFAULT_CORDOVA_VERSION.to_string());
        Self {
            root,
            default_cordova_version,
            installer: default_installer().to_string(),
        }
    }

    /// Override the install program (used by tests to stub out npm)
    pub fn with_installer(mut self, installer: impl Into<String>) -> Self {
        self.installer = installer.into();
        self
    }

    /// Default cache root for the current platform
    pub fn default_root() -> PathBuf {
        if let Ok(dir) = std::env::var("CORDOVA_CACHE") {
            return PathBuf::from(dir);
        }
        if cfg!(windows) {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cordova-cache")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cordova-cache")
        }
    }

    /// The cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the version to use for `package`.
    ///
    /// Precedence: explicit request > project `taco.json` pin (primary
    /// package only) > compiled-in default.
    pub fn resolve_version(
        &self,
        package: &str,
        requested: Option<&str>,
        project: &Project,
    ) -> AgentResult<String> {
        if let Some(version) = requested {
            return Ok(version.to_string());
        }

        if package == CORDOVA_PACKAGE {
            if let Some(pinned) = project.pinned_cli_version()? {
                info!(
                    "Cordova version set to {} based on the contents of taco.json",
                    pinned
                );
                return Ok(pinned);
            }
            info!(
                "taco.json not found. Using default Cordova version of {}",
                self.default_cordova_version
            );
            return Ok(self.default_cordova_version.clone());
        }

        Ok(DEFAULT_IONIC_VERSION.to_string())
    }

    /// Resolve the requested version and make sure it is installed,
    /// returning the cache entry either way.
    pub async fn resolve_and_install(
        &self,
        package: &str,
        requested: Option<&str>,
        project: &Project,
    ) -> AgentResult<CacheEntry> {
        let version = self.resolve_version(package, requested, project)?;

        if !self.root.exists() {
            tokio::fs::create_dir_all(&self.root)
                .await
                .map_err(|e| AgentError::io(format!("creating {}", self.root.display()), e))?;
            info!("Creating {}", self.root.display());
        }
        debug!("Module cache found at {}", self.root.display());

        let version_dir = self.root.join(&version);
        let module_path = version_dir.join("node_modules").join(package);
        let entry = CacheEntry {
            package: package.to_string(),
            version: version.clone(),
            module_path: module_path.clone(),
        };

        if module_path.exists() {
            info!("{}@{} already installed.", package, version);
            return Ok(entry);
        }

        // The version directory has to exist to host the lock file
        tokio::fs::create_dir_all(&version_dir)
            .await
            .map_err(|e| AgentError::io(format!("creating {}", version_dir.display()), e))?;

        // Held across the re-check and the install; a concurrent winner
        // turns this call into a cache hit.
        let _lock = CacheLock::acquire(&version_dir, package)?;
        if module_path.exists() {
            info!("{}@{} already installed.", package, version);
            return Ok(entry);
        }

        // node_modules being present pins npm's install location
        tokio::fs::create_dir_all(version_dir.join("node_modules"))
            .await
            .map_err(|e| AgentError::io(format!("creating {}", version_dir.display()), e))?;

        self.install(package, &version, &version_dir).await?;
        Ok(entry)
    }

    /// Run `npm install <package>@<version>` scoped to the version directory
    async fn install(&self, package: &str, version: &str, version_dir: &Path) -> AgentResult<()> {
        let spec = format!("{package}@{version}");
        info!("Installing {}. (This may take a few minutes.)", spec);

        let output = Command::new(&self.installer)
            .arg("install")
            .arg(&spec)
            .current_dir(version_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AgentError::command_failed(format!("{} install {spec}", self.installer), e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            println!("{}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            eprintln!("{}", stderr.trim_end());
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(AgentError::Install {
                package: package.to_string(),
                version: version.to_string(),
                stderr: stderr.trim().to_string(),
            })
        }
    }
}

impl Default for ModuleCache {
    fn default() -> Self {
        Self::new()
    }
}

/// npm executable name; npm ships as a `.cmd` shim on Windows
fn default_installer() -> &'static str {
    if cfg!(windows) {
        "npm.cmd"
    } else {
        "npm"
    }
}
