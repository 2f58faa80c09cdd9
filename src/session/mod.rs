//! Memoized Cordova module session
//!
//! At most one loaded module per session; a load is re-used while the
//! resolved version matches the recorded one, and any mismatch forces a
//! reload. Loading pins the working directory to the project, redirects the
//! tool's own sub-caches under the module cache root, and installs the
//! bundled support plugin into the project when it is missing.

use crate::cache::{CacheEntry, ModuleCache};
use crate::error::{AgentError, AgentResult};
use crate::project::Project;
use crate::runner::ToolRunner;
use crate::CORDOVA_PACKAGE;
use std::path::PathBuf;
use tracing::{debug, info};

/// Plugin auto-added to consumer projects unless already present
pub const SUPPORT_PLUGIN_ID: &str = "cordova-plugin-build-support";

/// A loaded, ready-to-invoke module version
#[derive(Debug, Clone)]
pub struct LoadedModule {
    entry: CacheEntry,
}

impl LoadedModule {
    /// The cache entry backing this load
    pub fn entry(&self) -> &CacheEntry {
        &self.entry
    }

    /// The loaded version
    pub fn version(&self) -> &str {
        &self.entry.version
    }

    /// Path to the loaded CLI executable
    pub fn bin_path(&self) -> PathBuf {
        self.entry.bin_path()
    }
}

/// Session state for the wrapped tool, passed explicitly to dispatch calls
pub struct CordovaSession {
    cache: ModuleCache,
    loaded: Option<LoadedModule>,
}

impl CordovaSession {
    /// Create a session over the given module cache
    pub fn new(cache: ModuleCache) -> Self {
        Self {
            cache,
            loaded: None,
        }
    }

    /// The cache this session resolves against
    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// Resolve, install and load the requested Cordova version, re-using
    /// the previous load when the resolved version is unchanged.
    pub async fn ensure_loaded(
        &mut self,
        project: &Project,
        requested_version: Option<&str>,
        add_support_plugin: bool,
    ) -> AgentResult<&LoadedModule> {
        let version = self
            .cache
            .resolve_version(CORDOVA_PACKAGE, requested_version, project)?;

        let unchanged = self
            .loaded
            .as_ref()
            .is_some_and(|loaded| loaded.version() == version);
        if unchanged {
            debug!("Re-using loaded cordova {}", version);
            return Ok(self.loaded.as_ref().expect("just checked"));
        }

        let entry = self
            .cache
            .resolve_and_install(CORDOVA_PACKAGE, Some(&version), project)
            .await?;

        std::env::set_current_dir(project.root())
            .map_err(|e| AgentError::io(format!("entering {}", project.root().display()), e))?;

        // Point the tool's platform and plugin sub-caches under our cache
        // root so project builds do not scribble on the agent's home.
        std::env::set_var("CORDOVA_HOME", self.cache.root().join("_cordova"));
        std::env::set_var("PLUGMAN_HOME", self.cache.root().join("_plugman"));

        let module = LoadedModule { entry };

        if add_support_plugin && !project.has_plugin(SUPPORT_PLUGIN_ID) {
            info!("Adding support plugin.");
            ToolRunner::new(module.bin_path())
                .arg("plugin")
                .arg("add")
                .arg_path(support_plugin_source())
                .exec()
                .await?;
        }

        self.loaded = Some(module);
        Ok(self.loaded.as_ref().expect("just set"))
    }
}

/// Local source directory of the bundled support plugin.
///
/// `CORDOVA_SUPPORT_PLUGIN` overrides; the default is a `support-plugin`
/// directory shipped next to the agent executable. The plugin must be a
/// local path: fetching it from a registry trips a Cordova 5.1.1 bug.
pub fn support_plugin_source() -> PathBuf {
    if let Ok(dir) = std::env::var("CORDOVA_SUPPORT_PLUGIN") {
        return PathBuf::from(dir);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|d| d.join("support-plugin")))
        .unwrap_or_else(|| PathBuf::from("support-plugin"))
}
