//! Read-only view of the consumer's Cordova project
//!
//! The agent never mutates the project itself; it only probes for the
//! `taco.json` version pin, installed plugins/platforms, and the installed
//! platform version map.

use crate::error::{AgentError, AgentResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// `taco.json` at the project root, carrying the CLI version pin
#[derive(Debug, Deserialize)]
struct TacoConfig {
    #[serde(rename = "cordova-cli")]
    cordova_cli: Option<String>,
}

/// A consumer project rooted at an existing directory
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Open a project, verifying the path exists
    pub fn open(root: PathBuf) -> AgentResult<Self> {
        if !root.exists() {
            return Err(AgentError::ProjectNotFound(root));
        }
        Ok(Self { root })
    }

    /// The project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Version pinned by `taco.json`, if the file exists and carries one
    pub fn pinned_cli_version(&self) -> AgentResult<Option<String>> {
        let path = self.root.join("taco.json");
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| AgentError::io(format!("reading {}", path.display()), e))?;
        let config: TacoConfig = serde_json::from_str(&content)?;
        Ok(config.cordova_cli)
    }

    /// Whether `plugins/<id>` exists under the project
    pub fn has_plugin(&self, id: &str) -> bool {
        self.root.join("plugins").join(id).exists()
    }

    /// Whether `platforms/<name>` exists under the project
    pub fn has_platform(&self, name: &str) -> bool {
        self.root.join("platforms").join(name).exists()
    }

    /// Installed platform version (as opposed to the CLI version).
    ///
    /// Newer CLIs record it in `platforms/platforms.json`; older ones ship a
    /// `platforms/<p>/cordova/version` script whose stdout is the version.
    /// Returns `None` when neither source yields one.
    pub async fn installed_platform_version(&self, platform: &str) -> AgentResult<Option<String>> {
        let json_path = self.root.join("platforms").join("platforms.json");
        if json_path.exists() {
            let content = std::fs::read_to_string(&json_path)
                .map_err(|e| AgentError::io(format!("reading {}", json_path.display()), e))?;
            let map: HashMap<String, String> = serde_json::from_str(&content)?;
            return Ok(map.get(platform).cloned());
        }

        let script = self
            .root
            .join("platforms")
            .join(platform)
            .join("cordova")
            .join("version");
        if !script.exists() {
            return Ok(None);
        }

        debug!("Querying platform version via {}", script.display());
        let output = Command::new("node")
            .arg(&script)
            .output()
            .await
            .map_err(|e| AgentError::command_failed(script.display().to_string(), e))?;
        if !output.status.success() {
            return Ok(None);
        }
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(if version.is_empty() { None } else { Some(version) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn open_missing_path_fails() {
        let err = Project::open(PathBuf::from("/nonexistent/project")).unwrap_err();
        assert!(matches!(err, AgentError::ProjectNotFound(_)));
    }

    #[test]
    fn pinned_version_from_taco_json() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("taco.json"), r#"{"cordova-cli": "6.3.0"}"#).unwrap();
        let project = Project::open(temp.path().to_path_buf()).unwrap();
        assert_eq!(project.pinned_cli_version().unwrap().as_deref(), Some("6.3.0"));
    }

    #[test]
    fn no_taco_json_means_no_pin() {
        let temp = TempDir::new().unwrap();
        let project = Project::open(temp.path().to_path_buf()).unwrap();
        assert_eq!(project.pinned_cli_version().unwrap(), None);
    }

    #[test]
    fn taco_json_without_pin_field() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("taco.json"), r#"{"name": "app"}"#).unwrap();
        let project = Project::open(temp.path().to_path_buf()).unwrap();
        assert_eq!(project.pinned_cli_version().unwrap(), None);
    }

    #[test]
    fn plugin_and_platform_probes() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("plugins").join("cordova-plugin-build-support"))
            .unwrap();
        fs::create_dir_all(temp.path().join("platforms").join("android")).unwrap();

        let project = Project::open(temp.path().to_path_buf()).unwrap();
        assert!(project.has_plugin("cordova-plugin-build-support"));
        assert!(!project.has_plugin("cordova-plugin-camera"));
        assert!(project.has_platform("android"));
        assert!(!project.has_platform("ios"));
    }

    #[tokio::test]
    async fn platform_version_from_platforms_json() {
        let temp = TempDir::new().unwrap();
        let platforms = temp.path().join("platforms");
        fs::create_dir_all(&platforms).unwrap();
        fs::write(
            platforms.join("platforms.json"),
            r#"{"ios": "3.8.0", "android": "4.1.1"}"#,
        )
        .unwrap();

        let project = Project::open(temp.path().to_path_buf()).unwrap();
        let version = project.installed_platform_version("ios").await.unwrap();
        assert_eq!(version.as_deref(), Some("3.8.0"));
        let missing = project.installed_platform_version("wp8").await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn platform_version_absent() {
        let temp = TempDir::new().unwrap();
        let project = Project::open(temp.path().to_path_buf()).unwrap();
        let version = project.installed_platform_version("ios").await.unwrap();
        assert_eq!(version, None);
    }
}
