//! The package task: legacy iOS `.ipa` creation.
//!
//! cordova-ios 3.9.0 and later produce the .ipa during build, so packaging
//! only applies to older installed platform versions. When the built app
//! bundle cannot be identified unambiguously the step warns and skips
//! rather than failing the task.

use crate::cache::ModuleCache;
use crate::cli::args::PackageArgs;
use crate::error::AgentResult;
use crate::project::Project;
use crate::runner::ToolRunner;
use crate::session::CordovaSession;
use semver::Version;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Installed cordova-ios versions at/above this create the .ipa themselves
const IOS_AUTO_IPA_VERSION: &str = "3.9.0";

pub async fn package(args: PackageArgs, working_dir: &Path) -> AgentResult<()> {
    let project = Project::open(working_dir.to_path_buf())?;
    let mut session = CordovaSession::new(ModuleCache::new());
    session
        .ensure_loaded(&project, args.version.as_deref(), true)
        .await?;

    for platform in &args.platforms {
        if platform == "ios" {
            create_ipa(&project, args.args.as_deref()).await?;
        } else {
            info!(
                "Platform {} does not require a separate package step.",
                platform
            );
        }
    }
    Ok(())
}

/// Find the built device .app and package it with xcrun
async fn create_ipa(project: &Project, raw_args: Option<&str>) -> AgentResult<()> {
    let Some(installed) = project.installed_platform_version("ios").await? else {
        warn!("Skipping packaging. Could not determine the installed ios platform version.");
        return Ok(());
    };

    match Version::parse(&installed) {
        Ok(version) if version >= Version::parse(IOS_AUTO_IPA_VERSION).expect("valid cutoff") => {
            info!("Skipping packaging. Detected cordova-ios version that auto-creates ipa.");
            return Ok(());
        }
        Ok(_) => {}
        Err(_) => {
            warn!(
                "Skipping packaging. Unparseable ios platform version: {}",
                installed
            );
            return Ok(());
        }
    }

    let apps = find_device_apps(project.root())?;
    if apps.len() != 1 {
        warn!(
            "Skipping packaging. Expected one device .app - found {}",
            apps.len()
        );
        return Ok(());
    }

    let app = &apps[0];
    let ipa = app.with_extension("ipa");
    let mut runner = ToolRunner::new("xcrun")
        .arg("-sdk")
        .arg("iphoneos")
        .arg("PackageApplication")
        .arg_path(app)
        .arg("-o")
        .arg_path(&ipa);
    if let Some(raw) = raw_args {
        runner = runner.arg_string(raw);
    }
    runner.exec().await
}

/// Glob `platforms/ios/build/device/*.app` under the project
fn find_device_apps(project_root: &Path) -> AgentResult<Vec<PathBuf>> {
    let pattern = project_root
        .join("platforms")
        .join("ios")
        .join("build")
        .join("device")
        .join("*.app");
    let matches = glob::glob(&pattern.to_string_lossy())
        .map_err(|e| crate::error::AgentError::io(
            format!("globbing {}", pattern.display()),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        ))?
        .filter_map(Result::ok)
        .collect();
    Ok(matches)
}
