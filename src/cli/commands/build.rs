//! The build task: load the resolved Cordova version, add any platform not
//! yet present in the project, then build each requested platform.

use crate::cache::ModuleCache;
use crate::cli::args::BuildArgs;
use crate::error::{AgentError, AgentResult};
use crate::project::Project;
use crate::runner::ToolRunner;
use crate::session::CordovaSession;
use std::path::Path;
use tracing::info;

pub async fn build(args: BuildArgs, working_dir: &Path) -> AgentResult<()> {
    if args.platforms.is_empty() {
        return Err(AgentError::MissingInput("platform"));
    }

    let project = Project::open(working_dir.to_path_buf())?;
    let mut session = CordovaSession::new(ModuleCache::new());
    let module = session
        .ensure_loaded(&project, args.version.as_deref(), !args.no_support_plugin)
        .await?;
    let bin = module.bin_path();

    // Add platforms if not done already
    for platform in &args.platforms {
        if project.has_platform(platform) {
            info!("Platform {} found.", platform);
        } else {
            ToolRunner::new(&bin)
                .arg("platform")
                .arg("add")
                .arg(platform)
                .exec()
                .await?;
        }
    }

    for platform in &args.platforms {
        info!(
            "Queueing build for platform {} w/options: {}",
            platform,
            args.args.as_deref().unwrap_or("none")
        );
        let mut runner = ToolRunner::new(&bin).arg("build").arg(platform);
        if let Some(ref raw) = args.args {
            runner = runner.arg_string(raw);
        }
        runner.exec().await?;
    }

    Ok(())
}
