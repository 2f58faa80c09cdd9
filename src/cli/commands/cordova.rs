//! The cordova task: run an arbitrary Cordova CLI verb against the cached
//! install resolved for this project.

use crate::cache::ModuleCache;
use crate::cli::args::CordovaArgs;
use crate::error::{AgentError, AgentResult};
use crate::project::Project;
use crate::runner::ToolRunner;
use crate::CORDOVA_PACKAGE;
use std::path::Path;
use tracing::debug;

pub async fn cordova(args: CordovaArgs, working_dir: &Path) -> AgentResult<()> {
    let verb = args
        .command
        .ok_or(AgentError::MissingInput("cordovaCommand"))?;

    let project = Project::open(working_dir.to_path_buf())?;
    let cache = ModuleCache::new();
    let entry = cache
        .resolve_and_install(CORDOVA_PACKAGE, args.version.as_deref(), &project)
        .await?;
    debug!("Cordova module path: {}", entry.module_path.display());

    let mut runner = ToolRunner::new(entry.bin_path()).arg(verb);
    if let Some(ref raw) = args.args {
        runner = runner.arg_string(raw);
    }
    runner.exec().await
}
