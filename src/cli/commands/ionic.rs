//! The ionic task: cache the Cordova CLI, put it on PATH (Ionic shells out
//! to it), then cache and invoke the Ionic CLI.

use crate::cache::ModuleCache;
use crate::cli::args::IonicArgs;
use crate::error::{AgentError, AgentResult};
use crate::project::Project;
use crate::runner::ToolRunner;
use crate::runtime::prepend_path;
use crate::{CORDOVA_PACKAGE, IONIC_PACKAGE};
use std::path::Path;
use tracing::debug;

pub async fn ionic(args: IonicArgs, working_dir: &Path) -> AgentResult<()> {
    let verb = args.command.ok_or(AgentError::MissingInput("ionicCommand"))?;

    let project = Project::open(working_dir.to_path_buf())?;
    let cache = ModuleCache::new();

    let cordova = cache
        .resolve_and_install(CORDOVA_PACKAGE, args.cordova_version.as_deref(), &project)
        .await?;
    debug!("Cordova module path: {}", cordova.module_path.display());
    if let Some(bin_dir) = cordova.bin_path().parent() {
        prepend_path(bin_dir);
    }

    let ionic = cache
        .resolve_and_install(IONIC_PACKAGE, args.ionic_version.as_deref(), &project)
        .await?;
    debug!("Ionic module path: {}", ionic.module_path.display());

    let mut runner = ToolRunner::new(ionic.bin_path()).arg(verb);
    if let Some(ref raw) = args.args {
        runner = runner.arg_string(raw);
    }
    runner.exec().await
}
