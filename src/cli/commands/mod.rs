//! Task implementations

mod build;
mod cordova;
mod ionic;
mod package;

pub use build::build;
pub use cordova::cordova;
pub use ionic::ionic;
pub use package::package;

use crate::error::{AgentError, AgentResult};
use std::path::PathBuf;
use tracing::debug;

/// Resolve the task working directory: explicit input, else the CI-provided
/// source directory, else the process cwd.
pub fn resolve_working_dir(explicit: Option<PathBuf>) -> AgentResult<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    for var in ["BUILD_SOURCEDIRECTORY", "BUILD_SOURCESDIRECTORY"] {
        if let Ok(dir) = std::env::var(var) {
            if !dir.is_empty() {
                debug!("Working directory from {}: {}", var, dir);
                return Ok(PathBuf::from(dir));
            }
        }
    }
    std::env::current_dir().map_err(|e| AgentError::io("getting current directory", e))
}
