//! Child-process dispatch for the wrapped CLIs
//!
//! Builds a single invocation (executable + verb + raw trailing arguments),
//! runs it with inherited stdio in the current working directory, and maps
//! a non-zero exit into an error carrying the child's code.

use crate::error::{AgentError, AgentResult};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Executable name for a Node CLI tool on the current platform.
///
/// npm bin shims are `.cmd` wrappers on Windows and bare names elsewhere.
pub fn executable_name(tool: &str) -> String {
    if cfg!(windows) {
        format!("{tool}.cmd")
    } else {
        tool.to_string()
    }
}

/// One wrapped-tool invocation
pub struct ToolRunner {
    tool: PathBuf,
    args: Vec<String>,
}

impl ToolRunner {
    /// Create a runner for the given executable path
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a path argument
    pub fn arg_path(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_string_lossy().into_owned();
        self.arg(path)
    }

    /// Append a raw argument string verbatim, split on whitespace.
    ///
    /// No quoting or escaping is applied; each whitespace-separated token
    /// becomes its own argument, matching how the CI task library relays
    /// user-supplied trailing arguments.
    pub fn arg_string(mut self, raw: &str) -> Self {
        self.args.extend(raw.split_whitespace().map(String::from));
        self
    }

    /// The arguments accumulated so far
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Human-readable command line, for logs and error messages
    pub fn command_line(&self) -> String {
        let mut line = self.tool.to_string_lossy().into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Run the tool, streaming its output, and fail with the child's exit
    /// code on a non-zero exit.
    pub async fn exec(self) -> AgentResult<()> {
        let line = self.command_line();
        debug!("Executing: {}", line);

        let status = Command::new(&self.tool)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| AgentError::command_failed(line.clone(), e))?;

        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(code) => Err(AgentError::command_exec(line, code)),
            None => Err(AgentError::ProcessSignaled),
        }
    }
}
