//! Error types for cordova-agent
//!
//! All modules use `AgentResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// All errors that can occur while running a task
#[derive(Error, Debug)]
pub enum AgentError {
    // Configuration errors
    #[error("Missing required input: {0}")]
    MissingInput(&'static str),

    #[error("Specified project path does not exist: {0}")]
    ProjectNotFound(PathBuf),

    #[error("Invalid version '{version}' for {package}: {reason}")]
    VersionInvalid {
        package: String,
        version: String,
        reason: String,
    },

    // Module cache errors
    #[error("Failed to install {package}@{version}: {stderr}")]
    Install {
        package: String,
        version: String,
        stderr: String,
    },

    #[error("Failed to lock cache entry {path}: {reason}")]
    CacheLock { path: PathBuf, reason: String },

    // Runtime provisioning errors
    #[error("curl was not found in PATH. curl is required to download a Node.js runtime. You can get curl by installing the Git command line tools (www.git-scm.com/downloads)")]
    CurlNotFound,

    #[error("node was not found in PATH")]
    NodeNotFound,

    #[error("Failed to provision Node.js {version}: {reason}")]
    RuntimeProvision { version: String, reason: String },

    // Process errors
    #[error("Failed to spawn command: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command}, exit code: {code}")]
    CommandExecution { command: String, code: i32 },

    #[error("Process terminated by signal")]
    ProcessSignaled,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command spawn error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error from a non-zero exit status
    pub fn command_exec(command: impl Into<String>, code: i32) -> Self {
        Self::CommandExecution {
            command: command.into(),
            code,
        }
    }

    /// Exit code to report for this error.
    ///
    /// A failed wrapped-tool invocation forwards the child's own exit
    /// code; everything else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandExecution { code, .. } if *code > 0 => *code,
            _ => 1,
        }
    }
}
