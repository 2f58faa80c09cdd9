//! cordova-agent - CI build-agent tasks for Cordova and Ionic projects
//!
//! Resolves and caches versioned Cordova/Ionic CLI installs, provisions a
//! compatible Node.js runtime, and shells out to the cached CLI with the
//! task's verb and arguments.

pub mod cache;
pub mod cli;
pub mod error;
pub mod project;
pub mod runner;
pub mod runtime;
pub mod session;

pub use error::{AgentError, AgentResult};

/// Package name of the wrapped tool
pub const CORDOVA_PACKAGE: &str = "cordova";

/// Package name of the companion scaffolding tool
pub const IONIC_PACKAGE: &str = "ionic";
