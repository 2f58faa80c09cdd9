//! CLI argument definitions using clap derive
//!
//! Every task input doubles as an environment variable so the agent can be
//! driven either from a shell or from CI task variables (`INPUT_*`).

use crate::runtime::DEFAULT_NODE_TARGET;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// cordova-agent - CI build-agent tasks for Cordova and Ionic projects
#[derive(Parser, Debug)]
#[command(name = "cordova-agent")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Task to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Working directory override (falls back to the CI source directory)
    #[arg(long, global = true, env = "INPUT_CWD")]
    pub cwd: Option<PathBuf>,

    /// Provision a runtime when the found node is below this version
    #[arg(long, global = true, env = "CORDOVA_MIN_NODE_VERSION")]
    pub min_node_version: Option<String>,

    /// Provision a runtime when the found node is above this version
    #[arg(long, global = true, env = "CORDOVA_MAX_NODE_VERSION")]
    pub max_node_version: Option<String>,

    /// Node version to provision when out of range
    #[arg(long, global = true, env = "CORDOVA_TARGET_NODE_VERSION", default_value = DEFAULT_NODE_TARGET)]
    pub target_node_version: String,

    /// Also pin a compatible npm into a provisioned Windows runtime
    #[arg(long, global = true)]
    pub install_npm: bool,
}

/// Available tasks
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an arbitrary Cordova CLI command
    Cordova(CordovaArgs),

    /// Run an arbitrary Ionic CLI command (puts Cordova on PATH first)
    Ionic(IonicArgs),

    /// Add missing platforms and build each requested platform
    Build(BuildArgs),

    /// Package built platforms (legacy iOS .ipa path)
    Package(PackageArgs),
}

/// Arguments for the cordova task
#[derive(Parser, Debug)]
pub struct CordovaArgs {
    /// Cordova verb to run (e.g. build, prepare, plugin)
    #[arg(long = "command", env = "INPUT_CORDOVACOMMAND")]
    pub command: Option<String>,

    /// Raw trailing arguments, appended verbatim
    #[arg(long = "args", env = "INPUT_CORDOVAARGS", allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Cordova CLI version pin
    #[arg(id = "cordova_version", long = "cordova-version", env = "INPUT_CORDOVAVERSION")]
    pub version: Option<String>,
}

/// Arguments for the ionic task
#[derive(Parser, Debug)]
pub struct IonicArgs {
    /// Ionic verb to run
    #[arg(long = "command", env = "INPUT_IONICCOMMAND")]
    pub command: Option<String>,

    /// Raw trailing arguments, appended verbatim
    #[arg(long = "args", env = "INPUT_IONICARGS", allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Ionic CLI version pin
    #[arg(long = "ionic-version", env = "INPUT_IONICVERSION")]
    pub ionic_version: Option<String>,

    /// Cordova CLI version pin (Ionic requires Cordova on PATH)
    #[arg(long = "cordova-version", env = "INPUT_CORDOVAVERSION")]
    pub cordova_version: Option<String>,
}

/// Arguments for the build task
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Platforms to build (repeatable or comma-separated)
    #[arg(long = "platform", env = "INPUT_PLATFORM", value_delimiter = ',')]
    pub platforms: Vec<String>,

    /// Raw build arguments, appended verbatim
    #[arg(long = "args", env = "INPUT_CORDOVAARGS", allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Cordova CLI version pin
    #[arg(id = "cordova_version", long = "cordova-version", env = "INPUT_CORDOVAVERSION")]
    pub version: Option<String>,

    /// Skip installing the bundled support plugin into the project
    #[arg(long)]
    pub no_support_plugin: bool,
}

/// Arguments for the package task
#[derive(Parser, Debug)]
pub struct PackageArgs {
    /// Platforms to package (repeatable or comma-separated)
    #[arg(long = "platform", env = "INPUT_PLATFORM", value_delimiter = ',')]
    pub platforms: Vec<String>,

    /// Raw packaging arguments, appended verbatim
    #[arg(long = "args", env = "INPUT_PACKAGEARGS", allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Cordova CLI version pin
    #[arg(id = "cordova_version", long = "cordova-version", env = "INPUT_CORDOVAVERSION")]
    pub version: Option<String>,
}
