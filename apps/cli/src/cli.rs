use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// cavemark controls Cavemark instances
#[derive(Parser, Debug)]
#[command(name = "cavemark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings shared by every command.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// The url to Cavemark [CAVEMARK_URL]
    #[arg(short, long, global = true)]
    pub url: Option<String>,

    /// The api key [CAVEMARK_API_KEY]
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// The api secret key [CAVEMARK_API_SECRET_KEY]
    #[arg(long, global = true)]
    pub api_secret_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy to Cavemark
    #[command(after_help = DEPLOY_HELP)]
    Deploy(DeployArgs),

    /// Activate a deployment
    Activate {
        /// The deployment key to activate
        #[arg(short = 'k', long)]
        deploy_key: Option<String>,
    },

    /// Retrieve information about a Cavemark instance
    Get {
        #[command(subcommand)]
        what: GetCommand,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct DeployArgs {
    /// The directory that contains functions to deploy [CAVEMARK_FUNC_DIR]
    #[arg(short = 'f', long)]
    pub func_dir: Option<PathBuf>,

    /// The directory that contains resource files to deploy [CAVEMARK_RESOURCE_DIR]
    #[arg(short = 'r', long)]
    pub resource_dir: Option<PathBuf>,

    /// The directory that contains static assets to deploy [CAVEMARK_STATIC_DIR]
    #[arg(short = 's', long)]
    pub static_dir: Option<PathBuf>,

    /// The deployment strategy (bluegreen, manual) [CAVEMARK_STRATEGY]
    #[arg(short = 'g', long)]
    pub strategy: Option<String>,

    /// A manually specified deployment key, used with the manual strategy
    #[arg(short = 'k', long)]
    pub deploy_key: Option<String>,

    /// Deploy again whenever a watched file changes
    #[arg(short, long)]
    pub watch: bool,

    /// Command used to run esbuild [CAVEMARK_ESBUILD]
    #[arg(long)]
    pub esbuild: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetCommand {
    /// Print the currently activated deployment key
    DeployKey,
    /// Print all deployments, newest first
    DeployList,
}

const DEPLOY_HELP: &str = "\
Strategies:
  bluegreen  rotates between blue and green deployments
  manual     you supply the deployment key

Secrets:
  Every environment variable starting with CAVEMARK_SECRET_ is deployed as a
  secret without that prefix: CAVEMARK_SECRET_PG_CONNECTION is available to
  functions as PG_CONNECTION.

Examples:
  # bundle src/index.js and deploy it with the bluegreen strategy
  cavemark deploy

  # deploy ~/dev/project/server and the static files in ~/dev/project/assets
  # to https://example.com under the key 'example'
  cavemark deploy -f ~/dev/project/server -s ~/dev/project/assets -u https://example.com -g manual -k example";
