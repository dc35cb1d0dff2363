pub mod activate;
pub mod deploy;
pub mod get;

use cavemark_deploy::{DeployError, HttpRemote};
use cavemark_transport::Client;

use crate::cli::{Cli, Command, GlobalArgs};
use crate::config::{self, Env};

/// Runs the parsed command line.
pub async fn dispatch(cli: Cli, env: Env) -> anyhow::Result<()> {
    match &cli.command {
        Command::Deploy(args) => deploy::run(&cli.global, args, &env).await,
        Command::Activate { deploy_key } => {
            activate::run(&cli.global, deploy_key.as_deref(), &env).await
        }
        Command::Get { what } => get::run(&cli.global, *what, &env).await,
    }
}

/// HTTP remote for the commands that only need a connection.
fn remote(global: &GlobalArgs, env: &Env) -> anyhow::Result<HttpRemote> {
    let (url, credentials) = config::connection(global, env);
    if url.is_empty() {
        return Err(DeployError::MissingUrl.into());
    }
    let client = Client::new(&url, &credentials)?;
    Ok(HttpRemote::from_client(client))
}
