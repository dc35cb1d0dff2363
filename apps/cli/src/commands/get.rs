//! `cavemark get`: read-only queries.

use cavemark_deploy::DeployRemote;

use crate::cli::{GetCommand, GlobalArgs};
use crate::commands::remote;
use crate::config::Env;
use crate::output;

pub async fn run(global: &GlobalArgs, what: GetCommand, env: &Env) -> anyhow::Result<()> {
    let remote = remote(global, env)?;
    match what {
        GetCommand::DeployKey => {
            println!("{}", remote.active_key().await?);
        }
        GetCommand::DeployList => {
            let list = remote.list_deployments().await?;
            print!("{}", output::format_deploy_list(&list));
        }
    }
    Ok(())
}
