//! `cavemark activate`: make an existing deployment live.

use cavemark_deploy::{DeployError, DeployRemote};
use cavemark_protocol::DeployKey;

use crate::cli::GlobalArgs;
use crate::commands::remote;
use crate::config::Env;
use crate::output;

pub async fn run(global: &GlobalArgs, deploy_key: Option<&str>, env: &Env) -> anyhow::Result<()> {
    let remote = remote(global, env)?;

    output::line("cavemark", format!("version {}", env!("CARGO_PKG_VERSION")));
    output::line("cavemark", format!("starting activation at {}", remote.base_url()));

    let key = DeployKey::new(deploy_key.unwrap_or_default())
        .map_err(|_| DeployError::MissingDeployKey)?;
    remote.activate(&key).await?;

    output::line("activate", format!("deployment {key} is active"));
    Ok(())
}
