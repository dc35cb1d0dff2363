//! `cavemark deploy`: one deployment, then optionally watch mode.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use cavemark_bundler::{Bundler, EsbuildBundler};
use cavemark_deploy::{DeployEvent, Deployer, HttpRemote, Strategy};
use cavemark_watch::Watcher;

use crate::cli::{DeployArgs, GlobalArgs};
use crate::config::{self, Env};
use crate::output;

pub async fn run(global: &GlobalArgs, args: &DeployArgs, env: &Env) -> anyhow::Result<()> {
    let config = config::deploy_config(global, args, env);
    let strategy_name = config::strategy_name(args, env);

    output::line("cavemark", format!("version {}", env!("CARGO_PKG_VERSION")));
    output::line("cavemark", format!("starting deployment to {}", config.url));
    output::line("strategy", format!("using strategy {strategy_name}"));

    config.validate()?;
    let strategy = Strategy::resolve(&strategy_name, args.deploy_key.as_deref())?;
    let bundler = bundler(args, env)?;
    let remote = Arc::new(HttpRemote::new(&config)?);
    let watch_roots = config.watch_roots();

    let mut deployer = Deployer::new(config, strategy, remote, bundler);
    let mut printer = tokio::spawn(print_events(deployer.subscribe()));

    // A failed first run ends the command even in watch mode.
    let first = deployer.run().await;
    if args.watch && first.is_ok() {
        // Resubscribing closes the first run's stream, so awaiting its
        // printer flushes it ahead of the watch banner.
        let events = deployer.subscribe();
        let _ = printer.await;
        printer = tokio::spawn(print_events(events));
        watch(&deployer, &watch_roots).await?;
    }

    // Flush pending progress lines before reporting the outcome.
    drop(deployer);
    let _ = printer.await;
    first?;
    Ok(())
}

async fn watch(deployer: &Deployer, roots: &[std::path::PathBuf]) -> anyhow::Result<()> {
    output::line("watch", "starting to watch directories for changes");
    let watcher = Watcher::new(roots).context("failed to start watching")?;
    for dir in watcher.watched() {
        output::line("watch", dir.display());
    }

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping watch");
        }
        on_ctrl_c.cancel();
    });

    // Failed redeploys are logged by the watch loop.
    let runs = watcher.run(cancel, || deployer.redeploy()).await;

    tracing::info!(runs, "watch stopped");
    Ok(())
}

fn bundler(args: &DeployArgs, env: &Env) -> anyhow::Result<Arc<dyn Bundler>> {
    match config::esbuild_command(args, env) {
        Some(command) => {
            let esbuild = EsbuildBundler::from_command(command)
                .with_context(|| format!("invalid esbuild command: {command:?}"))?;
            Ok(Arc::new(esbuild))
        }
        None => Ok(Arc::new(EsbuildBundler::new())),
    }
}

async fn print_events(mut events: mpsc::UnboundedReceiver<DeployEvent>) {
    while let Some(event) = events.recv().await {
        println!("{}", output::render_event(&event));
    }
}
