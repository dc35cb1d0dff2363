//! One-call deployment: pick the key, then run the pipeline.

use std::sync::Arc;

use tokio::sync::mpsc;

use cavemark_bundler::Bundler;
use cavemark_protocol::DeployKey;

use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::pipeline::Pipeline;
use crate::remote::DeployRemote;
use crate::strategy::Strategy;
use crate::types::DeployEvent;

/// Owns everything a deployment run needs.
///
/// [`Deployer::run`] takes no arguments, so the watch loop can call it
/// again for every change.
pub struct Deployer {
    config: DeployConfig,
    strategy: Strategy,
    remote: Arc<dyn DeployRemote>,
    bundler: Arc<dyn Bundler>,
    events: Option<mpsc::UnboundedSender<DeployEvent>>,
}

impl Deployer {
    pub fn new(
        config: DeployConfig,
        strategy: Strategy,
        remote: Arc<dyn DeployRemote>,
        bundler: Arc<dyn Bundler>,
    ) -> Self {
        Self {
            config,
            strategy,
            remote,
            bundler,
            events: None,
        }
    }

    /// Returns a receiver for the progress of every later run.
    ///
    /// Calling it again replaces the previous subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<DeployEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Resolves the key for this run and deploys to it.
    pub async fn run(&self) -> Result<DeployKey, DeployError> {
        let key = self.strategy.next_key(self.remote.as_ref()).await?;

        let mut pipeline = Pipeline::new(&self.config, self.remote.as_ref(), self.bundler.as_ref());
        if let Some(tx) = &self.events {
            pipeline = pipeline.with_events(tx);
        }

        pipeline.deploy(&key).await?;
        Ok(key)
    }

    /// [`Deployer::run`] after a file change, announced on the event
    /// channel ahead of the run's own progress.
    pub async fn redeploy(&self) -> Result<DeployKey, DeployError> {
        if let Some(tx) = &self.events {
            let _ = tx.send(DeployEvent::ChangeDetected);
        }
        self.run().await
    }
}
