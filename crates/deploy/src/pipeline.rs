//! The ordered deployment stages for one deploy key.
//!
//! Stages run strictly in [`DeployStage::ALL`] order. The first failure
//! aborts the run and is returned unchanged; nothing is rolled back.

use tokio::sync::mpsc;
use tracing::{debug, info};

use cavemark_assets::AssetFile;
use cavemark_bundler::{BundleOptions, Bundler};
use cavemark_protocol::{DeployKey, DeployStage};

use crate::config::{DeployConfig, DirOrigin, SourceDir};
use crate::error::DeployError;
use crate::remote::DeployRemote;
use crate::types::{DeployEvent, Upload};

/// Runs the deployment stages against a remote.
pub struct Pipeline<'a> {
    config: &'a DeployConfig,
    remote: &'a dyn DeployRemote,
    bundler: &'a dyn Bundler,
    events: Option<&'a mpsc::UnboundedSender<DeployEvent>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a DeployConfig,
        remote: &'a dyn DeployRemote,
        bundler: &'a dyn Bundler,
    ) -> Self {
        Self {
            config,
            remote,
            bundler,
            events: None,
        }
    }

    /// Reports progress on `events`. A closed receiver is ignored.
    pub fn with_events(mut self, events: &'a mpsc::UnboundedSender<DeployEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Deploys everything configured under `key` and activates it.
    pub async fn deploy(&self, key: &DeployKey) -> Result<(), DeployError> {
        info!(key = %key, "deployment started");
        self.emit(DeployEvent::Started { key: key.clone() });

        for stage in DeployStage::ALL {
            self.run_stage(stage, key).await?;
        }

        info!(key = %key, "deployment activated");
        self.emit(DeployEvent::Completed { key: key.clone() });
        Ok(())
    }

    async fn run_stage(&self, stage: DeployStage, key: &DeployKey) -> Result<(), DeployError> {
        match stage {
            DeployStage::Begin => {
                self.started(stage, format!("deployment {key}"));
                self.remote.begin(key).await?;
                self.completed(stage);
            }
            DeployStage::Secrets => {
                if self.config.secrets.is_empty() {
                    self.skipped(stage);
                    return Ok(());
                }
                self.started(stage, format!("{} secret(s)", self.config.secrets.len()));
                for secret in &self.config.secrets {
                    self.upload(key, Upload::Secret(secret.clone())).await?;
                }
                self.completed(stage);
            }
            DeployStage::Function => {
                if !self.config.function_entry_exists()? {
                    debug!(dir = %self.config.func_dir.display(), "no function entry point");
                    self.skipped(stage);
                    return Ok(());
                }
                let entry = self.config.entry_file();
                self.started(stage, format!("bundling {}", entry.display()));
                let bundle = self
                    .bundler
                    .bundle(&entry, &BundleOptions::server_function())
                    .await?;
                self.upload(key, Upload::Function(bundle)).await?;
                self.completed(stage);
            }
            DeployStage::Resources => {
                self.upload_dir(stage, key, self.config.resource_dir.as_ref(), Upload::Resource)
                    .await?;
            }
            DeployStage::Statics => {
                self.upload_dir(stage, key, self.config.static_dir.as_ref(), Upload::Static)
                    .await?;
            }
            DeployStage::Activate => {
                self.started(stage, format!("deployment {key}"));
                self.remote.activate(key).await?;
                self.completed(stage);
            }
        }
        Ok(())
    }

    async fn upload_dir(
        &self,
        stage: DeployStage,
        key: &DeployKey,
        dir: Option<&SourceDir>,
        wrap: fn(AssetFile) -> Upload,
    ) -> Result<(), DeployError> {
        let Some(dir) = dir else {
            self.skipped(stage);
            return Ok(());
        };

        let root = match (dir.existing()?, dir.origin) {
            (Some(root), _) => root,
            (None, DirOrigin::Default) => {
                debug!(stage = %stage, dir = %dir.path.display(), "default directory missing");
                self.skipped(stage);
                return Ok(());
            }
            (None, DirOrigin::Explicit) => {
                return Err(DeployError::MissingDirectory {
                    stage,
                    path: dir.path.clone(),
                });
            }
        };

        let files = cavemark_assets::collect(root)?;
        if files.is_empty() {
            self.skipped(stage);
            return Ok(());
        }

        self.started(stage, format!("{} file(s) from {}", files.len(), root.display()));
        for file in files {
            self.upload(key, wrap(file)).await?;
        }
        self.completed(stage);
        Ok(())
    }

    async fn upload(&self, key: &DeployKey, upload: Upload) -> Result<(), DeployError> {
        let stage = upload.stage();
        let artifact = upload.artifact();
        self.remote.upload(key, upload).await?;
        debug!(stage = %stage, artifact = %artifact, "uploaded");
        self.emit(DeployEvent::Uploaded { stage, artifact });
        Ok(())
    }

    fn started(&self, stage: DeployStage, detail: String) {
        self.emit(DeployEvent::StageStarted { stage, detail });
    }

    fn completed(&self, stage: DeployStage) {
        self.emit(DeployEvent::StageCompleted { stage });
    }

    fn skipped(&self, stage: DeployStage) {
        self.emit(DeployEvent::StageSkipped { stage });
    }

    fn emit(&self, event: DeployEvent) {
        if let Some(tx) = self.events {
            let _ = tx.send(event);
        }
    }
}
