//! Data types for the deploy flow.

use cavemark_assets::AssetFile;
use cavemark_protocol::{DeployKey, DeployStage};

use crate::secrets::EnvSecret;

/// Progress event emitted during deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// A file change triggered the run that follows.
    ChangeDetected,
    /// A pipeline run started for `key`.
    Started { key: DeployKey },
    /// A stage has work to do and is starting.
    StageStarted { stage: DeployStage, detail: String },
    /// One artifact was acknowledged by the remote.
    Uploaded { stage: DeployStage, artifact: String },
    /// A stage had nothing to do.
    StageSkipped { stage: DeployStage },
    /// A stage finished successfully.
    StageCompleted { stage: DeployStage },
    /// Every stage succeeded and `key` is live.
    Completed { key: DeployKey },
}

/// One artifact pushed to the remote under a deploy key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upload {
    Secret(EnvSecret),
    /// The bundled function code.
    Function(Vec<u8>),
    Resource(AssetFile),
    Static(AssetFile),
}

impl Upload {
    pub fn stage(&self) -> DeployStage {
        match self {
            Upload::Secret(_) => DeployStage::Secrets,
            Upload::Function(_) => DeployStage::Function,
            Upload::Resource(_) => DeployStage::Resources,
            Upload::Static(_) => DeployStage::Statics,
        }
    }

    /// Human-readable name used in logs and errors.
    pub fn artifact(&self) -> String {
        match self {
            Upload::Secret(s) => format!("secret ({})", s.key),
            Upload::Function(_) => "bundle".to_string(),
            Upload::Resource(a) => format!("resource file ({})", a.source_path.display()),
            Upload::Static(a) => format!("static file ({})", a.source_path.display()),
        }
    }
}
