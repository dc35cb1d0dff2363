//! Deploy error types.

use std::path::PathBuf;

use cavemark_protocol::DeployStage;

/// Errors produced while validating, resolving a strategy or deploying.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("url is required")]
    MissingUrl,

    #[error("api key is required")]
    MissingApiKey,

    #[error("api secret key is required")]
    MissingApiSecretKey,

    #[error("no index.js or static files to deploy")]
    NothingToDeploy,

    #[error("strategy ({0}) not supported")]
    UnsupportedStrategy(String),

    #[error("please supply the deploy-key parameter")]
    MissingDeployKey,

    #[error("failed to deploy {artifact}: status code = {status}")]
    Status {
        stage: DeployStage,
        artifact: String,
        status: u16,
    },

    #[error("failed to get {request}: status code = {status}")]
    Request { request: &'static str, status: u16 },

    #[error("error deploying {artifact}: {source}")]
    Transport {
        artifact: String,
        #[source]
        source: cavemark_transport::TransportError,
    },

    #[error("{stage} directory ({}) does not exist", path.display())]
    MissingDirectory { stage: DeployStage, path: PathBuf },

    #[error("error reading ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Assets(#[from] cavemark_assets::AssetError),

    #[error(transparent)]
    Bundle(#[from] cavemark_bundler::BundleError),

    #[error("invalid deployment list: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeployError {
    /// Pipeline stage the error was raised in, when it came from one.
    pub fn stage(&self) -> Option<DeployStage> {
        match self {
            DeployError::Status { stage, .. } | DeployError::MissingDirectory { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }
}
