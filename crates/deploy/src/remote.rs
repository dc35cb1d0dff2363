//! Remote deploy API trait and its HTTP implementation.
//!
//! `DeployRemote` keeps the pipeline decoupled from HTTP so the stage
//! logic can be exercised against mocks.

use std::future::Future;
use std::pin::Pin;

use cavemark_protocol::constants::TEXT_PLAIN;
use cavemark_protocol::{DeployKey, DeployStage, DeploymentSummary, endpoints};
use cavemark_transport::{Client, Reply};
use tracing::warn;

use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::types::Upload;

/// Future returned by [`DeployRemote`] calls.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DeployError>> + Send + 'a>>;

/// Abstract connection to a Cavemark instance.
pub trait DeployRemote: Send + Sync {
    /// Returns the currently active deploy key, verbatim.
    fn active_key(&self) -> RemoteFuture<'_, String>;

    /// Signals the start of a deployment.
    fn begin<'a>(&'a self, key: &'a DeployKey) -> RemoteFuture<'a, ()>;

    /// Pushes one artifact under `key`.
    fn upload<'a>(&'a self, key: &'a DeployKey, upload: Upload) -> RemoteFuture<'a, ()>;

    /// Makes `key` the live deployment.
    fn activate<'a>(&'a self, key: &'a DeployKey) -> RemoteFuture<'a, ()>;
}

/// [`DeployRemote`] over the documented HTTP contract.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
}

impl HttpRemote {
    /// Creates a remote for the instance and credentials in `config`.
    pub fn new(config: &DeployConfig) -> Result<Self, DeployError> {
        let client = Client::new(&config.url, &config.credentials).map_err(|source| {
            DeployError::Transport {
                artifact: "client".into(),
                source,
            }
        })?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Lists all deployments, newest first.
    pub async fn list_deployments(&self) -> Result<Vec<DeploymentSummary>, DeployError> {
        let reply = self
            .client
            .get(&endpoints::deploy_list())
            .await
            .map_err(transport("deployment list"))?;
        if !reply.is_ok() {
            return Err(DeployError::Request {
                request: "deployment list",
                status: reply.status,
            });
        }
        let mut list: Vec<DeploymentSummary> = serde_json::from_slice(&reply.body)?;
        DeploymentSummary::sort_newest_first(&mut list);
        Ok(list)
    }

    async fn fetch_active_key(&self) -> Result<String, DeployError> {
        let reply = self
            .client
            .get(&endpoints::active_key())
            .await
            .map_err(transport("active deploy key"))?;
        // A fresh instance has no active key; whatever came back is the
        // reported value and rotation maps it to the default slot.
        if !reply.is_ok() {
            warn!(status = reply.status, "active deploy key query was not answered with 200");
        }
        Ok(reply.text().trim().to_string())
    }

    async fn control(
        &self,
        stage: DeployStage,
        path: String,
        key: &DeployKey,
    ) -> Result<(), DeployError> {
        let artifact = format!("deployment {key}");
        let reply = self
            .client
            .post(&path, TEXT_PLAIN, Vec::new())
            .await
            .map_err(transport(&artifact))?;
        acknowledge(&reply, stage, artifact)
    }

    async fn push(&self, key: &DeployKey, upload: Upload) -> Result<(), DeployError> {
        let stage = upload.stage();
        let artifact = upload.artifact();

        let (path, content_type, body) = match upload {
            Upload::Secret(secret) => (
                endpoints::secret(key, &secret.key),
                TEXT_PLAIN,
                secret.value.into_bytes(),
            ),
            Upload::Function(bundle) => (endpoints::function(key), TEXT_PLAIN, bundle),
            Upload::Resource(asset) => (
                endpoints::resource(key, &asset.relative_path),
                asset.content_type,
                asset.contents,
            ),
            Upload::Static(asset) => (
                endpoints::static_file(key, &asset.relative_path),
                asset.content_type,
                asset.contents,
            ),
        };

        let reply = self
            .client
            .put(&path, content_type, body)
            .await
            .map_err(transport(&artifact))?;
        acknowledge(&reply, stage, artifact)
    }
}

impl DeployRemote for HttpRemote {
    fn active_key(&self) -> RemoteFuture<'_, String> {
        Box::pin(self.fetch_active_key())
    }

    fn begin<'a>(&'a self, key: &'a DeployKey) -> RemoteFuture<'a, ()> {
        Box::pin(self.control(DeployStage::Begin, endpoints::begin(key), key))
    }

    fn upload<'a>(&'a self, key: &'a DeployKey, upload: Upload) -> RemoteFuture<'a, ()> {
        Box::pin(self.push(key, upload))
    }

    fn activate<'a>(&'a self, key: &'a DeployKey) -> RemoteFuture<'a, ()> {
        Box::pin(self.control(DeployStage::Activate, endpoints::activate(key), key))
    }
}

/// An empty-body 204 is the only success signal.
fn acknowledge(reply: &Reply, stage: DeployStage, artifact: String) -> Result<(), DeployError> {
    if reply.is_no_content() {
        return Ok(());
    }
    Err(DeployError::Status {
        stage,
        artifact,
        status: reply.status,
    })
}

fn transport(
    artifact: &str,
) -> impl FnOnce(cavemark_transport::TransportError) -> DeployError + '_ {
    move |source| DeployError::Transport {
        artifact: artifact.to_string(),
        source,
    }
}
