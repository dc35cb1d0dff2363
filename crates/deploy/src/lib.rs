//! Cavemark deployment flow.
//!
//! A deployment runs these stages in order for one deploy key:
//!
//! 1. **Begin**: open the deployment on the server
//! 2. **Secrets**: upload every `CAVEMARK_SECRET_*` value
//! 3. **Function**: bundle `index.js` and upload the result
//! 4. **Resources**: upload the resource directory
//! 5. **Statics**: upload the static directory
//! 6. **Activate**: make the key live
//!
//! The key comes from a [`Strategy`]; [`Deployer`] ties strategy, remote
//! and bundler together behind a single `run()` call.

pub mod config;
pub mod deployer;
pub mod error;
pub mod pipeline;
pub mod remote;
pub mod secrets;
pub mod strategy;
pub mod types;

pub use config::{DeployConfig, DirOrigin, SourceDir};
pub use deployer::Deployer;
pub use error::DeployError;
pub use pipeline::Pipeline;
pub use remote::{DeployRemote, HttpRemote, RemoteFuture};
pub use secrets::{EnvSecret, env_secrets, secrets_with_prefix};
pub use strategy::{Strategy, rotate};
pub use types::{DeployEvent, Upload};
