//! Wire types and endpoint paths for the Cavemark deploy API.
//!
//! Everything the CLI exchanges with a Cavemark instance is described
//! here: deployment keys, the ordered pipeline stages, request paths and
//! the JSON shape of the deployment list.

pub mod constants;
pub mod endpoints;
pub mod types;

// Re-export primary types for convenience.
pub use constants::{API_KEY_HEADER, API_SECRET_KEY_HEADER, SECRET_ENV_PREFIX};
pub use types::{DeployKey, DeployStage, DeploymentSummary, EmptyDeployKey};
