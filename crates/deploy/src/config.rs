//! Deploy configuration.
//!
//! Built once before the first deployment and never mutated afterwards.
//! Every component receives it by reference.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cavemark_protocol::constants::FUNCTION_ENTRY;
use cavemark_transport::Credentials;

use crate::error::DeployError;
use crate::secrets::EnvSecret;

/// Where a directory setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirOrigin {
    /// Built-in fallback location; allowed to be missing.
    Default,
    /// Set by the user; must exist.
    Explicit,
}

/// A resource or static directory setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDir {
    pub path: PathBuf,
    pub origin: DirOrigin,
}

impl SourceDir {
    pub fn default_at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            origin: DirOrigin::Default,
        }
    }

    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            origin: DirOrigin::Explicit,
        }
    }

    /// Returns the path when the directory exists, `None` when it is
    /// missing from its default location.
    ///
    /// A missing explicit directory is reported as `None` here too; the
    /// pipeline decides whether that is fatal.
    pub fn existing(&self) -> Result<Option<&Path>, DeployError> {
        match std::fs::symlink_metadata(&self.path) {
            Ok(_) => Ok(Some(&self.path)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(DeployError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Everything a deployment needs to know, resolved up front.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Base URL of the Cavemark instance.
    pub url: String,
    pub credentials: Credentials,
    /// Directory holding the function entry point (`index.js`).
    pub func_dir: PathBuf,
    pub resource_dir: Option<SourceDir>,
    pub static_dir: Option<SourceDir>,
    /// Snapshot of the secrets found in the environment.
    pub secrets: Vec<EnvSecret>,
}

impl DeployConfig {
    /// Path of the function entry point.
    pub fn entry_file(&self) -> PathBuf {
        self.func_dir.join(FUNCTION_ENTRY)
    }

    /// Whether the function entry point exists.
    pub fn function_entry_exists(&self) -> Result<bool, DeployError> {
        let entry = self.entry_file();
        match std::fs::symlink_metadata(&entry) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(DeployError::Io {
                path: entry,
                source,
            }),
        }
    }

    /// Whether the static directory exists and holds at least one file.
    pub fn static_files_exist(&self) -> Result<bool, DeployError> {
        let Some(dir) = &self.static_dir else {
            return Ok(false);
        };
        match dir.existing()? {
            Some(path) => Ok(cavemark_assets::has_assets(path)?),
            None => Ok(false),
        }
    }

    /// Checks everything that can be checked before touching the network.
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.url.is_empty() {
            return Err(DeployError::MissingUrl);
        }
        if is_blank(&self.credentials.api_key) {
            return Err(DeployError::MissingApiKey);
        }
        if is_blank(&self.credentials.api_secret_key) {
            return Err(DeployError::MissingApiSecretKey);
        }
        if !self.function_entry_exists()? && !self.static_files_exist()? {
            return Err(DeployError::NothingToDeploy);
        }
        Ok(())
    }

    /// Directories whose changes trigger a redeploy in watch mode.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots = vec![self.func_dir.clone()];
        roots.extend(self.resource_dir.iter().map(|d| d.path.clone()));
        roots.extend(self.static_dir.iter().map(|d| d.path.clone()));
        roots
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}
