use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Returned when constructing a [`DeployKey`] from an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deploy key must not be empty")]
pub struct EmptyDeployKey;

/// Opaque identifier naming a deployment slot.
///
/// Never empty. Only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeployKey(String);

impl DeployKey {
    /// Creates a key, rejecting the empty string.
    pub fn new(key: impl Into<String>) -> Result<Self, EmptyDeployKey> {
        let key = key.into();
        if key.is_empty() {
            return Err(EmptyDeployKey);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeployKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DeployKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DeployKey::new(raw).map_err(serde::de::Error::custom)
    }
}

/// One ordered network operation of the deployment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeployStage {
    Begin,
    Secrets,
    Function,
    Resources,
    Statics,
    Activate,
}

impl DeployStage {
    /// All stages in execution order.
    pub const ALL: [DeployStage; 6] = [
        DeployStage::Begin,
        DeployStage::Secrets,
        DeployStage::Function,
        DeployStage::Resources,
        DeployStage::Statics,
        DeployStage::Activate,
    ];

    /// Lowercase stage name, as shown in console output.
    pub fn name(self) -> &'static str {
        match self {
            DeployStage::Begin => "begin",
            DeployStage::Secrets => "secrets",
            DeployStage::Function => "functions",
            DeployStage::Resources => "resources",
            DeployStage::Statics => "statics",
            DeployStage::Activate => "activate",
        }
    }
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A deployment known to the remote instance, as listed by `/deploy/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSummary {
    pub deploy_key: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub active: bool,
}

impl DeploymentSummary {
    /// Sorts summaries newest first.
    pub fn sort_newest_first(list: &mut [DeploymentSummary]) {
        list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_key_rejects_empty() {
        assert_eq!(DeployKey::new(""), Err(EmptyDeployKey));
        assert_eq!(DeployKey::new("blue").unwrap().as_str(), "blue");
    }

    #[test]
    fn deploy_key_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<DeployKey>("\"\"").is_err());
        let key: DeployKey = serde_json::from_str("\"green\"").unwrap();
        assert_eq!(key.to_string(), "green");
    }

    #[test]
    fn stages_are_ordered() {
        let mut sorted = DeployStage::ALL;
        sorted.sort();
        assert_eq!(sorted, DeployStage::ALL);
        assert_eq!(DeployStage::ALL[0], DeployStage::Begin);
        assert_eq!(DeployStage::ALL[5], DeployStage::Activate);
    }

    #[test]
    fn deployment_summary_field_names() {
        let json = r#"[
            {"deployKey":"blue","timestamp":"2024-03-01T10:00:00Z","active":false},
            {"deployKey":"green","timestamp":"2024-03-02T10:00:00Z","active":true}
        ]"#;
        let list: Vec<DeploymentSummary> = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].deploy_key, "green");
        assert!(list[1].active);
    }

    #[test]
    fn deployment_summary_sort_newest_first() {
        let json = r#"[
            {"deployKey":"old","timestamp":"2024-01-01T00:00:00Z"},
            {"deployKey":"new","timestamp":"2024-06-01T00:00:00Z"},
            {"deployKey":"mid","timestamp":"2024-03-01T00:00:00+02:00"}
        ]"#;
        let mut list: Vec<DeploymentSummary> = serde_json::from_str(json).unwrap();
        DeploymentSummary::sort_newest_first(&mut list);
        let keys: Vec<&str> = list.iter().map(|d| d.deploy_key.as_str()).collect();
        assert_eq!(keys, vec!["new", "mid", "old"]);
        assert!(!list[0].active);
    }
}
