//! Deployment strategies.
//!
//! A strategy decides which deploy key the next pipeline run targets.
//! It is resolved once at startup from the configured name.

use cavemark_protocol::DeployKey;
use cavemark_protocol::constants::{BLUE_SLOT, GREEN_SLOT};

use crate::error::DeployError;
use crate::remote::DeployRemote;

/// How the deploy key of each run is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Alternate between the `blue` and `green` slots.
    RotatingSlot,
    /// Always deploy to the given key.
    ExplicitKey(DeployKey),
}

impl Strategy {
    /// Resolves a strategy by name (`bluegreen` or `manual`).
    ///
    /// `manual` requires a non-empty `manual_key`; the key is ignored for
    /// `bluegreen`.
    pub fn resolve(name: &str, manual_key: Option<&str>) -> Result<Self, DeployError> {
        match name {
            "bluegreen" => Ok(Strategy::RotatingSlot),
            "manual" => {
                let key = manual_key.unwrap_or_default();
                DeployKey::new(key)
                    .map(Strategy::ExplicitKey)
                    .map_err(|_| DeployError::MissingDeployKey)
            }
            other => Err(DeployError::UnsupportedStrategy(other.to_string())),
        }
    }

    /// The name this strategy was resolved from.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::RotatingSlot => "bluegreen",
            Strategy::ExplicitKey(_) => "manual",
        }
    }

    /// Picks the key for the next run.
    ///
    /// Only the rotating strategy talks to the remote.
    pub async fn next_key(&self, remote: &dyn DeployRemote) -> Result<DeployKey, DeployError> {
        match self {
            Strategy::ExplicitKey(key) => Ok(key.clone()),
            Strategy::RotatingSlot => {
                let active = remote.active_key().await?;
                let next = rotate(&active);
                tracing::debug!(active = %active, next = %next, "rotated deploy slot");
                Ok(next)
            }
        }
    }
}

/// The slot to deploy to when `active` is live.
///
/// `blue` rotates to `green`; anything else, including an empty or
/// unknown key, rotates to `blue`.
pub fn rotate(active: &str) -> DeployKey {
    let next = if active == BLUE_SLOT { GREEN_SLOT } else { BLUE_SLOT };
    DeployKey::new(next).unwrap_or_else(|_| unreachable!("slot names are not empty"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteFuture;
    use crate::types::Upload;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ActiveKeyRemote {
        active: String,
        calls: AtomicUsize,
    }

    impl ActiveKeyRemote {
        fn new(active: &str) -> Self {
            Self {
                active: active.into(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl DeployRemote for ActiveKeyRemote {
        fn active_key(&self) -> RemoteFuture<'_, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(self.active.clone()) })
        }

        fn begin<'a>(&'a self, _key: &'a DeployKey) -> RemoteFuture<'a, ()> {
            Box::pin(async { unreachable!("strategy must not begin deployments") })
        }

        fn upload<'a>(&'a self, _key: &'a DeployKey, _upload: Upload) -> RemoteFuture<'a, ()> {
            Box::pin(async { unreachable!("strategy must not upload") })
        }

        fn activate<'a>(&'a self, _key: &'a DeployKey) -> RemoteFuture<'a, ()> {
            Box::pin(async { unreachable!("strategy must not activate") })
        }
    }

    #[test]
    fn resolve_unknown_strategy() {
        for name in ["", "canary", "BlueGreen", "manual "] {
            match Strategy::resolve(name, Some("k")) {
                Err(DeployError::UnsupportedStrategy(got)) => assert_eq!(got, name),
                other => panic!("expected unsupported strategy for {name:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unsupported_strategy_message_names_it() {
        let err = Strategy::resolve("canary", None).unwrap_err();
        assert_eq!(err.to_string(), "strategy (canary) not supported");
    }

    #[test]
    fn resolve_manual_requires_key() {
        assert!(matches!(
            Strategy::resolve("manual", None),
            Err(DeployError::MissingDeployKey)
        ));
        assert!(matches!(
            Strategy::resolve("manual", Some("")),
            Err(DeployError::MissingDeployKey)
        ));
    }

    #[test]
    fn resolve_known_strategies() {
        assert_eq!(Strategy::resolve("bluegreen", None).unwrap(), Strategy::RotatingSlot);
        assert_eq!(
            Strategy::resolve("manual", Some("staging")).unwrap(),
            Strategy::ExplicitKey(DeployKey::new("staging").unwrap())
        );
        assert_eq!(Strategy::RotatingSlot.name(), "bluegreen");
    }

    #[test]
    fn rotate_alternates_slots() {
        assert_eq!(rotate("blue").as_str(), "green");
        assert_eq!(rotate("green").as_str(), "blue");
        assert_eq!(rotate("").as_str(), "blue");
        assert_eq!(rotate("staging").as_str(), "blue");
        assert_eq!(rotate("BLUE").as_str(), "blue");
    }

    #[tokio::test]
    async fn rotating_slot_queries_remote() {
        let remote = ActiveKeyRemote::new("blue");
        let key = Strategy::RotatingSlot.next_key(&remote).await.unwrap();
        assert_eq!(key.as_str(), "green");
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);

        let remote = ActiveKeyRemote::new("green");
        let key = Strategy::RotatingSlot.next_key(&remote).await.unwrap();
        assert_eq!(key.as_str(), "blue");
    }

    #[tokio::test]
    async fn explicit_key_skips_remote() {
        let remote = ActiveKeyRemote::new("blue");
        let strategy = Strategy::resolve("manual", Some("example")).unwrap();
        let key = strategy.next_key(&remote).await.unwrap();
        assert_eq!(key.as_str(), "example");
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }
}
