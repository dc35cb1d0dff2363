//! Secret discovery from environment entries.

use cavemark_protocol::SECRET_ENV_PREFIX;

/// A secret to deploy, keyed by its name with the marker stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSecret {
    pub key: String,
    pub value: String,
}

/// Secrets among `vars`, using the standard `CAVEMARK_SECRET_` marker.
pub fn env_secrets<I, K, V>(vars: I) -> Vec<EnvSecret>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    secrets_with_prefix(vars, SECRET_ENV_PREFIX)
}

/// Secrets among `vars` whose name starts with `prefix`.
///
/// The prefix is stripped from the deployed key. A variable named exactly
/// `prefix` has no key left and is skipped.
pub fn secrets_with_prefix<I, K, V>(vars: I, prefix: &str) -> Vec<EnvSecret>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    vars.into_iter()
        .filter_map(|(name, value)| {
            let key = name.as_ref().strip_prefix(prefix)?;
            if key.is_empty() {
                return None;
            }
            Some(EnvSecret {
                key: key.to_string(),
                value: value.into(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix_and_ignores_others() {
        let vars = vec![("PREFIX_FOO", "bar"), ("OTHER", "baz")];
        let secrets = secrets_with_prefix(vars, "PREFIX_");
        assert_eq!(
            secrets,
            vec![EnvSecret {
                key: "FOO".into(),
                value: "bar".into()
            }]
        );
    }

    #[test]
    fn default_marker() {
        let vars = vec![
            ("CAVEMARK_SECRET_PG_CONNECTION".to_string(), "postgres://db".to_string()),
            ("CAVEMARK_URL".to_string(), "https://example.com".to_string()),
            ("HOME".to_string(), "/home/dev".to_string()),
        ];
        let secrets = env_secrets(vars);
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].key, "PG_CONNECTION");
        assert_eq!(secrets[0].value, "postgres://db");
    }

    #[test]
    fn prefix_must_lead_the_name() {
        let secrets = secrets_with_prefix(vec![("MY_PREFIX_FOO", "x")], "PREFIX_");
        assert!(secrets.is_empty());
    }

    #[test]
    fn bare_prefix_is_skipped() {
        let secrets = secrets_with_prefix(vec![("PREFIX_", "x"), ("PREFIX_A", "")], "PREFIX_");
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].key, "A");
        assert_eq!(secrets[0].value, "");
    }
}
