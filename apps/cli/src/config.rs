//! Settings resolution.
//!
//! Each setting is taken from the first non-empty source among: the
//! command-line flag, the process environment, the `.env` file in the
//! working directory, the built-in default. The environment is read once
//! into an [`Env`] snapshot; nothing here touches process state later.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cavemark_deploy::{DeployConfig, EnvSecret, SourceDir, env_secrets};
use cavemark_protocol::constants::DEFAULT_URL;
use cavemark_transport::Credentials;

use crate::cli::{DeployArgs, GlobalArgs};

pub const URL_VAR: &str = "CAVEMARK_URL";
pub const API_KEY_VAR: &str = "CAVEMARK_API_KEY";
pub const API_SECRET_KEY_VAR: &str = "CAVEMARK_API_SECRET_KEY";
pub const FUNC_DIR_VAR: &str = "CAVEMARK_FUNC_DIR";
pub const RESOURCE_DIR_VAR: &str = "CAVEMARK_RESOURCE_DIR";
pub const STATIC_DIR_VAR: &str = "CAVEMARK_STATIC_DIR";
pub const STRATEGY_VAR: &str = "CAVEMARK_STRATEGY";
pub const ESBUILD_VAR: &str = "CAVEMARK_ESBUILD";

const DEFAULT_FUNC_DIR: &str = "src";
const DEFAULT_RESOURCE_DIR: &str = "resource";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_STRATEGY: &str = "bluegreen";

/// Snapshot of the process environment and the `.env` file.
#[derive(Debug, Default, Clone)]
pub struct Env {
    process: HashMap<String, String>,
    dotenv: HashMap<String, String>,
}

impl Env {
    pub fn new(process: HashMap<String, String>, dotenv: HashMap<String, String>) -> Self {
        Self { process, dotenv }
    }

    /// Reads the process environment and `<dir>/.env`.
    pub fn load(dir: &Path) -> Self {
        Self::new(
            unicode_vars(std::env::vars_os()),
            load_dotenv(&dir.join(".env")),
        )
    }

    /// Value of `name`, process environment first. Empty values count as
    /// unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        [&self.process, &self.dotenv]
            .into_iter()
            .filter_map(|vars| vars.get(name))
            .map(String::as_str)
            .find(|v| !v.is_empty())
    }

    /// Secrets from both sources, the process environment winning on
    /// conflicts. Sorted by key.
    pub fn secrets(&self) -> Vec<EnvSecret> {
        let mut merged = self.dotenv.clone();
        merged.extend(self.process.iter().map(|(k, v)| (k.clone(), v.clone())));
        let mut secrets = env_secrets(merged);
        secrets.sort_by(|a, b| a.key.cmp(&b.key));
        secrets
    }
}

/// Base URL and credentials for the selected instance.
pub fn connection(global: &GlobalArgs, env: &Env) -> (String, Credentials) {
    let url = pick(global.url.as_deref(), env, URL_VAR).unwrap_or(DEFAULT_URL);
    let credentials = Credentials {
        api_key: pick(global.api_key.as_deref(), env, API_KEY_VAR).map(str::to_string),
        api_secret_key: pick(global.api_secret_key.as_deref(), env, API_SECRET_KEY_VAR)
            .map(str::to_string),
    };
    (url.trim_end_matches('/').to_string(), credentials)
}

/// Everything the `deploy` command needs.
pub fn deploy_config(global: &GlobalArgs, args: &DeployArgs, env: &Env) -> DeployConfig {
    let (url, credentials) = connection(global, env);
    let func_dir = pick_path(args.func_dir.as_deref(), env, FUNC_DIR_VAR)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FUNC_DIR));

    DeployConfig {
        url,
        credentials,
        func_dir,
        resource_dir: Some(source_dir(
            args.resource_dir.as_deref(),
            env,
            RESOURCE_DIR_VAR,
            DEFAULT_RESOURCE_DIR,
        )),
        static_dir: Some(source_dir(
            args.static_dir.as_deref(),
            env,
            STATIC_DIR_VAR,
            DEFAULT_STATIC_DIR,
        )),
        secrets: env.secrets(),
    }
}

pub fn strategy_name(args: &DeployArgs, env: &Env) -> String {
    pick(args.strategy.as_deref(), env, STRATEGY_VAR)
        .unwrap_or(DEFAULT_STRATEGY)
        .to_string()
}

/// Custom esbuild command line, if one was given.
pub fn esbuild_command<'a>(args: &'a DeployArgs, env: &'a Env) -> Option<&'a str> {
    pick(args.esbuild.as_deref(), env, ESBUILD_VAR)
}

fn pick<'a>(flag: Option<&'a str>, env: &'a Env, var: &str) -> Option<&'a str> {
    flag.filter(|v| !v.is_empty()).or_else(|| env.get(var))
}

/// Like [`pick`], but a path flag is kept as given, UTF-8 or not.
fn pick_path(flag: Option<&Path>, env: &Env, var: &str) -> Option<PathBuf> {
    flag.filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| env.get(var).map(PathBuf::from))
}

/// A directory is only allowed to be missing when nobody asked for it.
fn source_dir(flag: Option<&Path>, env: &Env, var: &str, default: &str) -> SourceDir {
    match pick_path(flag, env, var) {
        Some(path) => SourceDir::explicit(path),
        None => SourceDir::default_at(default),
    }
}

/// Keeps the variables whose name and value are both valid Unicode.
fn unicode_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.into_iter()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (name, _) => {
                tracing::debug!(name = ?name, "skipping non-UTF-8 environment variable");
                None
            }
        })
        .collect()
}

/// Reads a `.env` file. A missing file yields no variables; an unreadable
/// one is reported and ignored.
pub fn load_dotenv(path: &Path) -> HashMap<String, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_dotenv(&contents).into_iter().collect(),
        Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read .env file");
            HashMap::new()
        }
    }
}

/// Parses `KEY=value` lines.
///
/// Blank lines and `#` comments are skipped, a leading `export ` is
/// allowed, and one pair of matching single or double quotes around the
/// value is removed. Later assignments win.
pub fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut vars = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=').unwrap_or((line, ""));
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        vars.push((key.to_string(), unquote(value.trim()).to_string()));
    }
    vars
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavemark_deploy::DirOrigin;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_dotenv_lines() {
        let parsed = parse_dotenv(
            "# comment\n\nCAVEMARK_URL=https://example.com\nexport CAVEMARK_API_KEY = \"abc\"\nQUOTED='x y'\nEMPTY=\n=novalue\nBARE\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("CAVEMARK_URL".to_string(), "https://example.com".to_string()),
                ("CAVEMARK_API_KEY".to_string(), "abc".to_string()),
                ("QUOTED".to_string(), "x y".to_string()),
                ("EMPTY".to_string(), String::new()),
                ("BARE".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn parse_dotenv_keeps_inner_equals_and_odd_quotes() {
        let parsed = parse_dotenv("PG=postgres://u:p@h/db?sslmode=require\nQ=\"half\n");
        assert_eq!(parsed[0].1, "postgres://u:p@h/db?sslmode=require");
        assert_eq!(parsed[1].1, "\"half");
    }

    #[test]
    fn load_dotenv_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dotenv(&dir.path().join(".env")).is_empty());
    }

    #[test]
    fn load_dotenv_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "CAVEMARK_STRATEGY=manual\n").unwrap();
        let env = Env::load(dir.path());
        assert_eq!(env.dotenv.get("CAVEMARK_STRATEGY").map(String::as_str), Some("manual"));
    }

    #[test]
    fn precedence_flag_env_dotenv_default() {
        let env = Env::new(
            vars(&[(URL_VAR, "https://from-env")]),
            vars(&[(URL_VAR, "https://from-dotenv"), (API_KEY_VAR, "dotenv-key")]),
        );

        let flags = GlobalArgs {
            url: Some("https://from-flag".into()),
            ..Default::default()
        };
        assert_eq!(connection(&flags, &env).0, "https://from-flag");

        let (url, creds) = connection(&GlobalArgs::default(), &env);
        assert_eq!(url, "https://from-env");
        assert_eq!(creds.api_key.as_deref(), Some("dotenv-key"));
        assert_eq!(creds.api_secret_key, None);

        let env = Env::new(HashMap::new(), vars(&[(URL_VAR, "https://from-dotenv/")]));
        assert_eq!(connection(&GlobalArgs::default(), &env).0, "https://from-dotenv");

        assert_eq!(connection(&GlobalArgs::default(), &Env::default()).0, DEFAULT_URL);
    }

    #[test]
    fn empty_values_fall_through() {
        let env = Env::new(vars(&[(STRATEGY_VAR, "")]), vars(&[(STRATEGY_VAR, "manual")]));
        let args = DeployArgs {
            strategy: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(strategy_name(&args, &env), "manual");
        assert_eq!(strategy_name(&DeployArgs::default(), &Env::default()), "bluegreen");
    }

    #[test]
    fn directory_origin_tracks_source() {
        let env = Env::new(vars(&[(STATIC_DIR_VAR, "public")]), HashMap::new());
        let args = DeployArgs {
            resource_dir: Some(PathBuf::from("res")),
            ..Default::default()
        };
        let config = deploy_config(&GlobalArgs::default(), &args, &env);

        assert_eq!(config.func_dir, PathBuf::from("src"));
        assert_eq!(config.resource_dir, Some(SourceDir::explicit("res")));
        assert_eq!(config.static_dir, Some(SourceDir::explicit("public")));

        let config = deploy_config(&GlobalArgs::default(), &DeployArgs::default(), &Env::default());
        let resource = config.resource_dir.unwrap();
        assert_eq!(resource.origin, DirOrigin::Default);
        assert_eq!(resource.path, PathBuf::from("resource"));
        assert_eq!(config.static_dir.unwrap().origin, DirOrigin::Default);
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_variables_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let got = unicode_vars([
            (OsString::from(URL_VAR), OsString::from("https://example.com")),
            (OsString::from("BADVAR"), OsString::from_vec(vec![0xff])),
            (OsString::from_vec(vec![b'X', 0xfe]), OsString::from("ok")),
        ]);
        assert_eq!(got, vars(&[(URL_VAR, "https://example.com")]));
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_path_flag_is_kept() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = PathBuf::from(OsStr::from_bytes(b"res\xff"));
        let env = Env::new(vars(&[(RESOURCE_DIR_VAR, "from-env")]), HashMap::new());
        let args = DeployArgs {
            func_dir: Some(raw.clone()),
            resource_dir: Some(raw.clone()),
            ..Default::default()
        };
        let config = deploy_config(&GlobalArgs::default(), &args, &env);

        assert_eq!(config.func_dir, raw);
        assert_eq!(config.resource_dir, Some(SourceDir::explicit(raw)));
    }

    #[test]
    fn secrets_merge_both_sources() {
        let env = Env::new(
            vars(&[("CAVEMARK_SECRET_TOKEN", "process"), ("PATH", "/bin")]),
            vars(&[("CAVEMARK_SECRET_TOKEN", "dotenv"), ("CAVEMARK_SECRET_PG", "pg")]),
        );
        let secrets = env.secrets();
        assert_eq!(
            secrets,
            vec![
                EnvSecret {
                    key: "PG".into(),
                    value: "pg".into()
                },
                EnvSecret {
                    key: "TOKEN".into(),
                    value: "process".into()
                },
            ]
        );
    }

    #[test]
    fn esbuild_command_from_env() {
        let env = Env::new(HashMap::new(), vars(&[(ESBUILD_VAR, "npx esbuild")]));
        assert_eq!(esbuild_command(&DeployArgs::default(), &env), Some("npx esbuild"));
        assert_eq!(esbuild_command(&DeployArgs::default(), &Env::default()), None);
    }
}
