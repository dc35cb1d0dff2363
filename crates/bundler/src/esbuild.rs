//! [`Bundler`] backed by the `esbuild` executable.
//!
//! The bundle is written to stdout. Diagnostics are read back from
//! stderr in esbuild's plain-text log format.

use std::path::Path;

use crate::error::{BundleError, Diagnostic};
use crate::options::BundleOptions;
use crate::{BundleFuture, Bundler};

const ERROR_MARKERS: &[&str] = &["✘ [ERROR] ", "X [ERROR] ", "error: "];

/// Runs esbuild as a child process.
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
    program: String,
    prefix_args: Vec<String>,
}

impl Default for EsbuildBundler {
    fn default() -> Self {
        Self::new()
    }
}

impl EsbuildBundler {
    /// Uses `esbuild` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: "esbuild".into(),
            prefix_args: Vec::new(),
        }
    }

    /// Parses a command line such as `npx esbuild` or
    /// `/opt/node/bin/esbuild`. Returns `None` for a blank command.
    pub fn from_command(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            prefix_args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn args(&self, entry: &Path, options: &BundleOptions) -> Vec<String> {
        let mut args = self.prefix_args.clone();
        args.push(entry.to_string_lossy().into_owned());
        if options.bundle {
            args.push("--bundle".into());
        }
        if options.minify_syntax {
            args.push("--minify-syntax".into());
        }
        if options.minify_whitespace {
            args.push("--minify-whitespace".into());
        }
        args.push(format!("--tree-shaking={}", options.tree_shaking));
        args.push(format!("--platform={}", options.platform.as_str()));
        args.push(format!("--color={}", options.color));
        args.push("--log-level=error".into());
        args
    }

    async fn run(&self, entry: &Path, options: &BundleOptions) -> Result<Vec<u8>, BundleError> {
        let args = self.args(entry, options);
        tracing::debug!(program = %self.program, ?args, "running bundler");

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| BundleError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let mut diagnostics = parse_diagnostics(&stderr);
            if diagnostics.is_empty() {
                diagnostics.push(Diagnostic {
                    text: fallback_message(&stderr, output.status.code()),
                    location: None,
                });
            }
            return Err(BundleError::Diagnostics(diagnostics));
        }

        if output.stdout.is_empty() {
            return Err(BundleError::NoOutput);
        }
        Ok(output.stdout)
    }
}

impl Bundler for EsbuildBundler {
    fn bundle<'a>(&'a self, entry: &'a Path, options: &'a BundleOptions) -> BundleFuture<'a> {
        Box::pin(self.run(entry, options))
    }
}

/// Extracts error diagnostics from esbuild's stderr.
///
/// Each error starts with an `[ERROR]` line; the first following line of
/// the form `file:line:col:` is taken as its location.
pub fn parse_diagnostics(stderr: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for line in stderr.lines() {
        let trimmed = line.trim();
        if let Some(text) = ERROR_MARKERS.iter().find_map(|m| trimmed.strip_prefix(m)) {
            diagnostics.push(Diagnostic {
                text: text.trim().to_string(),
                location: None,
            });
            continue;
        }

        if let Some(last) = diagnostics.last_mut() {
            if last.location.is_none() && is_location(trimmed) {
                last.location = Some(trimmed.trim_end_matches(':').to_string());
            }
        }
    }

    diagnostics
}

fn is_location(line: &str) -> bool {
    let Some(body) = line.strip_suffix(':') else {
        return false;
    };
    let mut parts = body.rsplitn(3, ':');
    let col = parts.next().unwrap_or_default();
    let row = parts.next().unwrap_or_default();
    let file = parts.next().unwrap_or_default();
    !file.is_empty()
        && !row.is_empty()
        && !col.is_empty()
        && row.chars().all(|c| c.is_ascii_digit())
        && col.chars().all(|c| c.is_ascii_digit())
}

fn fallback_message(stderr: &str, code: Option<i32>) -> String {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    match code {
        Some(code) => format!("bundler exited with status {code}"),
        None => "bundler terminated by signal".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESBUILD_STDERR: &str = "✘ [ERROR] Could not resolve \"pg\"

    src/index.js:3:19:
      3 │ import { Pool } from \"pg\";
        ╵                      ~~~~

  You can mark the path \"pg\" as external to exclude it from the bundle.

✘ [ERROR] Expected \";\" but found \"}\"

    src/util.js:10:0:
      10 │ }
         ╵ ^

2 errors
";

    #[test]
    fn parse_esbuild_errors() {
        let diagnostics = parse_diagnostics(ESBUILD_STDERR);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].text, "Could not resolve \"pg\"");
        assert_eq!(diagnostics[0].location.as_deref(), Some("src/index.js:3:19"));
        assert_eq!(diagnostics[1].text, "Expected \";\" but found \"}\"");
        assert_eq!(diagnostics[1].location.as_deref(), Some("src/util.js:10:0"));
    }

    #[test]
    fn parse_plain_error_lines() {
        let diagnostics = parse_diagnostics("error: Cannot read file \"src/index.js\"\n");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].location.is_none());
    }

    #[test]
    fn parse_ignores_noise() {
        assert!(parse_diagnostics("").is_empty());
        assert!(parse_diagnostics("  dist/out.js  1.2kb\n").is_empty());
    }

    #[test]
    fn args_follow_options() {
        let bundler = EsbuildBundler::from_command("npx esbuild").unwrap();
        assert_eq!(bundler.program(), "npx");
        let args = bundler.args(Path::new("src/index.js"), &BundleOptions::server_function());
        assert_eq!(
            args,
            vec![
                "esbuild",
                "src/index.js",
                "--bundle",
                "--minify-syntax",
                "--minify-whitespace",
                "--tree-shaking=false",
                "--platform=node",
                "--color=false",
                "--log-level=error",
            ]
        );
    }

    #[test]
    fn from_command_blank() {
        assert!(EsbuildBundler::from_command("   ").is_none());
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let bundler = EsbuildBundler::from_command("cavemark-no-such-esbuild-binary").unwrap();
        let err = bundler
            .bundle(Path::new("index.js"), &BundleOptions::server_function())
            .await
            .unwrap_err();
        assert!(matches!(err, BundleError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_is_the_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-esbuild.sh");
        std::fs::write(&script, "printf 'bundle-of:%s' \"$1\"\n").unwrap();

        let bundler = EsbuildBundler::from_command(&format!("sh {}", script.display())).unwrap();
        let out = bundler
            .bundle(Path::new("src/index.js"), &BundleOptions::server_function())
            .await
            .unwrap();
        assert_eq!(out, b"bundle-of:src/index.js");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_bundler_surfaces_all_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-esbuild.sh");
        std::fs::write(
            &script,
            "echo '✘ [ERROR] first' >&2\necho '✘ [ERROR] second' >&2\nexit 1\n",
        )
        .unwrap();

        let bundler = EsbuildBundler::from_command(&format!("sh {}", script.display())).unwrap();
        let err = bundler
            .bundle(Path::new("src/index.js"), &BundleOptions::server_function())
            .await
            .unwrap_err();
        match err {
            BundleError::Diagnostics(d) => {
                let texts: Vec<&str> = d.iter().map(|d| d.text.as_str()).collect();
                assert_eq!(texts, vec!["first", "second"]);
            }
            other => panic!("expected diagnostics, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_bundler_without_parsable_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-esbuild.sh");
        std::fs::write(&script, "exit 3\n").unwrap();

        let bundler = EsbuildBundler::from_command(&format!("sh {}", script.display())).unwrap();
        let err = bundler
            .bundle(Path::new("src/index.js"), &BundleOptions::server_function())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("status 3"), "{err}");
    }
}
