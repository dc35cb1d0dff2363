//! Bundler error types.

use std::fmt;

/// One message reported by the bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub text: String,
    /// `file:line:column`, when the bundler reported one.
    pub location: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{loc}: {}", self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// Errors produced while bundling.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("error while bundling: {}", join(.0))]
    Diagnostics(Vec<Diagnostic>),

    #[error("failed to run bundler ({program}): {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bundler produced no output")]
    NoOutput,
}

fn join(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
