/// Execution platform the bundle targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Browser,
    #[default]
    Node,
    Neutral,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Browser => "browser",
            Platform::Node => "node",
            Platform::Neutral => "neutral",
        }
    }
}

/// Build settings handed to a [`crate::Bundler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    /// Inline all transitive imports into one output.
    pub bundle: bool,
    pub minify_syntax: bool,
    pub minify_whitespace: bool,
    /// Drop code that looks unused.
    pub tree_shaking: bool,
    pub platform: Platform,
    pub color: bool,
}

impl BundleOptions {
    /// Settings for a server-side function bundle.
    ///
    /// Tree shaking stays off: function entry points may be referenced
    /// dynamically by the runtime, so nothing may be dropped.
    pub fn server_function() -> Self {
        Self {
            bundle: true,
            minify_syntax: true,
            minify_whitespace: true,
            tree_shaking: false,
            platform: Platform::Node,
            color: false,
        }
    }
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self::server_function()
    }
}
