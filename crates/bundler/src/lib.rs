//! Bundler capability for Cavemark functions.
//!
//! The deploy pipeline only needs "entry file in, one JavaScript buffer
//! out". [`Bundler`] is that seam; [`EsbuildBundler`] implements it by
//! running the `esbuild` executable.

pub mod error;
pub mod esbuild;
pub mod options;

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

pub use error::{BundleError, Diagnostic};
pub use esbuild::EsbuildBundler;
pub use options::{BundleOptions, Platform};

/// Future returned by [`Bundler::bundle`].
pub type BundleFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, BundleError>> + Send + 'a>>;

/// Turns an entry file and its transitive imports into a single output.
pub trait Bundler: Send + Sync {
    /// Bundles `entry`. On failure every diagnostic is returned and no
    /// bytes are produced.
    fn bundle<'a>(&'a self, entry: &'a Path, options: &'a BundleOptions) -> BundleFuture<'a>;
}
