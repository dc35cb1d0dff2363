//! Asset collection for upload.
//!
//! Walks a resource or static directory, skips hidden entries and reads
//! every remaining file together with its sniffed content type and a
//! forward-slash path relative to the scanned root.

pub mod error;
pub mod scanner;
pub mod sniff;

pub use error::AssetError;
pub use scanner::{AssetFile, collect, has_assets};
pub use sniff::detect_content_type;
