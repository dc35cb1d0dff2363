/// Header carrying the API key on every authenticated request.
pub const API_KEY_HEADER: &str = "api_key";

/// Header carrying the API secret key on every authenticated request.
pub const API_SECRET_KEY_HEADER: &str = "api_secret_key";

/// Environment variables starting with this marker are deployed as secrets,
/// with the marker stripped from the uploaded name.
pub const SECRET_ENV_PREFIX: &str = "CAVEMARK_SECRET_";

/// Slot name used by the blue/green rotation.
pub const BLUE_SLOT: &str = "blue";

/// Alternate slot name used by the blue/green rotation.
pub const GREEN_SLOT: &str = "green";

/// Default Cavemark instance.
pub const DEFAULT_URL: &str = "https://deploy.cavemark.com";

/// Content type sent with secrets, function bundles and control requests.
pub const TEXT_PLAIN: &str = "text/plain";

/// Entry point looked up inside the function directory.
pub const FUNCTION_ENTRY: &str = "index.js";
