use std::path::PathBuf;

/// Errors raised while setting up the watch subscription.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("failed to start file watcher: {0}")]
    Backend(#[source] notify::Error),

    #[error("failed to watch ({}): {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("error reading ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
