use std::fmt::Display;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::WatchError;

/// What the `notify` backend delivers for each change.
pub type EventResult = notify::Result<notify::Event>;

/// Filesystem subscription over a set of directory trees.
pub struct Watcher {
    backend: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<EventResult>,
    watched: Vec<PathBuf>,
}

impl Watcher {
    /// Watches every directory below each of `roots`, roots included.
    ///
    /// Roots that do not exist are skipped with a warning. Directories
    /// created later are not picked up.
    pub fn new<I, P>(roots: I) -> Result<Self, WatchError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut backend = notify::recommended_watcher(move |res: EventResult| {
            let _ = tx.send(res);
        })
        .map_err(WatchError::Backend)?;

        let mut watched = Vec::new();
        for root in roots {
            let root = root.as_ref();
            match std::fs::metadata(root) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    warn!(path = %root.display(), "not a directory, not watching");
                    continue;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!(path = %root.display(), "directory does not exist, not watching");
                    continue;
                }
                Err(source) => {
                    return Err(WatchError::Io {
                        path: root.to_path_buf(),
                        source,
                    });
                }
            }

            for dir in directories(root)? {
                backend
                    .watch(&dir, RecursiveMode::NonRecursive)
                    .map_err(|source| WatchError::Watch {
                        path: dir.clone(),
                        source,
                    })?;
                watched.push(dir);
            }
        }

        info!(dirs = watched.len(), "watching for changes");
        Ok(Self {
            backend,
            events: rx,
            watched,
        })
    }

    /// Directories currently registered with the backend.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Calls `f` once per write event until `cancel` fires.
    ///
    /// Returns how many times `f` ran.
    pub async fn run<F, Fut, T, E>(self, cancel: CancellationToken, f: F) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let Self {
            backend, events, ..
        } = self;
        let runs = run_events(events, cancel, f).await;
        drop(backend);
        runs
    }
}

/// Whether `kind` is a content write, the only change that redeploys.
pub fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}

/// The event loop behind [`Watcher::run`], over any event source.
///
/// Cancellation is checked before each delivery; a run in progress is
/// always awaited to completion. Errors from `f` and from the backend are
/// logged and the loop keeps going. It also ends when the sender side of
/// `events` is dropped.
pub async fn run_events<F, Fut, T, E>(
    mut events: mpsc::UnboundedReceiver<EventResult>,
    cancel: CancellationToken,
    mut f: F,
) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut runs = 0;
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("watch loop cancelled");
                break;
            }
            event = events.recv() => event,
        };
        let Some(event) = event else {
            debug!("watch event channel closed");
            break;
        };

        match event {
            Ok(event) if is_write(&event.kind) => {
                info!(paths = ?event.paths, "change detected, redeploying");
                runs += 1;
                if let Err(e) = f().await {
                    error!(error = %e, "redeploy failed");
                }
            }
            Ok(event) => debug!(kind = ?event.kind, paths = ?event.paths, "ignoring event"),
            Err(e) => warn!(error = %e, "watch error"),
        }
    }
    runs
}

/// `root` and every directory below it, depth-first.
fn directories(root: &Path) -> Result<Vec<PathBuf>, WatchError> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|source| WatchError::Io {
            path: dir.clone(),
            source,
        })?;
        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| WatchError::Io {
                path: dir.clone(),
                source,
            })?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                children.push(entry.path());
            }
        }
        children.sort();
        pending.extend(children.into_iter().rev());
        found.push(dir);
    }

    Ok(found)
}
