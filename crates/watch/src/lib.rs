//! Watch mode: re-run a deployment whenever a watched file is written.
//!
//! Every directory under the configured roots gets its own non-recursive
//! watch. Events flow from the `notify` backend thread into a tokio
//! channel and are handled one at a time, so a change arriving during a
//! run is processed after that run finishes.

pub mod error;
pub mod watcher;

pub use error::WatchError;
pub use watcher::{EventResult, Watcher, is_write, run_events};
