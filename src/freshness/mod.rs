//! Freshness detection for incremental documentation builds.
//!
//! An incremental build renders only sources modified at or after the start
//! of the same operation's previous successful run, less [`MTIME_GRANULE`].

mod last_run;
pub mod mtime;

pub use last_run::{LastRun, MTIME_GRANULE};
pub use mtime::{get_mtime, modified_since};
