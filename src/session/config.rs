//! Runtime settings of a session.

use std::path::PathBuf;
use std::time::Duration;

use crate::request::Terminator;

/// Default stall timeout while a download cycle is active (30 seconds).
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;

/// Settings shared by the controller and the drivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Directory downloaded files are written to.
    pub output_dir: PathBuf,
    /// Bytes appended to each outgoing request line.
    pub terminator: Terminator,
    /// Keep the partial file when a cycle aborts instead of removing it.
    pub keep_partial: bool,
    /// Abort an active cycle after this long without inbound bytes.
    pub idle_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            terminator: Terminator::None,
            keep_partial: false,
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }
}
