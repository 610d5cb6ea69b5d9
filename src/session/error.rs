//! Error types for the session module.

use thiserror::Error;

use crate::download::DownloadError;
use crate::request::RequestError;
use crate::transport::TransportError;

/// Errors surfaced by the session controller and drivers.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A request was submitted while a body is still streaming.
    #[error("busy: {filename} is still downloading")]
    Busy {
        /// File of the active download.
        filename: String,
    },

    /// The request line cannot be sent.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// No bytes arrived within the idle timeout during an active cycle.
    #[error("no data received for {idle_secs}s")]
    Stalled {
        /// The timeout that elapsed.
        idle_secs: u64,
    },

    /// Connection-level failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Local file failure.
    #[error(transparent)]
    Download(#[from] DownloadError),
}
