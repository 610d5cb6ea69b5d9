//! TCP transport: connection setup and failure classification.

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{Connection, DEFAULT_CONNECT_TIMEOUT_SECS, connect};
