//! Linefetch Core Library
//!
//! This library provides the core of the linefetch client: a line-based TCP
//! client that sends textual requests and streams an announced file body from
//! an HTTP/1.1-flavored response straight to disk.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`feed`] - Pull-based byte source over the raw transport
//! - [`framing`] - Incremental header/body framing of the response stream
//! - [`download`] - File sink that persists body bytes and tracks progress
//! - [`request`] - Outgoing request encoding and download target detection
//! - [`session`] - Per-cycle state machine, observer events, and drivers
//! - [`transport`] - TCP connection setup and transport errors

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod feed;
pub mod framing;
pub mod request;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use download::{DownloadError, DownloadSink, DownloadTarget, Progress};
pub use feed::{ByteFeed, ReaderFeed};
pub use framing::{FramingState, ResponseFramer};
pub use request::{ExtensionHeuristic, RequestBuilder, RequestError, TargetPolicy, Terminator};
pub use session::{
    Observer, SessionConfig, SessionController, SessionError, SessionEvent, SessionState, pump,
    run_session,
};
pub use transport::{Connection, TransportError, connect};
