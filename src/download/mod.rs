//! File sink for response bodies.
//!
//! This module owns the destination file of a download cycle: it persists
//! body bytes in arrival order, tracks how many were written against the
//! declared length, and reports progress and completion.
//!
//! # Features
//!
//! - Lazy file creation (no file exists until a body actually starts)
//! - Writes capped at the declared length, so nothing lands after completion
//! - Progress percentages guarded against an unknown length
//! - Idempotent reset and partial-file removal on abort
//!
//! # Example
//!
//! ```no_run
//! use linefetch_core::download::DownloadSink;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sink = DownloadSink::new("./downloads");
//! sink.open("report.pdf")?;
//! sink.set_declared_size(4);
//! sink.write(b"1234")?;
//! assert!(sink.is_complete());
//! sink.reset();
//! # Ok(())
//! # }
//! ```

mod error;
mod progress;
mod sink;

pub use error::DownloadError;
pub use progress::Progress;
pub use sink::{DownloadSink, DownloadTarget};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
