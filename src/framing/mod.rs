//! Incremental framing of the response byte stream.
//!
//! The framer turns chunks of arbitrary size into logical lines until the
//! empty line that ends a successful header block, then hands every
//! remaining byte over as body. Nothing here assumes a chunk lines up with a
//! line or record boundary.
//!
//! # Example
//!
//! ```
//! use linefetch_core::framing::ResponseFramer;
//!
//! let mut framer = ResponseFramer::new();
//! let first = framer.feed(b"HTTP/1.1 200 OK\r\nContent-Le");
//! assert_eq!(first.lines.len(), 1);
//! assert!(first.body.is_none());
//!
//! let second = framer.feed(b"ngth: 4\r\n\r\n12");
//! assert_eq!(framer.declared_size(), 4);
//! assert_eq!(second.body, Some(&b"12"[..]));
//! ```

mod constants;
mod framer;
mod lines;

pub use constants::{CONTENT_LENGTH_MARKER, HEADER_SEPARATOR, MAX_LINE_LEN, SUCCESS_MARKER};
pub use framer::{FeedOutcome, FramingState, ResponseFramer, is_blank_line, parse_content_length};
pub use lines::LineBuffer;
