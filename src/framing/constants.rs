//! Wire constants for response framing.

/// Status-line prefix that marks a response as a trackable file transfer.
pub const SUCCESS_MARKER: &str = "HTTP/1.1 200 OK";

/// Header name carrying the body length (exact, case-sensitive).
pub const CONTENT_LENGTH_MARKER: &str = "Content-Length";

/// Separator between a header name and its value.
pub const HEADER_SEPARATOR: char = ':';

/// Longest line buffered before it is flushed without a terminator (64 KiB).
pub const MAX_LINE_LEN: usize = 64 * 1024;
