//! Response framer: header scan, success detection, and body hand-off.

use tracing::{debug, trace};

use super::constants::{CONTENT_LENGTH_MARKER, HEADER_SEPARATOR, SUCCESS_MARKER};
use super::lines::LineBuffer;

/// Framing flags for the response currently being scanned.
///
/// Owned by [`ResponseFramer`]; other components only read it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramingState {
    header_complete: bool,
    saw_success_status_line: bool,
    status_line_seen: bool,
}

impl FramingState {
    /// True once the empty line ending a successful header block was seen.
    #[must_use]
    pub fn header_complete(&self) -> bool {
        self.header_complete
    }

    /// True between a success status line and the end of its header block.
    #[must_use]
    pub fn saw_success_status_line(&self) -> bool {
        self.saw_success_status_line
    }

    /// True once the first line of the current response was seen.
    #[must_use]
    pub fn status_line_seen(&self) -> bool {
        self.status_line_seen
    }

    /// True when the response opened with a non-success status line and is
    /// only displayed until the next restart.
    #[must_use]
    pub fn is_untracked(&self) -> bool {
        self.status_line_seen && !self.saw_success_status_line && !self.header_complete
    }
}

/// Result of feeding one chunk to the framer.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FeedOutcome<'a> {
    /// Header lines completed by this chunk, verbatim (terminators included).
    pub lines: Vec<String>,
    /// Bytes following the header block, once it is complete.
    pub body: Option<&'a [u8]>,
}

/// Stateful parser separating header lines from body bytes.
#[derive(Debug, Clone, Default)]
pub struct ResponseFramer {
    lines: LineBuffer,
    state: FramingState,
    declared_size: Option<u64>,
    continuation: bool,
}

impl ResponseFramer {
    /// Creates a framer waiting for a status line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current framing flags.
    #[must_use]
    pub fn state(&self) -> FramingState {
        self.state
    }

    /// Declared body length, or 0 when unknown.
    #[must_use]
    pub fn declared_size(&self) -> u64 {
        self.declared_size.unwrap_or(0)
    }

    /// Starts a new cycle: clears the framing flags and declared size.
    ///
    /// An unterminated partial line is kept, since it is still part of the
    /// inbound stream.
    pub fn restart(&mut self) {
        self.state = FramingState::default();
        self.declared_size = None;
    }

    /// Feeds one logical line (terminator included, or empty).
    ///
    /// The first line of a response decides whether it is tracked: anything
    /// but the success marker leaves the rest of the response untracked.
    pub fn feed_line(&mut self, line: &str) {
        if !self.state.status_line_seen {
            self.state.status_line_seen = true;
            if line.starts_with(SUCCESS_MARKER) {
                debug!(status = line.trim_end(), "success status line");
                self.state.saw_success_status_line = true;
            } else {
                debug!(status = line.trim_end(), "response not tracked");
            }
            return;
        }

        if !self.state.saw_success_status_line {
            trace!(line = line.trim_end(), "line outside a tracked response");
            return;
        }

        if self.declared_size.is_none()
            && let Some(size) = parse_content_length(line)
        {
            debug!(declared_size = size, "content length declared");
            self.declared_size = Some(size);
        }

        if is_blank_line(line) {
            debug!(declared_size = self.declared_size(), "header block complete");
            self.state.header_complete = true;
            self.state.saw_success_status_line = false;
        }
    }

    /// Feeds an arbitrary chunk.
    ///
    /// Complete lines are parsed and returned. Fragments of an overlong line
    /// after the first are displayed but never parsed. Once the header block
    /// ends, the rest of the chunk is returned as body and later chunks pass
    /// through untouched.
    pub fn feed<'a>(&mut self, chunk: &'a [u8]) -> FeedOutcome<'a> {
        if self.state.header_complete {
            return FeedOutcome {
                lines: Vec::new(),
                body: Some(chunk),
            };
        }

        let mut lines = Vec::new();
        let mut offset = 0;
        while offset < chunk.len() && !self.state.header_complete {
            let (used, line) = self.lines.next_line(&chunk[offset..]);
            offset += used;
            if let Some(raw) = line {
                let text = String::from_utf8_lossy(&raw).into_owned();
                if !self.continuation {
                    self.feed_line(&text);
                }
                self.continuation = !raw.ends_with(b"\n");
                lines.push(text);
            }
        }

        FeedOutcome {
            lines,
            body: self.state.header_complete.then(|| &chunk[offset..]),
        }
    }

    /// Splits a chunk into display lines without parsing them.
    pub fn passthrough(&mut self, chunk: &[u8]) -> Vec<String> {
        let lines = self.lines.split(chunk);
        if let Some(last) = lines.last() {
            self.continuation = !last.ends_with(b"\n");
        }
        lines
            .iter()
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .collect()
    }

    /// Takes any unterminated trailing bytes as a display line.
    pub fn finish(&mut self) -> Option<String> {
        self.continuation = false;
        self.lines
            .take_partial()
            .map(|raw| String::from_utf8_lossy(&raw).into_owned())
    }
}

/// True for the header terminator: an empty line or a bare terminator.
#[must_use]
pub fn is_blank_line(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']).is_empty()
}

/// Parses the value of a `Content-Length` header line.
///
/// The line must start with the exact header name, followed by one `:`
/// separator and optional spaces or tabs. Only decimal digits up to the line
/// terminator are accepted; anything else yields `None`.
#[must_use]
pub fn parse_content_length(line: &str) -> Option<u64> {
    let value = line
        .strip_prefix(CONTENT_LENGTH_MARKER)?
        .strip_prefix(HEADER_SEPARATOR)?
        .trim_start_matches([' ', '\t']);

    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, tail) = value.split_at(digits_end);
    if digits.is_empty() || !tail.trim_end_matches(['\r', '\n', ' ', '\t']).is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::framing::MAX_LINE_LEN;

    #[test]
    fn test_parse_content_length_with_crlf() {
        assert_eq!(parse_content_length("Content-Length: 1024\r\n"), Some(1024));
    }

    #[test]
    fn test_parse_content_length_tolerates_missing_space_and_tabs() {
        assert_eq!(parse_content_length("Content-Length:7\r\n"), Some(7));
        assert_eq!(parse_content_length("Content-Length:\t 42 \r\n"), Some(42));
    }

    #[test]
    fn test_parse_content_length_without_terminator() {
        assert_eq!(parse_content_length("Content-Length: 5"), Some(5));
    }

    #[test]
    fn test_parse_content_length_rejects_malformed_values() {
        assert_eq!(parse_content_length("Content-Length: \r\n"), None);
        assert_eq!(parse_content_length("Content-Length: 12abc\r\n"), None);
        assert_eq!(parse_content_length("Content-Length: -3\r\n"), None);
        assert_eq!(
            parse_content_length("Content-Length: 99999999999999999999999\r\n"),
            None
        );
    }

    #[test]
    fn test_parse_content_length_is_case_sensitive_and_anchored() {
        assert_eq!(parse_content_length("content-length: 5\r\n"), None);
        assert_eq!(parse_content_length("X-Content-Length: 5\r\n"), None);
        assert_eq!(parse_content_length("Content-Length 5\r\n"), None);
    }

    #[test]
    fn test_blank_line_detection() {
        assert!(is_blank_line(""));
        assert!(is_blank_line("\r\n"));
        assert!(is_blank_line("\n"));
        assert!(!is_blank_line(" \r\n"));
        assert!(!is_blank_line("Server: x\r\n"));
    }

    #[test]
    fn test_feed_line_tracks_success_and_size() {
        let mut framer = ResponseFramer::new();
        framer.feed_line("HTTP/1.1 200 OK\r\n");
        assert!(framer.state().saw_success_status_line());

        framer.feed_line("Content-Length: 4\r\n");
        assert_eq!(framer.declared_size(), 4);

        framer.feed_line("\r\n");
        assert!(framer.state().header_complete());
        assert!(!framer.state().saw_success_status_line());
    }

    #[test]
    fn test_feed_line_accepts_empty_line_as_delimiter() {
        let mut framer = ResponseFramer::new();
        framer.feed_line("HTTP/1.1 200 OK\r\n");
        framer.feed_line("");
        assert!(framer.state().header_complete());
    }

    #[test]
    fn test_first_content_length_wins() {
        let mut framer = ResponseFramer::new();
        framer.feed_line("HTTP/1.1 200 OK\r\n");
        framer.feed_line("Content-Length: 10\r\n");
        framer.feed_line("Content-Length: 20\r\n");
        assert_eq!(framer.declared_size(), 10);
    }

    #[test]
    fn test_malformed_length_leaves_size_unknown() {
        let mut framer = ResponseFramer::new();
        framer.feed_line("HTTP/1.1 200 OK\r\n");
        framer.feed_line("Content-Length: lots\r\n");
        framer.feed_line("\r\n");
        assert!(framer.state().header_complete());
        assert_eq!(framer.declared_size(), 0);
    }

    #[test]
    fn test_non_success_response_never_completes_header() {
        let mut framer = ResponseFramer::new();
        let outcome = framer.feed(b"HTTP/1.1 404 Not Found\r\nContent-Length: 3\r\n\r\nabc");
        assert_eq!(outcome.lines.len(), 3);
        assert!(outcome.body.is_none());
        assert!(!framer.state().header_complete());
        assert_eq!(framer.declared_size(), 0);
    }

    #[test]
    fn test_length_before_status_line_is_ignored() {
        let mut framer = ResponseFramer::new();
        framer.feed_line("Content-Length: 9\r\n");
        framer.feed_line("HTTP/1.1 200 OK\r\n");
        assert_eq!(framer.declared_size(), 0);
        assert!(framer.state().is_untracked());
    }

    #[test]
    fn test_success_marker_after_failed_status_is_ignored() {
        let mut framer = ResponseFramer::new();
        let outcome = framer.feed(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 40\r\n\r\n\
              HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nabc",
        );
        assert!(outcome.body.is_none());
        assert_eq!(outcome.lines.len(), 6);
        assert!(framer.state().is_untracked());
        assert!(!framer.state().saw_success_status_line());
        assert_eq!(framer.declared_size(), 0);
    }

    #[test]
    fn test_zero_length_is_first_declaration() {
        let mut framer = ResponseFramer::new();
        framer.feed_line("HTTP/1.1 200 OK\r\n");
        framer.feed_line("Content-Length: 0\r\n");
        framer.feed_line("Content-Length: 5\r\n");
        assert_eq!(framer.declared_size(), 0);
    }

    #[test]
    fn test_overlong_header_split_at_crlf_does_not_end_headers() {
        let mut header = b"X-Long: ".to_vec();
        header.resize(MAX_LINE_LEN - 1, b'a');
        let mut response = b"HTTP/1.1 200 OK\r\n".to_vec();
        response.extend_from_slice(&header);
        response.extend_from_slice(b"\r\nContent-Length: 4\r\n\r\n1234");

        let mut framer = ResponseFramer::new();
        let outcome = framer.feed(&response);
        assert!(framer.state().header_complete());
        assert_eq!(framer.declared_size(), 4);
        assert_eq!(outcome.body, Some(&b"1234"[..]));
        assert_eq!(outcome.lines[2], "\n");
    }

    #[test]
    fn test_overlong_fragment_is_never_parsed_as_header() {
        let mut response = b"HTTP/1.1 200 OK\r\n".to_vec();
        response.resize(17 + MAX_LINE_LEN, b'a');
        response.extend_from_slice(b"Content-Length: 9\r\n\r\n");

        let mut framer = ResponseFramer::new();
        let _ = framer.feed(&response);
        assert!(framer.state().header_complete());
        assert_eq!(framer.declared_size(), 0);
    }

    #[test]
    fn test_feed_hands_off_body_mid_chunk() {
        let mut framer = ResponseFramer::new();
        let outcome = framer.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\n1234");
        assert_eq!(
            outcome.lines,
            vec!["HTTP/1.1 200 OK\r\n", "Content-Length: 4\r\n", "\r\n"]
        );
        assert_eq!(outcome.body, Some(&b"1234"[..]));
    }

    #[test]
    fn test_feed_after_header_passes_chunk_through() {
        let mut framer = ResponseFramer::new();
        let _ = framer.feed(b"HTTP/1.1 200 OK\r\n\r\n");
        let outcome = framer.feed(b"\r\nnot a header\r\n");
        assert!(outcome.lines.is_empty());
        assert_eq!(outcome.body, Some(&b"\r\nnot a header\r\n"[..]));
    }

    #[test]
    fn test_restart_keeps_partial_line() {
        let mut framer = ResponseFramer::new();
        let _ = framer.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\n");
        framer.restart();
        assert_eq!(framer.state(), FramingState::default());
        assert_eq!(framer.declared_size(), 0);

        assert!(framer.passthrough(b"HTTP/1.1 2").is_empty());
        framer.restart();
        let outcome = framer.feed(b"00 OK\r\n");
        assert_eq!(outcome.lines, vec!["HTTP/1.1 200 OK\r\n"]);
        assert!(framer.state().saw_success_status_line());
    }

    #[test]
    fn test_finish_returns_unterminated_tail() {
        let mut framer = ResponseFramer::new();
        assert!(framer.passthrough(b"bye").is_empty());
        assert_eq!(framer.finish().as_deref(), Some("bye"));
        assert!(framer.finish().is_none());
    }
}
