//! Line splitting with carry-over across chunk boundaries.

use super::constants::MAX_LINE_LEN;

/// Accumulates bytes until a `\n` completes a line.
///
/// Lines are returned with their terminator. A line that reaches
/// `max_len` bytes without a terminator is returned as-is so the buffer
/// stays bounded.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    pending: Vec<u8>,
    max_len: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Creates an empty buffer with the default [`MAX_LINE_LEN`] bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Creates an empty buffer that flushes lines longer than `max_len` bytes.
    #[must_use]
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_len: max_len.max(1),
        }
    }

    /// Consumes bytes from `input` until one line is complete.
    ///
    /// Returns how many bytes of `input` were consumed and the completed line,
    /// if any. When no line completes, all of `input` is consumed and carried
    /// over to the next call.
    pub fn next_line(&mut self, input: &[u8]) -> (usize, Option<Vec<u8>>) {
        let room = self.max_len.saturating_sub(self.pending.len());
        let window = &input[..input.len().min(room)];

        if let Some(newline) = window.iter().position(|&b| b == b'\n') {
            self.pending.extend_from_slice(&window[..=newline]);
            return (newline + 1, Some(std::mem::take(&mut self.pending)));
        }

        self.pending.extend_from_slice(window);
        if self.pending.len() >= self.max_len {
            return (window.len(), Some(std::mem::take(&mut self.pending)));
        }
        (window.len(), None)
    }

    /// Splits all of `input` into completed lines, carrying any partial tail.
    pub fn split(&mut self, input: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let mut offset = 0;
        while offset < input.len() {
            let (used, line) = self.next_line(&input[offset..]);
            offset += used;
            lines.extend(line);
        }
        lines
    }

    /// Number of bytes waiting for a terminator.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Takes the unterminated tail, if any.
    pub fn take_partial(&mut self) -> Option<Vec<u8>> {
        (!self.pending.is_empty()).then(|| std::mem::take(&mut self.pending))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_next_line_completes_on_newline() {
        let mut buf = LineBuffer::new();
        let (used, line) = buf.next_line(b"Server: x\r\nrest");
        assert_eq!(used, 11);
        assert_eq!(line.unwrap(), b"Server: x\r\n");
        assert_eq!(buf.pending_len(), 0);
    }

    #[test]
    fn test_next_line_carries_partial_line() {
        let mut buf = LineBuffer::new();
        let (used, line) = buf.next_line(b"Content-Le");
        assert_eq!(used, 10);
        assert!(line.is_none());

        let (used, line) = buf.next_line(b"ngth: 4\r\n");
        assert_eq!(used, 9);
        assert_eq!(line.unwrap(), b"Content-Length: 4\r\n");
    }

    #[test]
    fn test_terminator_split_across_chunks() {
        let mut buf = LineBuffer::new();
        assert!(buf.split(b"HTTP/1.1 200 OK\r").is_empty());
        let lines = buf.split(b"\n\r");
        assert_eq!(lines, vec![b"HTTP/1.1 200 OK\r\n".to_vec()]);
        let lines = buf.split(b"\n");
        assert_eq!(lines, vec![b"\r\n".to_vec()]);
    }

    #[test]
    fn test_split_returns_every_complete_line() {
        let mut buf = LineBuffer::new();
        let lines = buf.split(b"a\nb\r\nc");
        assert_eq!(lines, vec![b"a\n".to_vec(), b"b\r\n".to_vec()]);
        assert_eq!(buf.take_partial().unwrap(), b"c");
        assert!(buf.take_partial().is_none());
    }

    #[test]
    fn test_overlong_line_is_flushed_at_bound() {
        let mut buf = LineBuffer::with_max_len(4);
        let lines = buf.split(b"abcdefg\n");
        assert_eq!(lines, vec![b"abcd".to_vec(), b"efg\n".to_vec()]);
    }

    #[test]
    fn test_overlong_line_bound_accounts_for_pending_bytes() {
        let mut buf = LineBuffer::with_max_len(4);
        assert!(buf.split(b"ab").is_empty());
        let (used, line) = buf.next_line(b"cdef");
        assert_eq!(used, 2);
        assert_eq!(line.unwrap(), b"abcd");
    }
}
