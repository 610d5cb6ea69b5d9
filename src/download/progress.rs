//! Progress snapshots emitted after each body write.

use std::fmt;

/// Progress of the active download after one write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Bytes of the last chunk that were written.
    pub accepted: usize,
    /// Total bytes written in this cycle.
    pub bytes_written: u64,
    /// Declared body length, 0 when unknown.
    pub declared_size: u64,
}

impl Progress {
    /// Percentage of the declared size written so far, `None` when the size is unknown.
    #[must_use]
    pub fn percent(&self) -> Option<u8> {
        if self.declared_size == 0 {
            return None;
        }
        let pct = u128::from(self.bytes_written) * 100 / u128::from(self.declared_size);
        Some(u8::try_from(pct.min(100)).unwrap_or(100))
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent() {
            Some(pct) => write!(f, "Got {} bytes. (Progress: {pct} %)", self.accepted),
            None => write!(
                f,
                "Got {} bytes. ({} bytes total, size unknown)",
                self.accepted, self.bytes_written
            ),
        }
    }
}
