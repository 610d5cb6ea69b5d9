//! Notifications for the front end.

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;

use crate::download::Progress;

/// Something the user should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The transport connected.
    Connected {
        /// Peer address.
        peer: String,
    },
    /// The transport closed.
    Disconnected,
    /// A request armed a download.
    Armed {
        /// File the response body will be saved as.
        filename: String,
    },
    /// One inbound line, verbatim.
    Line(String),
    /// Body bytes were written.
    Progress(Progress),
    /// The body started without a usable `Content-Length`.
    SizeUnknown {
        /// File being written.
        filename: String,
    },
    /// The declared size was reached.
    Completed {
        /// File written.
        filename: String,
        /// Bytes written.
        bytes: u64,
    },
    /// The cycle ended without completing.
    Aborted {
        /// File that was being written.
        filename: String,
        /// Why the cycle ended.
        reason: String,
    },
    /// A transport or request error.
    Error(String),
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected { peer } => write!(f, "Connected to {peer}"),
            Self::Disconnected => f.write_str("Disconnected."),
            Self::Armed { filename } => write!(f, "Expecting file {filename}."),
            Self::Line(line) => f.write_str(line.trim_end_matches(['\r', '\n'])),
            Self::Progress(progress) => write!(f, "{progress}"),
            Self::SizeUnknown { filename } => write!(
                f,
                "No usable Content-Length for {filename}; progress and completion are unavailable."
            ),
            Self::Completed { filename, .. } => {
                write!(f, "File {filename} downloaded successfully.")
            }
            Self::Aborted { filename, reason } => {
                write!(f, "Download of {filename} aborted: {reason}")
            }
            Self::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

/// Receiver of session events.
pub trait Observer {
    /// Handles one event. Must not block.
    fn notify(&mut self, event: SessionEvent);
}

impl Observer for Vec<SessionEvent> {
    fn notify(&mut self, event: SessionEvent) {
        self.push(event);
    }
}

impl Observer for UnboundedSender<SessionEvent> {
    fn notify(&mut self, event: SessionEvent) {
        // A dropped receiver means nobody is rendering any more.
        let _ = self.send(event);
    }
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn notify(&mut self, event: SessionEvent) {
        (**self).notify(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_display_strips_terminator() {
        let event = SessionEvent::Line("Content-Length: 4\r\n".to_string());
        assert_eq!(event.to_string(), "Content-Length: 4");
    }

    #[test]
    fn test_completed_display_names_file() {
        let event = SessionEvent::Completed {
            filename: "report.pdf".to_string(),
            bytes: 4,
        };
        assert_eq!(event.to_string(), "File report.pdf downloaded successfully.");
    }

    #[test]
    fn test_progress_display() {
        let event = SessionEvent::Progress(Progress {
            accepted: 2,
            bytes_written: 4,
            declared_size: 4,
        });
        assert_eq!(event.to_string(), "Got 2 bytes. (Progress: 100 %)");
    }

    #[tokio::test]
    async fn test_channel_observer_forwards_events() {
        let (mut tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.notify(SessionEvent::Disconnected);
        assert_eq!(rx.recv().await, Some(SessionEvent::Disconnected));
    }
}
