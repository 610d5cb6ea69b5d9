//! Error types for the transport module.

use std::io::ErrorKind;

use thiserror::Error;

/// Connection-level failures. None of them is retried automatically.
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS resolution produced no address.
    #[error("The host {host} was not found.")]
    HostNotFound {
        /// The host that failed to resolve.
        host: String,
        /// The resolver error, when there was one.
        #[source]
        source: Option<std::io::Error>,
    },

    /// The remote end refused the connection.
    #[error("The connection to {addr} was refused.")]
    ConnectionRefused {
        /// The address that refused.
        addr: String,
    },

    /// The remote end closed or reset the connection.
    #[error("The remote host is closed.")]
    ConnectionClosed {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Connecting took longer than the configured timeout.
    #[error("Connecting to {addr} timed out after {secs}s.")]
    ConnectTimeout {
        /// The address being connected to.
        addr: String,
        /// The timeout that elapsed.
        secs: u64,
    },

    /// Any other socket error.
    #[error("Socket error on {addr}: {source}")]
    Io {
        /// The peer address, or host:port when not yet connected.
        addr: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    /// Creates a host-not-found error.
    pub fn host_not_found(host: impl Into<String>, source: Option<std::io::Error>) -> Self {
        Self::HostNotFound {
            host: host.into(),
            source,
        }
    }

    /// Creates a connect timeout error.
    pub fn connect_timeout(addr: impl Into<String>, secs: u64) -> Self {
        Self::ConnectTimeout {
            addr: addr.into(),
            secs,
        }
    }

    /// Classifies an IO error raised while connecting to `addr`.
    pub fn connect(addr: impl Into<String>, source: std::io::Error) -> Self {
        let addr = addr.into();
        match source.kind() {
            ErrorKind::ConnectionRefused => Self::ConnectionRefused { addr },
            _ => Self::Io { addr, source },
        }
    }

    /// Classifies an IO error raised on an established connection to `addr`.
    pub fn io(addr: impl Into<String>, source: std::io::Error) -> Self {
        match source.kind() {
            ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof => Self::ConnectionClosed { source },
            _ => Self::Io {
                addr: addr.into(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_refused_is_classified() {
        let error = TransportError::connect(
            "127.0.0.1:1",
            std::io::Error::new(ErrorKind::ConnectionRefused, "refused"),
        );
        assert!(matches!(error, TransportError::ConnectionRefused { .. }));
        assert_eq!(
            error.to_string(),
            "The connection to 127.0.0.1:1 was refused."
        );
    }

    #[test]
    fn test_reset_is_classified_as_closed() {
        let error = TransportError::io(
            "127.0.0.1:51511",
            std::io::Error::new(ErrorKind::ConnectionReset, "reset"),
        );
        assert!(matches!(error, TransportError::ConnectionClosed { .. }));
        assert_eq!(error.to_string(), "The remote host is closed.");
    }

    #[test]
    fn test_other_errors_keep_address() {
        let error = TransportError::io(
            "127.0.0.1:51511",
            std::io::Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        let msg = error.to_string();
        assert!(msg.contains("127.0.0.1:51511"), "Expected address in: {msg}");
        assert!(msg.contains("denied"), "Expected cause in: {msg}");
    }

    #[test]
    fn test_host_not_found_display() {
        let error = TransportError::host_not_found("nowhere.invalid", None);
        assert_eq!(error.to_string(), "The host nowhere.invalid was not found.");
    }
}
