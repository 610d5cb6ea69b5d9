//! TCP connection setup.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;
use tracing::{debug, info, instrument};

use super::error::TransportError;
use crate::feed::ReaderFeed;

/// Default TCP connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// An established connection to the server.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    /// Address of the connected peer.
    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Splits into an inbound byte feed and the outbound write half.
    #[must_use]
    pub fn into_split(self) -> (ReaderFeed<OwnedReadHalf>, OwnedWriteHalf) {
        let (read, write) = self.stream.into_split();
        (ReaderFeed::new(read), write)
    }
}

/// Resolves `host` and connects to the first address that accepts.
///
/// Each address gets its own `connect_timeout`.
///
/// # Errors
///
/// Returns [`TransportError::HostNotFound`] when resolution fails, otherwise
/// the failure of the last address tried.
#[instrument(skip(connect_timeout))]
pub async fn connect(
    host: &str,
    port: u16,
    connect_timeout: Duration,
) -> Result<Connection, TransportError> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|e| TransportError::host_not_found(host, Some(e)))?
        .collect();
    debug!(candidates = addrs.len(), "resolved host");

    let mut last_error = None;
    for addr in addrs {
        match timeout(connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                info!(peer = %addr, "connected");
                return Ok(Connection { stream, peer: addr });
            }
            Ok(Err(error)) => {
                debug!(peer = %addr, error = %error, "connect attempt failed");
                last_error = Some(TransportError::connect(addr.to_string(), error));
            }
            Err(_) => {
                debug!(peer = %addr, "connect attempt timed out");
                last_error = Some(TransportError::connect_timeout(
                    addr.to_string(),
                    connect_timeout.as_secs(),
                ));
            }
        }
    }

    Err(last_error.unwrap_or_else(|| TransportError::host_not_found(host, None)))
}
