//! Async drivers feeding inbound bytes and outbound requests to a controller.

use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::Receiver;
use tokio::time::{Instant, sleep_until, timeout};
use tracing::{debug, info, instrument};

use super::controller::SessionController;
use super::error::SessionError;
use super::event::Observer;
use crate::feed::ByteFeed;
use crate::request::TargetPolicy;
use crate::transport::TransportError;

/// Pulls every chunk from `feed` into `controller` until the stream ends.
///
/// While a cycle is active, a chunk must arrive within `idle_timeout`.
///
/// # Errors
///
/// Returns [`SessionError::Stalled`] after aborting a stalled cycle, and
/// [`SessionError::Transport`] when reading fails. The controller has
/// already been notified in both cases. End of stream is `Ok(())`.
#[instrument(level = "debug", skip_all, fields(idle_secs = idle_timeout.as_secs()))]
pub async fn pump<F, O, P>(
    feed: &mut F,
    controller: &mut SessionController<O, P>,
    idle_timeout: Duration,
) -> Result<(), SessionError>
where
    F: ByteFeed + ?Sized,
    O: Observer,
    P: TargetPolicy,
{
    loop {
        let next = if controller.is_active() {
            if let Ok(next) = timeout(idle_timeout, feed.next_chunk()).await {
                next
            } else {
                controller.on_stall(idle_timeout);
                return Err(SessionError::Stalled {
                    idle_secs: idle_timeout.as_secs(),
                });
            }
        } else {
            feed.next_chunk().await
        };

        match next {
            Ok(Some(chunk)) => controller.on_bytes(&chunk),
            Ok(None) => {
                debug!("inbound stream ended");
                controller.on_disconnect();
                return Ok(());
            }
            Err(error) => {
                let error = TransportError::io("peer", error);
                controller.on_transport_error(&error);
                return Err(error.into());
            }
        }
    }
}

/// Runs an interactive session until the server disconnects.
///
/// Each line received on `requests` is submitted to `controller` and written to
/// `writer`. Rejected requests are reported to the observer and the session
/// continues. A stalled cycle is aborted and the session keeps reading. Once
/// the request channel closes, inbound lines are still displayed until the
/// server goes quiet for `idle_timeout` with no download in flight.
///
/// # Errors
///
/// Returns [`SessionError::Transport`] when reading from the feed or
/// writing a request fails. The controller has already been notified.
#[instrument(level = "debug", skip_all, fields(idle_secs = idle_timeout.as_secs()))]
pub async fn run_session<F, W, O, P>(
    feed: &mut F,
    writer: &mut W,
    requests: &mut Receiver<String>,
    controller: &mut SessionController<O, P>,
    idle_timeout: Duration,
) -> Result<(), SessionError>
where
    F: ByteFeed + ?Sized,
    W: AsyncWrite + Unpin,
    O: Observer,
    P: TargetPolicy,
{
    let mut requests_open = true;
    let mut deadline = Instant::now() + idle_timeout;

    loop {
        tokio::select! {
            next = feed.next_chunk() => {
                deadline = Instant::now() + idle_timeout;
                match next {
                    Ok(Some(chunk)) => controller.on_bytes(&chunk),
                    Ok(None) => {
                        info!("server closed the connection");
                        controller.on_disconnect();
                        return Ok(());
                    }
                    Err(error) => {
                        let error = TransportError::io("peer", error);
                        controller.on_transport_error(&error);
                        return Err(error.into());
                    }
                }
            }
            line = requests.recv(), if requests_open => {
                if let Some(line) = line {
                    submit_line(&line, writer, controller).await?;
                    deadline = Instant::now() + idle_timeout;
                } else {
                    debug!("request input closed");
                    requests_open = false;
                }
            }
            () = sleep_until(deadline), if controller.is_active() || !requests_open => {
                if !controller.is_active() {
                    debug!("request input closed and the server went quiet");
                    return Ok(());
                }
                controller.on_stall(idle_timeout);
                deadline = Instant::now() + idle_timeout;
            }
        }
    }
}

async fn submit_line<W, O, P>(
    line: &str,
    writer: &mut W,
    controller: &mut SessionController<O, P>,
) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
    O: Observer,
    P: TargetPolicy,
{
    let bytes = match controller.submit(line) {
        Ok(bytes) => bytes,
        Err(error) => {
            controller.on_request_error(&error);
            return Ok(());
        }
    };

    let written = async {
        writer.write_all(&bytes).await?;
        writer.flush().await
    }
    .await;
    if let Err(error) = written {
        let error = TransportError::io("peer", error);
        controller.on_transport_error(&error);
        return Err(error.into());
    }
    debug!(bytes = bytes.len(), "request sent");
    Ok(())
}
