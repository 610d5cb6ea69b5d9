//! Per-cycle state machine tying framer, sink, and observer together.

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::config::SessionConfig;
use super::error::SessionError;
use super::event::{Observer, SessionEvent};
use crate::download::DownloadSink;
use crate::framing::{FramingState, ResponseFramer};
use crate::request::{ExtensionHeuristic, RequestBuilder, TargetPolicy};
use crate::transport::TransportError;

/// Where the current download cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No download armed; inbound bytes are only displayed.
    Idle,
    /// A download is armed; header lines are being scanned.
    HeaderScan,
    /// The header block ended; bytes go to the file.
    BodyStream,
    /// The declared size was reached (transient, followed by `Idle`).
    Complete,
}

/// Drives one download cycle at a time.
///
/// Every inbound byte goes through [`on_bytes`](Self::on_bytes) in arrival
/// order. No error escapes it: file failures abort the cycle and surface as
/// [`SessionEvent::Aborted`].
#[derive(Debug)]
pub struct SessionController<O, P = ExtensionHeuristic> {
    builder: RequestBuilder<P>,
    framer: ResponseFramer,
    sink: DownloadSink,
    armed: Option<String>,
    state: SessionState,
    keep_partial: bool,
    observer: O,
}

impl<O: Observer> SessionController<O> {
    /// Creates a controller with the default target policy.
    pub fn new(config: &SessionConfig, observer: O) -> Self {
        Self::with_policy(config, ExtensionHeuristic, observer)
    }
}

impl<O: Observer, P: TargetPolicy> SessionController<O, P> {
    /// Creates a controller with a custom target policy.
    pub fn with_policy(config: &SessionConfig, policy: P, observer: O) -> Self {
        Self {
            builder: RequestBuilder::with_policy(policy, config.terminator),
            framer: ResponseFramer::new(),
            sink: DownloadSink::new(config.output_dir.clone()),
            armed: None,
            state: SessionState::Idle,
            keep_partial: config.keep_partial,
            observer,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while a download cycle is armed or streaming.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            SessionState::HeaderScan | SessionState::BodyStream
        )
    }

    /// Filename of the armed download, if any.
    #[must_use]
    pub fn armed_target(&self) -> Option<&str> {
        self.armed.as_deref()
    }

    /// Framing flags of the current cycle.
    #[must_use]
    pub fn framing(&self) -> FramingState {
        self.framer.state()
    }

    /// The sink of the current cycle.
    #[must_use]
    pub fn sink(&self) -> &DownloadSink {
        &self.sink
    }

    /// The observer.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observer.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consumes the controller, returning the observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Prepares a new cycle for `request` and returns the bytes to send.
    ///
    /// A cycle still scanning headers is aborted and replaced. When the
    /// target policy yields a filename the controller enters `HeaderScan`,
    /// otherwise it stays `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] while a body is streaming and
    /// [`SessionError::InvalidRequest`] for lines that cannot be sent. The
    /// current cycle is left untouched in both cases.
    #[instrument(level = "debug", skip(self), fields(state = ?self.state))]
    pub fn submit(&mut self, request: &str) -> Result<Vec<u8>, SessionError> {
        if self.state == SessionState::BodyStream {
            let filename = self.armed.clone().unwrap_or_default();
            warn!(filename = %filename, "request rejected while a body is streaming");
            return Err(SessionError::Busy { filename });
        }

        let outgoing = self.builder.build(request)?;

        if self.state == SessionState::HeaderScan {
            self.abort("superseded by a new request");
        }
        self.sink.reset();
        self.framer.restart();

        match outgoing.target {
            Some(filename) => {
                info!(filename = %filename, "download armed");
                self.armed = Some(filename.clone());
                self.state = SessionState::HeaderScan;
                self.observer.notify(SessionEvent::Armed { filename });
            }
            None => {
                debug!("request does not arm a download");
                self.armed = None;
                self.state = SessionState::Idle;
            }
        }

        Ok(outgoing.bytes)
    }

    /// Processes one inbound chunk of any size.
    pub fn on_bytes(&mut self, chunk: &[u8]) {
        let mut rest = chunk;
        while !rest.is_empty() {
            rest = match self.state {
                SessionState::Idle | SessionState::Complete => {
                    for line in self.framer.passthrough(rest) {
                        self.observer.notify(SessionEvent::Line(line));
                    }
                    break;
                }
                SessionState::HeaderScan => self.scan_headers(rest),
                SessionState::BodyStream => self.stream_body(rest),
            };
        }
    }

    /// Reports a successful connection.
    pub fn on_connected(&mut self, peer: impl Into<String>) {
        self.observer.notify(SessionEvent::Connected { peer: peer.into() });
    }

    /// Handles the end of the inbound stream.
    ///
    /// An unterminated trailing line is displayed; an active cycle is aborted.
    pub fn on_disconnect(&mut self) {
        if let Some(line) = self.framer.finish() {
            self.observer.notify(SessionEvent::Line(line));
        }
        self.abort("connection closed before the download completed");
        self.observer.notify(SessionEvent::Disconnected);
    }

    /// Handles a transport failure: aborts an active cycle, then reports the error.
    pub fn on_transport_error(&mut self, error: &TransportError) {
        self.abort(&error.to_string());
        self.observer.notify(SessionEvent::Error(error.to_string()));
    }

    /// Handles a stall: aborts an active cycle.
    pub fn on_stall(&mut self, idle: Duration) {
        self.abort(&format!("no data received for {idle:?}"));
    }

    /// Reports a request that could not be submitted.
    pub fn on_request_error(&mut self, error: &SessionError) {
        self.observer.notify(SessionEvent::Error(error.to_string()));
    }

    /// Aborts the active cycle, if any. Returns whether one was aborted.
    ///
    /// Releases the file exactly once and removes it unless partial files are
    /// kept. No completion event is emitted.
    pub fn abort(&mut self, reason: &str) -> bool {
        if !self.is_active() {
            return false;
        }
        let filename = self.armed.take().unwrap_or_default();
        warn!(filename = %filename, state = ?self.state, reason, "download cycle aborted");

        if self.keep_partial {
            self.sink.reset();
        } else {
            self.sink.discard();
        }
        self.framer.restart();
        self.state = SessionState::Idle;
        self.observer.notify(SessionEvent::Aborted {
            filename,
            reason: reason.to_string(),
        });
        true
    }

    fn scan_headers<'a>(&mut self, chunk: &'a [u8]) -> &'a [u8] {
        let outcome = self.framer.feed(chunk);
        for line in outcome.lines {
            self.observer.notify(SessionEvent::Line(line));
        }
        let Some(body) = outcome.body else {
            return &[];
        };

        let Some(filename) = self.armed.clone() else {
            self.state = SessionState::Idle;
            return body;
        };
        if let Err(error) = self.sink.open(&filename) {
            self.abort(&error.to_string());
            return &[];
        }

        let declared = self.framer.declared_size();
        self.sink.set_declared_size(declared);
        if declared == 0 {
            warn!(filename = %filename, "body starts without a usable content length");
            self.observer.notify(SessionEvent::SizeUnknown {
                filename: filename.clone(),
            });
        }
        debug!(filename = %filename, declared_size = declared, "streaming body");
        self.state = SessionState::BodyStream;
        body
    }

    fn stream_body<'a>(&mut self, chunk: &'a [u8]) -> &'a [u8] {
        let accepted = match self.sink.write(chunk) {
            Ok(Some(progress)) => {
                self.observer.notify(SessionEvent::Progress(progress));
                progress.accepted
            }
            Ok(None) => chunk.len(),
            Err(error) => {
                self.abort(&error.to_string());
                return &[];
            }
        };

        if self.sink.is_complete() {
            self.complete();
        }
        &chunk[accepted..]
    }

    fn complete(&mut self) {
        self.state = SessionState::Complete;
        let filename = self.armed.take().unwrap_or_default();
        let bytes = self.sink.bytes_written();
        info!(filename = %filename, bytes, "download complete");

        self.observer
            .notify(SessionEvent::Completed { filename, bytes });
        self.sink.reset();
        self.framer.restart();
        self.state = SessionState::Idle;
    }
}
