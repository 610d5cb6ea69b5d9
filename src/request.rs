//! Outgoing request encoding and download target detection.
//!
//! A request is a single line typed by the user, e.g. `GET /files/report.pdf`.
//! The line is sent as-is (plus an optional terminator). Whether the response
//! should be saved to a file is decided by a [`TargetPolicy`]; the default
//! [`ExtensionHeuristic`] only arms downloads for `GET` requests whose last
//! path segment carries a short file extension.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

/// Method token that marks a retrieval request.
pub const DOWNLOAD_METHOD: &str = "GET";

/// Shortest accepted extension, in characters after the last dot.
pub const MIN_EXTENSION_CHARS: usize = 2;

/// Longest accepted extension, in characters after the last dot.
pub const MAX_EXTENSION_CHARS: usize = 4;

/// Errors for request lines that cannot be sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The line is empty or whitespace only.
    #[error("request is empty")]
    Empty,

    /// The line contains a line break.
    #[error("request must be a single line")]
    MultiLine,
}

/// Bytes appended to every outgoing request line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Terminator {
    /// Send the line exactly as typed.
    #[default]
    None,
    /// Append `\r\n`.
    Crlf,
    /// Append `\r\n\r\n`, ending an HTTP-style header block.
    DoubleCrlf,
}

impl Terminator {
    /// Bytes appended after the request line.
    #[must_use]
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::None => b"",
            Self::Crlf => b"\r\n",
            Self::DoubleCrlf => b"\r\n\r\n",
        }
    }

    /// Stable label used by the CLI and config file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Crlf => "crlf",
            Self::DoubleCrlf => "double-crlf",
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Terminator {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(Self::None),
            "crlf" => Ok(Self::Crlf),
            "double-crlf" => Ok(Self::DoubleCrlf),
            other => Err(format!(
                "unknown terminator '{other}' (expected none, crlf or double-crlf)"
            )),
        }
    }
}

/// Decides whether a request line should arm a download, and under which filename.
pub trait TargetPolicy: Send + Sync {
    /// Returns the filename to save the response body as, or `None`.
    fn download_target(&self, request: &str) -> Option<String>;
}

/// Default policy: `GET` requests for a path whose last segment has a
/// 2 to 4 character extension.
///
/// The range is arbitrary: `a.c` is rejected, `a.go`, `a.pdf` and `a.docx`
/// are accepted, `a.abcde` is rejected. Requests that fail it are never
/// saved, even if the server sends a body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionHeuristic;

impl TargetPolicy for ExtensionHeuristic {
    fn download_target(&self, request: &str) -> Option<String> {
        if !request.starts_with(DOWNLOAD_METHOD) {
            return None;
        }
        let path = request.split_whitespace().nth(1)?;
        let filename = path.rsplit('/').next()?;
        if filename.is_empty() || filename.contains(['\\', '\0']) {
            return None;
        }
        has_accepted_extension(filename).then(|| filename.to_string())
    }
}

fn has_accepted_extension(filename: &str) -> bool {
    let Some(dot) = filename.rfind('.') else {
        return false;
    };
    let extension_chars = filename[dot + 1..].chars().count();
    (MIN_EXTENSION_CHARS..=MAX_EXTENSION_CHARS).contains(&extension_chars)
}

/// A request ready to be written to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    /// The request line as typed.
    pub line: String,
    /// Encoded bytes (line plus terminator).
    pub bytes: Vec<u8>,
    /// Filename to save the response as, when a download is expected.
    pub target: Option<String>,
}

/// Validates request lines, encodes them, and applies the target policy.
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder<P = ExtensionHeuristic> {
    policy: P,
    terminator: Terminator,
}

impl RequestBuilder {
    /// Creates a builder with the default [`ExtensionHeuristic`].
    #[must_use]
    pub fn new(terminator: Terminator) -> Self {
        Self::with_policy(ExtensionHeuristic, terminator)
    }
}

impl<P: TargetPolicy> RequestBuilder<P> {
    /// Creates a builder with a custom target policy.
    #[must_use]
    pub fn with_policy(policy: P, terminator: Terminator) -> Self {
        Self { policy, terminator }
    }

    /// Terminator appended to encoded requests.
    #[must_use]
    pub fn terminator(&self) -> Terminator {
        self.terminator
    }

    /// Validates and encodes `request`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when the line is empty or spans several lines.
    pub fn build(&self, request: &str) -> Result<OutgoingRequest, RequestError> {
        if request.trim().is_empty() {
            return Err(RequestError::Empty);
        }
        if request.contains(['\r', '\n']) {
            return Err(RequestError::MultiLine);
        }

        let target = self.policy.download_target(request);
        debug!(request, target = ?target, "built request");

        let mut bytes = Vec::with_capacity(request.len() + 4);
        bytes.extend_from_slice(request.as_bytes());
        bytes.extend_from_slice(self.terminator.as_bytes());

        Ok(OutgoingRequest {
            line: request.to_string(),
            bytes,
            target,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn target(request: &str) -> Option<String> {
        ExtensionHeuristic.download_target(request)
    }

    #[test]
    fn test_get_with_extension_arms_download() {
        assert_eq!(target("GET /files/report.pdf").as_deref(), Some("report.pdf"));
    }

    #[test]
    fn test_get_without_extension_is_not_armed() {
        assert_eq!(target("GET /files/report"), None);
    }

    #[test]
    fn test_non_get_methods_are_not_armed() {
        assert_eq!(target("POST /control/exit.json"), None);
        assert_eq!(target(" GET /files/report.pdf"), None);
        assert_eq!(target("get /files/report.pdf"), None);
    }

    #[test]
    fn test_missing_path_is_not_armed() {
        assert_eq!(target("GET"), None);
        assert_eq!(target("GET "), None);
    }

    #[test]
    fn test_trailing_slash_is_not_armed() {
        assert_eq!(target("GET /files/"), None);
    }

    #[test]
    fn test_path_without_directory() {
        assert_eq!(target("GET notes.txt").as_deref(), Some("notes.txt"));
    }

    #[test]
    fn test_extension_boundaries() {
        assert_eq!(target("GET /a.c"), None);
        assert_eq!(target("GET /a.go").as_deref(), Some("a.go"));
        assert_eq!(target("GET /a.pdf").as_deref(), Some("a.pdf"));
        assert_eq!(target("GET /a.docx").as_deref(), Some("a.docx"));
        assert_eq!(target("GET /a.abcde"), None);
        assert_eq!(target("GET /a."), None);
    }

    #[test]
    fn test_last_dot_decides_extension() {
        assert_eq!(
            target("GET /dist/app.tar.gz").as_deref(),
            Some("app.tar.gz")
        );
        assert_eq!(target("GET /v1.2/readme"), None);
    }

    #[test]
    fn test_extension_counts_characters_not_bytes() {
        assert_eq!(target("GET /notes.été").as_deref(), Some("notes.été"));
    }

    #[test]
    fn test_backslash_in_filename_is_rejected() {
        assert_eq!(target("GET /..\\..\\evil.pdf"), None);
    }

    #[test]
    fn test_build_appends_terminator() {
        let builder = RequestBuilder::new(Terminator::Crlf);
        let request = builder.build("GET /a.pdf").unwrap();
        assert_eq!(request.bytes, b"GET /a.pdf\r\n");
        assert_eq!(request.target.as_deref(), Some("a.pdf"));

        let raw = RequestBuilder::new(Terminator::None).build("PING").unwrap();
        assert_eq!(raw.bytes, b"PING");
        assert!(raw.target.is_none());
    }

    #[test]
    fn test_build_rejects_empty_and_multiline() {
        let builder = RequestBuilder::new(Terminator::None);
        assert_eq!(builder.build("   "), Err(RequestError::Empty));
        assert_eq!(builder.build("GET /a.pdf\nGET /b.pdf"), Err(RequestError::MultiLine));
    }

    #[test]
    fn test_custom_policy_replaces_heuristic() {
        struct Always;
        impl TargetPolicy for Always {
            fn download_target(&self, _request: &str) -> Option<String> {
                Some("out.bin".to_string())
            }
        }
        let builder = RequestBuilder::with_policy(Always, Terminator::None);
        assert_eq!(
            builder.build("HELLO").unwrap().target.as_deref(),
            Some("out.bin")
        );
    }

    #[test]
    fn test_terminator_from_str_round_trip_labels() {
        assert_eq!("double-crlf".parse::<Terminator>(), Ok(Terminator::DoubleCrlf));
        assert!("lf".parse::<Terminator>().is_err());
        assert_eq!(Terminator::Crlf.to_string(), "crlf");
    }
}
