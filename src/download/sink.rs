//! Destination file of a download cycle.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::error::DownloadError;
use super::progress::Progress;

/// What the active download writes and how far it got.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadTarget {
    filename: String,
    declared_size: u64,
    bytes_written: u64,
}

impl DownloadTarget {
    /// Target filename, empty when the sink is unarmed.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Declared body length, 0 when unknown.
    #[must_use]
    pub fn declared_size(&self) -> u64 {
        self.declared_size
    }

    /// Bytes written so far in this cycle.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// Writes body bytes to `<output_dir>/<filename>`.
#[derive(Debug)]
pub struct DownloadSink {
    output_dir: PathBuf,
    target: DownloadTarget,
    file: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl DownloadSink {
    /// Creates an unarmed sink writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            target: DownloadTarget::default(),
            file: None,
            path: None,
        }
    }

    /// Directory new files are created in.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Current target state.
    #[must_use]
    pub fn target(&self) -> &DownloadTarget {
        &self.target
    }

    /// Declared body length, 0 when unknown.
    #[must_use]
    pub fn declared_size(&self) -> u64 {
        self.target.declared_size
    }

    /// Bytes written so far in this cycle.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.target.bytes_written
    }

    /// Path of the open file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True while a file handle is held.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Creates (or truncates) the target file.
    ///
    /// A no-op when the sink is already open for `filename`. Opening a
    /// different file resets the previous target first.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when the file cannot be created. The
    /// sink stays unarmed in that case.
    #[instrument(level = "debug", skip(self), fields(dir = %self.output_dir.display()))]
    pub fn open(&mut self, filename: &str) -> Result<(), DownloadError> {
        if self.file.is_some() && self.target.filename == filename {
            debug!("sink already open for target");
            return Ok(());
        }
        self.reset();

        let path = self.output_dir.join(filename);
        let file = File::create(&path).map_err(|e| DownloadError::io(path.clone(), e))?;
        debug!(path = %path.display(), "opened download file");

        self.file = Some(BufWriter::new(file));
        self.path = Some(path);
        self.target.filename = filename.to_string();
        Ok(())
    }

    /// Records the declared body length. Only the first non-zero value per cycle is kept.
    pub fn set_declared_size(&mut self, size: u64) {
        if self.target.declared_size == 0 {
            self.target.declared_size = size;
        }
    }

    /// Appends body bytes.
    ///
    /// Returns `Ok(None)` without touching the file when `buf` is empty, the
    /// sink is not open, or the declared size was already reached. When the
    /// size is known, only the bytes still owed are written; the returned
    /// [`Progress::accepted`] tells the caller how many.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when writing or flushing fails. The file
    /// handle stays held until [`reset`](Self::reset) or
    /// [`discard`](Self::discard).
    pub fn write(&mut self, buf: &[u8]) -> Result<Option<Progress>, DownloadError> {
        if buf.is_empty() || self.target.filename.is_empty() {
            return Ok(None);
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(None);
        };

        let accepted = match self.target.declared_size {
            0 => buf.len(),
            declared => {
                let owed = declared.saturating_sub(self.target.bytes_written);
                usize::try_from(owed).map_or(buf.len(), |owed| owed.min(buf.len()))
            }
        };
        if accepted == 0 {
            return Ok(None);
        }

        let path = self.path.as_deref().unwrap_or(self.output_dir.as_path());
        file.write_all(&buf[..accepted])
            .map_err(|e| DownloadError::io(path, e))?;
        self.target.bytes_written += accepted as u64;

        if self.target.bytes_written == self.target.declared_size {
            file.flush().map_err(|e| DownloadError::io(path, e))?;
            info!(
                path = %path.display(),
                bytes = self.target.bytes_written,
                "download body complete"
            );
        }

        Ok(Some(Progress {
            accepted,
            bytes_written: self.target.bytes_written,
            declared_size: self.target.declared_size,
        }))
    }

    /// True iff bytes were written and they match the declared size.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.target.bytes_written > 0 && self.target.bytes_written == self.target.declared_size
    }

    /// Releases the file handle and clears the target. Safe to call repeatedly.
    pub fn reset(&mut self) {
        if let Some(mut file) = self.file.take()
            && let Err(error) = file.flush()
        {
            warn!(error = %error, "failed to flush download file on reset");
        }
        self.path = None;
        self.target = DownloadTarget::default();
    }

    /// Resets the sink and removes the file it had open, if any.
    pub fn discard(&mut self) {
        let path = self.path.clone();
        self.reset();
        if let Some(path) = path {
            debug!(path = %path.display(), "removing partial download");
            if let Err(error) = std::fs::remove_file(&path)
                && error.kind() != std::io::ErrorKind::NotFound
            {
                warn!(path = %path.display(), error = %error, "failed to remove partial download");
            }
        }
    }
}
