//! Pull-based byte source over the raw transport.
//!
//! The session core never reads from a socket directly. It pulls chunks from a
//! [`ByteFeed`], so any scheduling model (a blocking loop, a `select!` loop,
//! scripted test input) can drive it as long as bytes arrive in order.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Size of a single read from the underlying reader.
pub const READ_CHUNK_SIZE: usize = 8 * 1024;

/// A source of raw inbound bytes.
///
/// Chunks carry no framing: a chunk may end mid-line, mid-terminator, or
/// span the header/body boundary.
#[async_trait]
pub trait ByteFeed: Send {
    /// Returns the next available chunk, or `None` once no more data can arrive.
    ///
    /// Implementations must be cancel-safe: dropping the returned future
    /// before it resolves must not lose bytes.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the transport fails.
    async fn next_chunk(&mut self) -> std::io::Result<Option<Vec<u8>>>;
}

/// [`ByteFeed`] over any tokio reader (TCP read half, duplex pipe, mock IO).
#[derive(Debug)]
pub struct ReaderFeed<R> {
    reader: R,
    buf: Box<[u8]>,
}

impl<R> ReaderFeed<R> {
    /// Wraps `reader` with the default read chunk size.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, READ_CHUNK_SIZE)
    }

    /// Wraps `reader`, reading at most `chunk_size` bytes per chunk (minimum 1).
    #[must_use]
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            buf: vec![0u8; chunk_size.max(1)].into_boxed_slice(),
        }
    }

    /// Consumes the feed, returning the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[async_trait]
impl<R> ByteFeed for ReaderFeed<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_chunk(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let read = self.reader.read(&mut self.buf).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf[..read].to_vec()))
    }
}

#[async_trait]
impl<F> ByteFeed for Box<F>
where
    F: ByteFeed + ?Sized,
{
    async fn next_chunk(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        (**self).next_chunk().await
    }
}
