//! Chunked reads and writes over one client connection.

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::script::has_dot_terminator;

/// Maximum bytes taken by one read.
pub const CHUNK_SIZE: usize = 1024;

/// Maximum size of an accumulated dot-terminated reply.
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024; // 16 MB

/// Client side of a connection, read in fixed-size chunks.
///
/// When a read timeout is set it applies to every individual read, not to a
/// whole reply.
#[derive(Debug)]
pub struct ProbeStream<S> {
    inner: S,
    read_timeout: Option<Duration>,
}

impl<S> ProbeStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a stream with no read timeout.
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            read_timeout: None,
        }
    }

    /// Sets the per-read timeout.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Returns the per-read timeout.
    pub const fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Writes and flushes `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Performs exactly one read of at most [`CHUNK_SIZE`] bytes.
    ///
    /// An empty result means the peer closed its side.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the timeout elapses.
    pub async fn read_chunk(&mut self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let n = self.timed_read(&mut buf).await?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Reads chunks until the accumulated data ends with a dot-terminator.
    ///
    /// Blocks for as long as the server keeps the connection open without
    /// sending the terminator, bounded only by the read timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails or times out, if the peer closes the
    /// connection first, or if the reply exceeds [`MAX_RESPONSE_SIZE`].
    pub async fn read_until_terminator(&mut self) -> Result<BytesMut> {
        let mut data = BytesMut::with_capacity(CHUNK_SIZE);
        let mut chunk = [0u8; CHUNK_SIZE];

        loop {
            let n = self.timed_read(&mut chunk).await?;
            if n == 0 {
                return Err(Error::ConnectionClosed(data.len()));
            }

            data.extend_from_slice(&chunk[..n]);
            if has_dot_terminator(&data) {
                return Ok(data);
            }

            if data.len() > MAX_RESPONSE_SIZE {
                return Err(Error::ResponseTooLarge(MAX_RESPONSE_SIZE));
            }
        }
    }

    /// Shuts down the write half.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown fails.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner.shutdown().await?;
        Ok(())
    }

    async fn timed_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.read(buf))
                .await
                .map_err(|_| Error::Timeout(limit))?
                .map_err(Error::from),
            None => Ok(self.inner.read(buf).await?),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn read_chunk_returns_one_read() {
        let mock = Builder::new().read(b"220 ready\r\n").read(b"250 ok\r\n").build();
        let mut stream = ProbeStream::new(mock);

        assert_eq!(stream.read_chunk().await.unwrap(), b"220 ready\r\n");
        assert_eq!(stream.read_chunk().await.unwrap(), b"250 ok\r\n");
    }

    #[tokio::test]
    async fn read_chunk_does_not_accumulate() {
        let mock = Builder::new().read(b"250-first\r\n").read(b"250 last\r\n").build();
        let mut stream = ProbeStream::new(mock);

        assert_eq!(stream.read_chunk().await.unwrap(), b"250-first\r\n");
        assert_eq!(stream.read_chunk().await.unwrap(), b"250 last\r\n");
    }

    #[tokio::test]
    async fn read_chunk_caps_at_chunk_size() {
        let big = vec![b'x'; CHUNK_SIZE + 10];
        let mock = Builder::new().read(&big).build();
        let mut stream = ProbeStream::new(mock);

        assert_eq!(stream.read_chunk().await.unwrap().len(), CHUNK_SIZE);
        assert_eq!(stream.read_chunk().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn read_until_terminator_joins_chunks() {
        let mock = Builder::new()
            .read(b"+OK 2 messages\r\n1 120\r\n")
            .read(b"2 80\r\n.")
            .read(b"\r\n")
            .build();
        let mut stream = ProbeStream::new(mock);

        let data = stream.read_until_terminator().await.unwrap();
        assert_eq!(&data[..], b"+OK 2 messages\r\n1 120\r\n2 80\r\n.\r\n");
    }

    #[tokio::test]
    async fn read_until_terminator_accepts_bare_newlines() {
        let mock = Builder::new().read(b"+OK\nbody\n.\n").build();
        let mut stream = ProbeStream::new(mock);

        let data = stream.read_until_terminator().await.unwrap();
        assert_eq!(&data[..], b"+OK\nbody\n.\n");
    }

    #[tokio::test]
    async fn read_until_terminator_fails_on_eof() {
        let mock = Builder::new().read(b"+OK\r\n1 120\r\n").build();
        let mut stream = ProbeStream::new(mock);

        let err = stream.read_until_terminator().await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed(12)));
    }

    #[tokio::test]
    async fn send_writes_exact_bytes() {
        let mock = Builder::new().write(b"LIST\r\n").build();
        let mut stream = ProbeStream::new(mock);

        stream.send(b"LIST\r\n").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn read_times_out() {
        let (client, _server) = tokio::io::duplex(64);
        let mut stream = ProbeStream::new(client).with_read_timeout(Some(Duration::from_secs(30)));

        let err = stream.read_chunk().await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn terminator_wait_times_out() {
        let (client, mut server) = tokio::io::duplex(64);
        server.write_all(b"+OK\r\n1 120\r\n").await.unwrap();
        let mut stream = ProbeStream::new(client).with_read_timeout(Some(Duration::from_secs(30)));

        let err = stream.read_until_terminator().await.unwrap_err();
        assert!(matches!(err, Error::Timeout(d) if d == Duration::from_secs(30)));
    }
}
