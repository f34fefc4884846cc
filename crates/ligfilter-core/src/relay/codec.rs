use super::error::RelayError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

/// Reads newline-delimited JSON frames.
pub struct FrameReader<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Returns the next decoded frame, or `None` once the peer has closed the stream.
    ///
    /// Blank lines are skipped. A line that fails to decode yields
    /// [`RelayError::Malformed`] without closing the reader, so callers may skip it.
    pub async fn next<T: DeserializeOwned>(&mut self) -> Result<Option<T>, RelayError> {
        loop {
            match self.lines.next_line().await? {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(serde_json::from_str(&line)?)),
            }
        }
    }
}

/// Writes newline-delimited JSON frames, flushing after each one.
pub struct FrameWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub async fn send<T: Serialize>(&mut self, frame: &T) -> Result<(), RelayError> {
        let mut line = serde_json::to_vec(frame)?;
        line.push(b'\n');
        self.inner.write_all(&line).await?;
        self.inner.flush().await?;
        Ok(())
    }
}
