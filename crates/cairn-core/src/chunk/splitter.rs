//! Streaming fixed-size splitter.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::TRACING_TARGET;
use crate::error::{Error, Result};

/// One plaintext slice produced by a [`ChunkSplitter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSlice {
    /// Ordinal position of the slice, 0-based.
    pub index: usize,
    /// Slice contents.
    pub data: Bytes,
}

/// Splits a byte stream into slices of exactly `chunk_size` bytes, except
/// possibly the last one.
///
/// Only one slice is held in memory at a time. The sequence is finite and
/// cannot be restarted: once [`next_chunk`](Self::next_chunk) returns `None`
/// it keeps returning `None`.
#[derive(Debug)]
pub struct ChunkSplitter<R> {
    reader: R,
    chunk_size: usize,
    next_index: usize,
    bytes_read: u64,
    finished: bool,
}

impl<R> ChunkSplitter<R>
where
    R: AsyncRead + Unpin,
{
    /// Creates a splitter over `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `chunk_size` is zero.
    pub fn new(reader: R, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::invalid_configuration("chunk size must be positive"));
        }

        Ok(Self {
            reader,
            chunk_size,
            next_index: 0,
            bytes_read: 0,
            finished: false,
        })
    }

    /// Total bytes consumed from the reader so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Reads the next slice, or `None` once the stream is exhausted.
    ///
    /// Short reads from the underlying reader are retried until the slice is
    /// full or the reader reports end of stream.
    pub async fn next_chunk(&mut self) -> Result<Option<ChunkSlice>> {
        if self.finished {
            return Ok(None);
        }

        let mut buffer = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < self.chunk_size {
            let n = self.reader.read(&mut buffer[filled..]).await?;
            if n == 0 {
                self.finished = true;
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }

        buffer.truncate(filled);
        self.bytes_read += filled as u64;

        let slice = ChunkSlice {
            index: self.next_index,
            data: Bytes::from(buffer),
        };
        self.next_index += 1;

        tracing::trace!(
            target: TRACING_TARGET,
            index = slice.index,
            size = slice.data.len(),
            "Read chunk slice"
        );

        Ok(Some(slice))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    use super::*;

    async fn drain<R: AsyncRead + Unpin>(mut splitter: ChunkSplitter<R>) -> Vec<ChunkSlice> {
        let mut slices = Vec::new();
        while let Some(slice) = splitter.next_chunk().await.unwrap() {
            slices.push(slice);
        }
        slices
    }

    async fn collect(data: &[u8], chunk_size: usize) -> Vec<ChunkSlice> {
        drain(ChunkSplitter::new(Cursor::new(data.to_vec()), chunk_size).unwrap()).await
    }

    /// Reader that returns at most 3 bytes per call.
    struct Trickle(Cursor<Vec<u8>>);

    impl AsyncRead for Trickle {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            let mut small = [0u8; 3];
            let limit = small.len().min(buf.remaining());
            let mut inner = ReadBuf::new(&mut small[..limit]);
            match Pin::new(&mut self.0).poll_read(cx, &mut inner) {
                Poll::Ready(Ok(())) => {
                    buf.put_slice(inner.filled());
                    Poll::Ready(Ok(()))
                }
                other => other,
            }
        }
    }

    #[tokio::test]
    async fn splits_ten_bytes_by_four() {
        let slices = collect(b"0123456789", 4).await;

        let sizes: Vec<_> = slices.iter().map(|s| s.data.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);

        let indices: Vec<_> = slices.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn concatenation_reproduces_input() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        for chunk_size in [1, 7, 64, 999, 1000, 4096] {
            let slices = collect(&data, chunk_size).await;
            assert_eq!(slices.len() as u64, (data.len() as u64).div_ceil(chunk_size as u64));

            let joined: Vec<u8> = slices.iter().flat_map(|s| s.data.to_vec()).collect();
            assert_eq!(joined, data);
        }
    }

    #[tokio::test]
    async fn evenly_divisible_last_chunk_is_full() {
        let slices = collect(&[1u8; 12], 4).await;
        assert_eq!(slices.len(), 3);
        assert!(slices.iter().all(|s| s.data.len() == 4));
    }

    #[tokio::test]
    async fn empty_stream_yields_nothing() {
        assert!(collect(b"", 4).await.is_empty());
    }

    #[tokio::test]
    async fn short_reads_do_not_shorten_chunks() {
        let reader = Trickle(Cursor::new(b"abcdefghij".to_vec()));
        let mut splitter = ChunkSplitter::new(reader, 8).unwrap();

        let first = splitter.next_chunk().await.unwrap().unwrap();
        assert_eq!(first.data.as_ref(), b"abcdefgh");
        let second = splitter.next_chunk().await.unwrap().unwrap();
        assert_eq!(second.data.as_ref(), b"ij");
        assert!(splitter.next_chunk().await.unwrap().is_none());
        assert!(splitter.next_chunk().await.unwrap().is_none());
        assert_eq!(splitter.bytes_read(), 10);
    }

    #[tokio::test]
    async fn short_reads_lose_no_bytes() {
        let data: Vec<u8> = (0..100u8).collect();
        for chunk_size in [1, 2, 4, 5, 8, 100] {
            let reader = Trickle(Cursor::new(data.clone()));
            let slices = drain(ChunkSplitter::new(reader, chunk_size).unwrap()).await;

            assert!(slices[..slices.len() - 1].iter().all(|s| s.data.len() == chunk_size));
            let joined: Vec<u8> = slices.iter().flat_map(|s| s.data.to_vec()).collect();
            assert_eq!(joined, data, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let result = ChunkSplitter::new(Cursor::new(Vec::new()), 0);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }
}
