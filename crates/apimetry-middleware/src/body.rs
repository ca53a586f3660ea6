//! Re-readable body cache.
//!
//! HTTP request bodies support exactly one sequential read pass. The
//! interception pipeline needs the body twice — once for the telemetry
//! attribute and once for the handler — so [`CachedBody`] buffers the
//! underlying source on the first read and serves every later read from the
//! buffer. The source is drained at most once, no matter how many logical
//! readers ask for the body.

use bytes::{Bytes, BytesMut};
use std::io::Read;
use thiserror::Error;

/// Chunk size for draining the underlying source.
const READ_CHUNK_SIZE: usize = 16 * 1024;

/// Errors raised by [`CachedBody::read`].
#[derive(Error, Debug)]
pub enum BodyError {
    /// The underlying source failed before it was fully consumed.
    ///
    /// Nothing is committed to the cache in this case: there is no silent
    /// partial body.
    #[error("failed to buffer request body: {0}")]
    Source(#[from] std::io::Error),

    /// A previous buffering attempt already failed and consumed the source.
    #[error("request body source already consumed by a failed read")]
    Consumed,
}

/// A buffering decorator over a single-consumption byte source.
///
/// The first [`read`](CachedBody::read) drains the source to exhaustion in
/// 16 KiB chunks and stores the result; subsequent reads return an
/// independent [`Bytes`] view over the stored buffer without touching the
/// source again.
///
/// Sequential calls within one request's flow of control are supported;
/// concurrent calls on the same request are not a supported usage pattern.
///
/// # Example
///
/// ```
/// use apimetry_middleware::body::CachedBody;
/// use std::io::Cursor;
///
/// let mut body = CachedBody::new(Cursor::new(br#"{"a":1}"#.to_vec()));
/// let first = body.read().unwrap();
/// let second = body.read().unwrap();
/// assert_eq!(first, second);
/// ```
pub struct CachedBody {
    /// The one-pass source. Taken on the first read attempt.
    source: Option<Box<dyn Read + Send>>,

    /// The fully buffered body, populated exactly once.
    cached: Option<Bytes>,
}

impl CachedBody {
    /// Wraps a one-pass byte source.
    #[must_use]
    pub fn new(source: impl Read + Send + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            cached: None,
        }
    }

    /// Creates an already-buffered body.
    ///
    /// Used when the transport layer has collected the byte stream itself
    /// (that collection being the single drain of the network source).
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            source: None,
            cached: Some(bytes.into()),
        }
    }

    /// Creates an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// Returns whether the body has been buffered.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Returns the full body bytes.
    ///
    /// The first call drains the underlying source; later calls return a
    /// cheap view over the stored buffer. If the source fails mid-read the
    /// cache stays unpopulated and every later call reports
    /// [`BodyError::Consumed`], so a truncated body is never served.
    pub fn read(&mut self) -> Result<Bytes, BodyError> {
        if let Some(cached) = &self.cached {
            return Ok(cached.clone());
        }

        // Take the source so a failed drain can never be retried against a
        // half-consumed stream.
        let mut source = self.source.take().ok_or(BodyError::Consumed)?;

        let mut buffer = BytesMut::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match source.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(BodyError::Source(e)),
            }
        }

        let bytes = buffer.freeze();
        self.cached = Some(bytes.clone());
        Ok(bytes)
    }
}

impl Default for CachedBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for CachedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedBody")
            .field("cached_len", &self.cached.as_ref().map(Bytes::len))
            .field("source_pending", &self.source.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    /// A source that panics the test if it is ever drained twice.
    struct SingleUseSource {
        inner: Cursor<Vec<u8>>,
        exhausted: bool,
    }

    impl SingleUseSource {
        fn new(data: &[u8]) -> Self {
            Self {
                inner: Cursor::new(data.to_vec()),
                exhausted: false,
            }
        }
    }

    impl Read for SingleUseSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.exhausted {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "source consumed twice",
                ));
            }
            let n = self.inner.read(buf)?;
            if n == 0 {
                self.exhausted = true;
            }
            Ok(n)
        }
    }

    /// A source that fails partway through the stream.
    struct FailingSource {
        served: bool,
    }

    impl Read for FailingSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "closed early",
                ))
            } else {
                self.served = true;
                buf[..4].copy_from_slice(b"part");
                Ok(4)
            }
        }
    }

    #[test]
    fn test_read_returns_full_body() {
        let mut body = CachedBody::new(Cursor::new(br#"{"a":1}"#.to_vec()));
        let bytes = body.read().unwrap();
        assert_eq!(&bytes[..], br#"{"a":1}"#);
    }

    #[test]
    fn test_second_read_is_identical_and_skips_source() {
        let mut body = CachedBody::new(SingleUseSource::new(br#"{"a":1}"#));

        let first = body.read().unwrap();
        // SingleUseSource errors if touched again after exhaustion, so a
        // second successful read proves the source is never re-drained.
        let second = body.read().unwrap();

        assert_eq!(first, second);
        assert_eq!(&second[..], br#"{"a":1}"#);
    }

    #[test]
    fn test_large_body_spans_multiple_chunks() {
        let data = vec![0xabu8; READ_CHUNK_SIZE * 3 + 17];
        let mut body = CachedBody::new(Cursor::new(data.clone()));
        let bytes = body.read().unwrap();
        assert_eq!(bytes.len(), data.len());
        assert_eq!(&bytes[..], &data[..]);
    }

    #[test]
    fn test_failed_read_commits_nothing() {
        let mut body = CachedBody::new(FailingSource { served: false });

        let err = body.read().unwrap_err();
        assert!(matches!(err, BodyError::Source(_)));
        assert!(!body.is_cached());

        // Later attempts keep failing rather than serving a partial body.
        let err = body.read().unwrap_err();
        assert!(matches!(err, BodyError::Consumed));
    }

    #[test]
    fn test_from_bytes_never_touches_a_source() {
        let mut body = CachedBody::from_bytes(Bytes::from_static(b"hello"));
        assert!(body.is_cached());
        assert_eq!(&body.read().unwrap()[..], b"hello");
    }

    #[test]
    fn test_empty_body() {
        let mut body = CachedBody::empty();
        assert!(body.read().unwrap().is_empty());
    }
}
