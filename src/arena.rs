//! Fixed-budget session memory.
//!
//! One lint invocation runs entirely inside a [`SessionArena`]: every buffer
//! it needs (the rendered request header, the reusable I/O chunk) is drawn
//! from a single fixed budget that is decided up front and never grows.
//! Exceeding the budget fails the invocation with
//! [`RelintError::ArenaExhausted`], distinct from any I/O error. The arena
//! is reclaimed wholesale when the invocation ends.

use crate::error::{RelintError, Result};

/// Total memory budget for one client invocation.
pub const SESSION_ARENA_CAPACITY: usize = 12 * 1024;

/// Size of the reusable buffer used to stream payload and response chunks.
pub const IO_CHUNK_SIZE: usize = 4 * 1024;

/// Per-invocation allocation budget.
///
/// Allocations are accounted against a fixed capacity; there is no free
/// list and no piecemeal reclamation. Buffers handed out are bounded and
/// refuse to grow past their allocation.
#[derive(Debug)]
pub struct SessionArena {
    capacity: usize,
    used: usize,
}

impl SessionArena {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, used: 0 }
    }

    /// Allocate a zeroed, fixed-length buffer against the budget.
    ///
    /// Used for the streaming chunk buffer, where the full length is read
    /// into and written out of repeatedly.
    pub fn alloc(&mut self, len: usize) -> Result<Box<[u8]>> {
        self.reserve(len)?;
        Ok(vec![0u8; len].into_boxed_slice())
    }

    /// Allocate an empty bounded buffer with the given capacity.
    ///
    /// Used for the request header, which is appended to incrementally and
    /// must fail loudly rather than grow.
    pub fn alloc_buf(&mut self, capacity: usize) -> Result<BoundedBuf> {
        self.reserve(capacity)?;
        Ok(BoundedBuf {
            data: Vec::with_capacity(capacity),
            capacity,
        })
    }

    /// Bytes still available in the budget.
    pub fn remaining(&self) -> usize {
        self.capacity - self.used
    }

    fn reserve(&mut self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(RelintError::ArenaExhausted {
                needed: len,
                remaining: self.remaining(),
                capacity: self.capacity,
            });
        }
        self.used += len;
        Ok(())
    }
}

/// A byte buffer with a hard upper bound.
///
/// Appends past the bound return [`RelintError::ArenaExhausted`] instead of
/// reallocating, so a frame that would not fit is never partially emitted.
#[derive(Debug)]
pub struct BoundedBuf {
    data: Vec<u8>,
    capacity: usize,
}

impl BoundedBuf {
    pub fn push_slice(&mut self, bytes: &[u8]) -> Result<()> {
        if self.data.len() + bytes.len() > self.capacity {
            return Err(RelintError::ArenaExhausted {
                needed: bytes.len(),
                remaining: self.capacity - self.data.len(),
                capacity: self.capacity,
            });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_within_budget() {
        let mut arena = SessionArena::new(1024);
        let buf = arena.alloc(512).unwrap();
        assert_eq!(buf.len(), 512);
        assert_eq!(arena.remaining(), 512);
    }

    #[test]
    fn test_alloc_exhausts_budget() {
        let mut arena = SessionArena::new(1024);
        arena.alloc(1000).unwrap();
        let err = arena.alloc(100).unwrap_err();
        assert!(matches!(
            err,
            RelintError::ArenaExhausted {
                needed: 100,
                remaining: 24,
                capacity: 1024,
            }
        ));
    }

    #[test]
    fn test_exhaustion_is_not_an_io_error() {
        let mut arena = SessionArena::new(16);
        let err = arena.alloc(32).unwrap_err();
        assert!(!matches!(err, RelintError::Io(_)));
        assert_eq!(
            err.exit_code(),
            crate::error::exit_codes::RESOURCE_EXHAUSTED
        );
    }

    #[test]
    fn test_bounded_buf_appends_up_to_capacity() {
        let mut arena = SessionArena::new(64);
        let mut buf = arena.alloc_buf(8).unwrap();
        buf.push_slice(b"abcd").unwrap();
        buf.push_slice(b"efgh").unwrap();
        assert_eq!(buf.as_slice(), b"abcdefgh");
    }

    #[test]
    fn test_bounded_buf_refuses_overflow() {
        let mut arena = SessionArena::new(64);
        let mut buf = arena.alloc_buf(8).unwrap();
        buf.push_slice(b"abcdef").unwrap();
        let err = buf.push_slice(b"ghi").unwrap_err();
        assert!(matches!(err, RelintError::ArenaExhausted { .. }));
        // Nothing partial was appended
        assert_eq!(buf.as_slice(), b"abcdef");
    }

    #[test]
    fn test_session_capacity_holds_header_and_chunk() {
        // The default budget must fit the chunk buffer plus a realistic header
        let mut arena = SessionArena::new(SESSION_ARENA_CAPACITY);
        arena.alloc(IO_CHUNK_SIZE).unwrap();
        assert!(arena.remaining() >= 4096);
    }
}
