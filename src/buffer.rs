//! Fixed-capacity byte buffers that are handed back and forth between a channel and the
//!  application's byte targets and sources.
//!
//! Their salient points are:
//!
//! * backed by a pre-allocated buffer whose capacity never changes, so "is this buffer full"
//!   and "how much can it take" are well-defined (unlike a growable `BytesMut`)
//! * implement `BufMut` to fit into the `bytes` ecosystem
//! * ownership moves with the buffer: a channel holds a receive buffer until it is full and then
//!   gives it back, and it passes a transmit buffer on until it was written to the transport

use std::borrow::Borrow;
use std::fmt::{Debug, Formatter};
use bytes::buf::UninitSlice;

/// A fixed-length dynamically allocated buffer
#[derive(Eq, Clone)]
pub struct FixedBuf {
    buf: Vec<u8>,
    len: usize,
}
impl FixedBuf {
    /// create a new FixedBuf instance with the given buffer capacity
    pub fn new(capacity: usize) -> FixedBuf {
        FixedBuf {
            buf: vec![0; capacity],
            len: 0,
        }
    }

    /// a buffer that is filled completely with the given data
    pub fn from_slice(data: &[u8]) -> FixedBuf {
        FixedBuf {
            buf: data.to_vec(),
            len: data.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// the number of bytes that can still be written into the buffer
    pub fn remaining_capacity(&self) -> usize {
        self.buf.len() - self.len
    }

    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// The unfilled part of the buffer, for readers that copy data into it directly. Written
    ///  data becomes part of the buffer's contents only after a call to [FixedBuf::advance].
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.len..]
    }

    pub fn advance(&mut self, cnt: usize) {
        assert!(self.len + cnt <= self.capacity(), "advancing by {} would exceed the buffer's capacity", cnt);
        self.len += cnt;
    }
}

impl PartialEq for FixedBuf {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref().eq(other.as_ref())
    }
}

impl Debug for FixedBuf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "FixedBuf[{}/{}]{:?}", self.len, self.capacity(), self.as_ref())
    }
}

impl Borrow<[u8]> for FixedBuf {
    fn borrow(&self) -> &[u8] {
        self.as_ref()
    }
}

impl AsRef<[u8]> for FixedBuf {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}
impl AsMut<[u8]> for FixedBuf {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }
}

unsafe impl bytes::BufMut for FixedBuf {
    fn remaining_mut(&self) -> usize {
        self.buf.len() - self.len
    }

    unsafe fn advance_mut(&mut self, cnt: usize) {
        self.advance(cnt);
    }

    fn chunk_mut(&mut self) -> &mut UninitSlice {
        UninitSlice::new(&mut self.buf[self.len..])
    }
}
