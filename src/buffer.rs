//! Growable byte buffer with a read cursor (§4.A).
//!
//! All multi-byte integers on the wire are big-endian. Every access to the
//! underlying storage goes through a named helper; nothing here hands out a
//! raw pointer or slice into uninitialized memory.

use crate::error::Error;

/// A byte sequence plus a read cursor into it.
///
/// Bytes before the cursor have already been consumed by a reader; bytes
/// from the cursor onward are unread. `append` always extends the tail.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
    cursor: usize,
}

impl Buffer {
    pub fn new() -> Buffer {
        Buffer::default()
    }

    pub fn from_vec(data: Vec<u8>) -> Buffer {
        Buffer { data, cursor: 0 }
    }

    /// Append bytes to the tail of the buffer.
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Insert bytes at the head, ahead of the cursor. Used to push back
    /// bytes that were over-read (e.g. while reassembling padded frames).
    pub fn prepend(&mut self, bytes: &[u8]) {
        self.data.splice(self.cursor..self.cursor, bytes.iter().copied());
    }

    /// Number of unread bytes remaining.
    pub fn size(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn empty(&self) -> bool {
        self.size() == 0
    }

    /// Read `n` unread bytes without advancing the cursor.
    pub fn peek(&self, n: usize) -> Result<&[u8], Error> {
        if self.size() < n {
            return Err(Error::compression("buffer underrun"));
        }
        Ok(&self.data[self.cursor..self.cursor + n])
    }

    /// Read and consume `n` bytes.
    pub fn read(&mut self, n: usize) -> Result<&[u8], Error> {
        if self.size() < n {
            return Err(Error::compression("buffer underrun"));
        }
        let start = self.cursor;
        self.cursor += n;
        Ok(&self.data[start..self.cursor])
    }

    /// Read and consume a single byte.
    pub fn getbyte(&mut self) -> Result<u8, Error> {
        Ok(self.read(1)?[0])
    }

    /// Read and consume a big-endian u32, advancing the cursor by 4.
    pub fn read_uint32(&mut self) -> Result<u32, Error> {
        let b = self.read(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read and consume a big-endian u16, advancing the cursor by 2.
    pub fn read_uint16(&mut self) -> Result<u16, Error> {
        let b = self.read(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// A non-owning view of `n` unread bytes starting `off` bytes past the
    /// cursor, without consuming anything.
    pub fn slice(&self, off: usize, n: usize) -> Result<&[u8], Error> {
        if self.size() < off + n {
            return Err(Error::compression("buffer underrun"));
        }
        let start = self.cursor + off;
        Ok(&self.data[start..start + n])
    }

    /// Drop consumed bytes ahead of the cursor, compacting storage. Call
    /// this periodically on a long-lived connection buffer so it does not
    /// grow without bound.
    pub fn compact(&mut self) {
        if self.cursor > 0 {
            self.data.drain(..self.cursor);
            self.cursor = 0;
        }
    }

    /// All unread bytes as a contiguous slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.cursor..]
    }

    /// Consume and return all remaining unread bytes.
    pub fn take_rest(&mut self) -> Vec<u8> {
        let rest = self.data[self.cursor..].to_vec();
        self.cursor = self.data.len();
        rest
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Buffer {
        Buffer::from_vec(data)
    }
}
