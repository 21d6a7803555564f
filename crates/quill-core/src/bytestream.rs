//! A simple implementation of a bytestream reader
//!
//! The container formats we read are sequences of big endian
//! integers and tagged byte runs, this module provides a cursor
//! over them where every read either returns the requested bytes
//! or fails, the cursor never silently hands back defaults.

use core::fmt::{Debug, Formatter};

/// Error returned when a read asks for more bytes than the stream holds.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct EndOfStream
{
    /// Cursor position when the read was attempted
    pub position:  usize,
    /// Number of bytes the read asked for
    pub requested: usize
}

impl Debug for EndOfStream
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result
    {
        write!(
            f,
            "End of stream, requested {} bytes at position {}",
            self.requested, self.position
        )
    }
}

/// An encapsulation of a byte stream
///
/// The lifetime parameter comes from the buffer the
/// stream borrows, the caller owns the bytes for the whole
/// decode call.
pub struct ByteReader<'a>
{
    stream:   &'a [u8],
    position: usize
}

impl<'a> ByteReader<'a>
{
    pub const fn new(stream: &'a [u8]) -> ByteReader<'a>
    {
        ByteReader { stream, position: 0 }
    }

    #[inline(always)]
    fn get_fixed<const N: usize>(&mut self) -> Result<[u8; N], EndOfStream>
    {
        match self
            .stream
            .get(self.position..)
            .and_then(|rest| rest.get(..N))
        {
            Some(bytes) =>
            {
                let mut space = [0; N];
                space.copy_from_slice(bytes);
                self.position += N;

                Ok(space)
            }
            None => Err(EndOfStream {
                position:  self.position,
                requested: N
            })
        }
    }

    pub fn get_u8(&mut self) -> Result<u8, EndOfStream>
    {
        Ok(self.get_fixed::<1>()?[0])
    }

    pub fn get_u16_be(&mut self) -> Result<u16, EndOfStream>
    {
        Ok(u16::from_be_bytes(self.get_fixed::<2>()?))
    }

    pub fn get_u32_be(&mut self) -> Result<u32, EndOfStream>
    {
        Ok(u32::from_be_bytes(self.get_fixed::<4>()?))
    }

    pub fn get_u64_be(&mut self) -> Result<u64, EndOfStream>
    {
        Ok(u64::from_be_bytes(self.get_fixed::<8>()?))
    }

    /// Read exactly `count` bytes, advancing the cursor past them.
    pub fn get(&mut self, count: usize) -> Result<&'a [u8], EndOfStream>
    {
        match self
            .stream
            .get(self.position..)
            .and_then(|rest| rest.get(..count))
        {
            Some(bytes) =>
            {
                self.position += count;
                Ok(bytes)
            }
            None => Err(EndOfStream {
                position:  self.position,
                requested: count
            })
        }
    }

    /// Look at `count` bytes starting `offset` bytes past the cursor
    /// without consuming anything.
    pub fn peek_at(&self, offset: usize, count: usize) -> Result<&'a [u8], EndOfStream>
    {
        match self
            .stream
            .get(self.position..)
            .and_then(|rest| rest.get(offset..))
            .and_then(|rest| rest.get(..count))
        {
            Some(bytes) => Ok(bytes),
            None => Err(EndOfStream {
                position:  self.position.saturating_add(offset),
                requested: count
            })
        }
    }

    /// Skip `count` bytes ahead of the stream.
    pub fn skip(&mut self, count: usize)
    {
        self.position = self.position.saturating_add(count);
    }

    /// Move the cursor `count` bytes back.
    pub fn rewind(&mut self, count: usize)
    {
        self.position = self.position.saturating_sub(count);
    }

    /// Return true if the stream still holds at least `count` bytes.
    pub const fn has(&self, count: usize) -> bool
    {
        self.remaining() >= count
    }

    pub const fn remaining(&self) -> usize
    {
        self.stream.len().saturating_sub(self.position)
    }

    pub const fn position(&self) -> usize
    {
        self.position
    }

    pub const fn len(&self) -> usize
    {
        self.stream.len()
    }

    pub const fn is_empty(&self) -> bool
    {
        self.stream.is_empty()
    }

    pub const fn is_eof(&self) -> bool
    {
        self.remaining() == 0
    }
}
