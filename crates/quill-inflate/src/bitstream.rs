//! `BitStreamReader` API
//!
//! This module provides an interface to read bits (and byte runs) for
//! huffman decoding. Deflate packs bits least significant first, so the
//! buffer is filled from the low end and consumed from the low end.

pub(crate) struct BitStreamReader<'src>
{
    // buffer we are pulling bits from
    src:      &'src [u8],
    // next byte to be fed into the bit buffer
    position: usize,

    bits_left: u8,
    buffer:    u64
}

impl<'src> BitStreamReader<'src>
{
    pub fn new(in_buffer: &'src [u8]) -> BitStreamReader<'src>
    {
        BitStreamReader {
            bits_left: 0,
            buffer:    0,
            src:       in_buffer,
            position:  0
        }
    }

    /// Top the bit buffer up to at least 56 bits, stopping early when
    /// the input runs out.
    ///
    /// Bits past the end of the input never appear in the buffer, the
    /// consumer sees exactly `bits_left` valid bits.
    #[inline(always)]
    pub fn refill(&mut self)
    {
        while self.bits_left < 56
        {
            match self.src.get(self.position)
            {
                Some(byte) =>
                {
                    self.buffer |= u64::from(*byte) << self.bits_left;
                    self.bits_left += 8;
                    self.position += 1;
                }
                None => break
            }
        }
    }

    /// Look at the next `lookahead` bits without consuming them.
    ///
    /// Bits past the end of the buffered input read as zero.
    #[inline(always)]
    pub fn peek_var_bits(&self, lookahead: usize) -> usize
    {
        (self.buffer & ((1 << lookahead) - 1)) as usize
    }

    /// Consume `num_bits` bits and return them.
    ///
    /// The caller must have checked availability, see [`has`](Self::has).
    #[inline(always)]
    pub fn get_bits(&mut self, num_bits: u8) -> u64
    {
        debug_assert!(self.bits_left >= num_bits);

        let mask = (1_u64 << num_bits) - 1;
        let value = self.buffer & mask;

        self.buffer >>= num_bits;
        self.bits_left -= num_bits;

        value
    }

    #[inline(always)]
    pub fn drop_bits(&mut self, bits: u8)
    {
        debug_assert!(self.bits_left >= bits);

        self.bits_left -= bits;
        self.buffer >>= bits;
    }

    /// Return true if the bit buffer can satisfy a `bits` wide read
    /// without refilling.
    pub const fn has(&self, bits: u8) -> bool
    {
        self.bits_left >= bits
    }

    /// Number of valid bits currently buffered.
    pub const fn bits_left(&self) -> u8
    {
        self.bits_left
    }

    /// Throw away buffered bits up to the next byte boundary.
    pub fn align_to_byte(&mut self)
    {
        let partial = self.bits_left & 7;

        self.buffer >>= partial;
        self.bits_left -= partial;
    }

    /// Hand out `count` raw bytes starting at the current position and
    /// leave the bit buffer empty right after them.
    ///
    /// Only valid on a byte aligned stream, returns `None` when fewer
    /// than `count` bytes remain.
    pub fn get_aligned_bytes(&mut self, count: usize) -> Option<&'src [u8]>
    {
        debug_assert!(self.bits_left & 7 == 0);

        // bytes prefetched into the bit buffer but not yet consumed
        let start = self.position - usize::from(self.bits_left >> 3);

        match self.src.get(start..).and_then(|rest| rest.get(..count))
        {
            Some(bytes) =>
            {
                self.position = start + count;
                self.buffer = 0;
                self.bits_left = 0;

                Some(bytes)
            }
            None => None
        }
    }
}
