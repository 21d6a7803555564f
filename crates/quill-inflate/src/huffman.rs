//! Canonical huffman decode tables
//!
//! A table here is one flat array indexed by the next `table_bits`
//! bits of input, each entry packing the symbol with its codeword
//! length. Tables are rebuilt from scratch for every block that
//! declares codes, nothing is shared between blocks.

use crate::bitstream::BitStreamReader;
use crate::constants::MAX_CODEWORD_LENGTH;
use crate::errors::InflateError;

/// Bit position of the codeword length inside a table entry, the low
/// bits hold the symbol.
const LENGTH_SHIFT: u16 = 12;

pub(crate) struct HuffmanTable
{
    entries:    Vec<u16>,
    table_bits: usize
}

impl HuffmanTable
{
    /// Build a decode table from the codeword length of every symbol.
    ///
    /// A zero length marks an absent symbol. Length sets that claim
    /// more codespace than exists are rejected here, incomplete sets
    /// leave unreachable entries that fail at the point of use.
    pub fn from_lengths(lens: &[u8]) -> Result<HuffmanTable, InflateError>
    {
        let mut len_counts = [0_u32; MAX_CODEWORD_LENGTH + 1];

        for len in lens
        {
            len_counts[usize::from(*len)] += 1;
        }
        len_counts[0] = 0;

        // A codeword of length n claims 1/2^n of the codespace, reject
        // length sets that claim more than all of it.
        let mut codespace_used = 0_u32;

        for count in &len_counts[1..]
        {
            codespace_used = (codespace_used << 1) + count;
        }
        if codespace_used > 1 << MAX_CODEWORD_LENGTH
        {
            return Err(InflateError::Corrupt("over-subscribed huffman code lengths"));
        }

        // the longest length actually used decides the table size
        let mut max_len = MAX_CODEWORD_LENGTH;

        while max_len > 0 && len_counts[max_len] == 0
        {
            max_len -= 1;
        }

        let table_bits = max_len.max(1);
        let mut entries = vec![0_u16; 1 << table_bits];

        if max_len == 0
        {
            // no symbols at all, only usable if never consulted
            return Ok(HuffmanTable { entries, table_bits });
        }

        // first canonical codeword of every length
        let mut next_code = [0_u32; MAX_CODEWORD_LENGTH + 1];
        let mut code = 0_u32;

        for len in 1..=max_len
        {
            code = (code + len_counts[len - 1]) << 1;
            next_code[len] = code;
        }

        for (sym, len) in lens.iter().enumerate()
        {
            if *len == 0
            {
                continue;
            }
            let len = usize::from(*len);

            let code = next_code[len];
            next_code[len] += 1;

            // Codewords are defined most significant bit first while the
            // stream hands us bits least significant first, so the
            // codeword is bit-reversed before use as an index.
            let reversed = usize::from((code as u16).reverse_bits() >> (16 - len));
            let entry = ((len as u16) << LENGTH_SHIFT) | sym as u16;

            let mut position = reversed;

            while position < entries.len()
            {
                entries[position] = entry;
                position += 1 << len;
            }
        }

        Ok(HuffmanTable { entries, table_bits })
    }

    /// Decode one symbol off the stream.
    #[inline(always)]
    pub fn decode_symbol(&self, stream: &mut BitStreamReader) -> Result<u16, InflateError>
    {
        stream.refill();

        let entry = self.entries[stream.peek_var_bits(self.table_bits)];

        if entry == 0
        {
            // could be a codeword the table never assigned, or a longer
            // one cut off by the end of input
            if usize::from(stream.bits_left()) < self.table_bits
            {
                return Err(InflateError::InsufficientData);
            }
            return Err(InflateError::Corrupt("invalid huffman codeword"));
        }

        let len = (entry >> LENGTH_SHIFT) as u8;

        if stream.bits_left() < len
        {
            return Err(InflateError::InsufficientData);
        }
        stream.drop_bits(len);

        Ok(entry & ((1 << LENGTH_SHIFT) - 1))
    }
}
