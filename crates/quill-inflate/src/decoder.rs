//! Deflate and zlib stream decoding

use simd_adler32::Adler32;

use crate::bitstream::BitStreamReader;
use crate::constants::{
    BLOCKTYPE_DYNAMIC, BLOCKTYPE_STATIC, BLOCKTYPE_UNCOMPRESSED, DISTANCE_BASE,
    DISTANCE_EXTRA_BITS, END_OF_BLOCK, LENGTH_BASE, LENGTH_EXTRA_BITS, NUM_LITLEN_SYMS,
    NUM_PRECODE_SYMS, PRECODE_LENS_PERMUTATION
};
use crate::errors::InflateError;
use crate::huffman::HuffmanTable;

/// Options influencing how [`DeflateDecoder`] treats a stream
#[derive(Debug, Copy, Clone)]
pub struct DeflateOptions
{
    confirm_adler: bool,
    size_hint:     usize,
    limit:         usize
}

impl Default for DeflateOptions
{
    fn default() -> Self
    {
        Self {
            confirm_adler: true,
            size_hint:     0,
            limit:         1 << 30
        }
    }
}

impl DeflateOptions
{
    /// Choose whether the adler checksum of a zlib wrapped stream is
    /// verified after decompression
    pub fn set_confirm_checksum(mut self, yes: bool) -> Self
    {
        self.confirm_adler = yes;
        self
    }

    /// Number of output bytes to reserve up front.
    ///
    /// Deflate does not store the decompressed size, callers that can
    /// derive it from an outer container should pass it here.
    pub fn set_size_hint(mut self, hint: usize) -> Self
    {
        self.size_hint = hint;
        self
    }

    /// Hard ceiling on the decompressed size, streams that try to
    /// produce more fail with
    /// [`OutputTooLarge`](InflateError::OutputTooLarge)
    pub fn set_limit(mut self, limit: usize) -> Self
    {
        self.limit = limit;
        self
    }
}

/// A deflate decoder over a borrowed byte slice.
///
/// One instance decodes one stream, the output is handed back by value
/// from [`decode_zlib`](Self::decode_zlib) or
/// [`decode_deflate`](Self::decode_deflate).
pub struct DeflateDecoder<'a>
{
    data:          &'a [u8],
    options:       DeflateOptions,
    stream:        BitStreamReader<'a>,
    out:           Vec<u8>,
    is_last_block: bool
}

impl<'a> DeflateDecoder<'a>
{
    pub fn new(data: &'a [u8]) -> DeflateDecoder<'a>
    {
        DeflateDecoder::new_with_options(data, DeflateOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DeflateOptions) -> DeflateDecoder<'a>
    {
        DeflateDecoder {
            data,
            options,
            stream: BitStreamReader::new(data),
            out: Vec::new(),
            is_last_block: false
        }
    }

    /// Decode a zlib wrapped deflate stream, RFC 1950.
    ///
    /// The trailing adler checksum is verified against the produced
    /// bytes unless the options say otherwise.
    pub fn decode_zlib(&mut self) -> Result<Vec<u8>, InflateError>
    {
        if self.data.len() < 2 /* zlib header */ + 4 /* adler32 */
        {
            return Err(InflateError::InsufficientData);
        }

        // Zlib flags
        // See https://www.ietf.org/rfc/rfc1950.txt for the RFC
        let cmf = self.data[0];
        let flg = self.data[1];

        let cm = cmf & 0xF;
        let cinfo = cmf >> 4;

        if cm != 8
        {
            return Err(InflateError::Corrupt("unknown zlib compression method, expected 8"));
        }
        if cinfo > 7
        {
            return Err(InflateError::Corrupt("zlib window size above 32 KiB, not allowed"));
        }

        let flag_checks = (u16::from(cmf) * 256) + u16::from(flg);

        if flag_checks % 31 != 0
        {
            return Err(InflateError::Corrupt("FCHECK integrity not preserved"));
        }
        if (flg >> 5) & 1 != 0
        {
            return Err(InflateError::Corrupt("zlib preset dictionaries are not supported"));
        }

        // the deflate payload sits between the two header bytes and the
        // four adler bytes
        self.stream = BitStreamReader::new(&self.data[2..self.data.len() - 4]);
        self.decode_blocks()?;

        if self.options.confirm_adler
        {
            let trailer: [u8; 4] = self.data[self.data.len() - 4..].try_into().unwrap();
            let expected = u32::from_be_bytes(trailer);

            let mut hash = Adler32::new();
            hash.write(&self.out);
            let found = hash.finish();

            if expected != found
            {
                return Err(InflateError::MismatchedAdler { expected, found });
            }
        }

        Ok(std::mem::take(&mut self.out))
    }

    /// Decode a raw deflate stream, RFC 1951, with no wrapper around it.
    pub fn decode_deflate(&mut self) -> Result<Vec<u8>, InflateError>
    {
        self.stream = BitStreamReader::new(self.data);
        self.decode_blocks()?;

        Ok(std::mem::take(&mut self.out))
    }

    fn decode_blocks(&mut self) -> Result<(), InflateError>
    {
        self.out.reserve(self.options.size_hint);

        loop
        {
            let header = self.read_bits(3)?;

            self.is_last_block = header & 1 == 1;
            let block_type = header >> 1;

            match block_type
            {
                BLOCKTYPE_UNCOMPRESSED => self.stored_block()?,
                BLOCKTYPE_STATIC =>
                {
                    let (litlen_table, dist_table) = Self::static_tables()?;
                    self.compressed_block(&litlen_table, &dist_table)?;
                }
                BLOCKTYPE_DYNAMIC =>
                {
                    let (litlen_table, dist_table) = self.dynamic_tables()?;
                    self.compressed_block(&litlen_table, &dist_table)?;
                }
                _ => return Err(InflateError::Corrupt("reserved block type in deflate stream"))
            }

            if self.is_last_block
            {
                break;
            }
        }
        Ok(())
    }

    /// Refill and pull `num_bits` off the stream, erroring when the
    /// input cannot satisfy the read.
    fn read_bits(&mut self, num_bits: u8) -> Result<u64, InflateError>
    {
        self.stream.refill();

        if !self.stream.has(num_bits)
        {
            return Err(InflateError::InsufficientData);
        }
        Ok(self.stream.get_bits(num_bits))
    }

    /// Copy a stored block straight to the output.
    fn stored_block(&mut self) -> Result<(), InflateError>
    {
        // stored blocks restart at the next byte boundary
        self.stream.align_to_byte();

        let len = self.read_bits(16)? as usize;
        let nlen = self.read_bits(16)? as usize;

        if len != (!nlen & 0xFFFF)
        {
            return Err(InflateError::Corrupt("stored block length does not match its complement"));
        }

        if self.out.len() + len > self.options.limit
        {
            return Err(InflateError::OutputTooLarge {
                limit: self.options.limit,
                size:  self.out.len() + len
            });
        }

        let bytes = self
            .stream
            .get_aligned_bytes(len)
            .ok_or(InflateError::InsufficientData)?;

        self.out.extend_from_slice(bytes);

        Ok(())
    }

    /// The fixed code described by RFC 1951 3.2.6.
    fn static_tables() -> Result<(HuffmanTable, HuffmanTable), InflateError>
    {
        let mut lens = [0_u8; NUM_LITLEN_SYMS];

        lens[000..144].fill(8);
        lens[144..256].fill(9);
        lens[256..280].fill(7);
        lens[280..288].fill(8);

        let litlen_table = HuffmanTable::from_lengths(&lens)?;
        let dist_table = HuffmanTable::from_lengths(&[5_u8; 30])?;

        Ok((litlen_table, dist_table))
    }

    /// Read the code length declarations off a dynamic block header and
    /// build both decode tables from them.
    fn dynamic_tables(&mut self) -> Result<(HuffmanTable, HuffmanTable), InflateError>
    {
        let num_litlen_syms = 257 + self.read_bits(5)? as usize;
        let num_dist_syms = 1 + self.read_bits(5)? as usize;
        let num_explicit_precode_lens = 4 + self.read_bits(4)? as usize;

        if num_litlen_syms > 286
        {
            return Err(InflateError::Corrupt("too many literal/length symbols declared"));
        }
        if num_dist_syms > 32
        {
            return Err(InflateError::Corrupt("too many distance symbols declared"));
        }

        let mut precode_lens = [0_u8; NUM_PRECODE_SYMS];

        for i in PRECODE_LENS_PERMUTATION
            .iter()
            .take(num_explicit_precode_lens)
        {
            precode_lens[usize::from(*i)] = self.read_bits(3)? as u8;
        }

        let precode_table = HuffmanTable::from_lengths(&precode_lens)?;

        // litlen and distance lengths are run length coded as one
        // sequence
        let total = num_litlen_syms + num_dist_syms;
        let mut lens = [0_u8; 286 + 32];
        let mut i = 0;

        while i < total
        {
            let presym = precode_table.decode_symbol(&mut self.stream)?;

            if presym < 16
            {
                // explicit codeword length
                lens[i] = presym as u8;
                i += 1;
                continue;
            }

            let (rep_val, rep_count) = match presym
            {
                16 =>
                {
                    // repeat the previous length 3 to 6 times
                    if i == 0
                    {
                        return Err(InflateError::Corrupt("length repeat with no previous length"));
                    }
                    (lens[i - 1], 3 + self.read_bits(2)? as usize)
                }
                // repeat zero 3 to 10 times
                17 => (0, 3 + self.read_bits(3)? as usize),
                // repeat zero 11 to 138 times
                18 => (0, 11 + self.read_bits(7)? as usize),
                _ => return Err(InflateError::Corrupt("invalid precode symbol"))
            };

            if i + rep_count > total
            {
                return Err(InflateError::Corrupt("code length repeat overflows the symbol count"));
            }
            lens[i..i + rep_count].fill(rep_val);
            i += rep_count;
        }

        let litlen_table = HuffmanTable::from_lengths(&lens[..num_litlen_syms])?;
        let dist_table = HuffmanTable::from_lengths(&lens[num_litlen_syms..total])?;

        Ok((litlen_table, dist_table))
    }

    /// Decode literal and match symbols until the end of block marker.
    fn compressed_block(
        &mut self, litlen_table: &HuffmanTable, dist_table: &HuffmanTable
    ) -> Result<(), InflateError>
    {
        let limit = self.options.limit;

        loop
        {
            let symbol = litlen_table.decode_symbol(&mut self.stream)?;

            if symbol < END_OF_BLOCK
            {
                if self.out.len() >= limit
                {
                    return Err(InflateError::OutputTooLarge {
                        limit,
                        size: self.out.len() + 1
                    });
                }
                self.out.push(symbol as u8);
                continue;
            }
            if symbol == END_OF_BLOCK
            {
                return Ok(());
            }
            if symbol > 285
            {
                return Err(InflateError::Corrupt("invalid literal/length symbol"));
            }

            let length_index = usize::from(symbol - 257);
            let length = usize::from(LENGTH_BASE[length_index])
                + self.read_bits(LENGTH_EXTRA_BITS[length_index])? as usize;

            let dist_symbol = usize::from(dist_table.decode_symbol(&mut self.stream)?);

            if dist_symbol > 29
            {
                return Err(InflateError::Corrupt("invalid distance symbol"));
            }

            let distance = usize::from(DISTANCE_BASE[dist_symbol])
                + self.read_bits(DISTANCE_EXTRA_BITS[dist_symbol])? as usize;

            if distance > self.out.len()
            {
                return Err(InflateError::BadDistance {
                    distance,
                    available: self.out.len()
                });
            }
            if self.out.len() + length > limit
            {
                return Err(InflateError::OutputTooLarge {
                    limit,
                    size: self.out.len() + length
                });
            }

            // byte at a time so overlapping copies repeat what they just
            // produced
            let start = self.out.len() - distance;

            for offset in 0..length
            {
                let byte = self.out[start + offset];
                self.out.push(byte);
            }
        }
    }
}
