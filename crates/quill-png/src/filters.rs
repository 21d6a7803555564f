//! Scanline de-filtering
//!
//! Each filter predicts a byte from its reconstructed neighbours,
//! `a` to the left, `b` above, `c` above left, all at a distance of
//! one whole pixel. Neighbours outside the image read as zero, which
//! also covers the first row: callers pass a zeroed previous row
//! there.

/// Undo the `Sub` filter, each byte was predicted from the byte one
/// pixel to its left.
pub(crate) fn handle_sub(raw: &[u8], current: &mut [u8], components: usize)
{
    for i in 0..raw.len()
    {
        let recon_a = if i >= components { current[i - components] } else { 0 };

        current[i] = raw[i].wrapping_add(recon_a);
    }
}

/// Undo the `Up` filter, each byte was predicted from the byte right
/// above it.
pub(crate) fn handle_up(prev_row: &[u8], raw: &[u8], current: &mut [u8])
{
    for ((filt, above), out_px) in raw.iter().zip(prev_row).zip(current.iter_mut())
    {
        *out_px = filt.wrapping_add(*above);
    }
}

/// Undo the `Average` filter, the prediction is the mean of left and
/// above.
pub(crate) fn handle_avg(prev_row: &[u8], raw: &[u8], current: &mut [u8], components: usize)
{
    for i in 0..raw.len()
    {
        let recon_a = if i >= components
        {
            u16::from(current[i - components])
        }
        else
        {
            0
        };
        // needs at least 9 bits of precision before the halving
        let recon_b = u16::from(prev_row[i]);

        current[i] = raw[i].wrapping_add(((recon_a + recon_b) >> 1) as u8);
    }
}

/// Undo the `Paeth` filter, the prediction is whichever of left,
/// above and above-left is closest to their gradient.
pub(crate) fn handle_paeth(prev_row: &[u8], raw: &[u8], current: &mut [u8], components: usize)
{
    for i in 0..raw.len()
    {
        let (recon_a, recon_c) = if i >= components
        {
            (current[i - components], prev_row[i - components])
        }
        else
        {
            (0, 0)
        };

        current[i] = raw[i].wrapping_add(paeth(recon_a, prev_row[i], recon_c));
    }
}

#[inline(always)]
pub(crate) fn paeth(a: u8, b: u8, c: u8) -> u8
{
    let a = i16::from(a);
    let b = i16::from(b);
    let c = i16::from(c);
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc
    {
        return a as u8;
    }
    if pb <= pc
    {
        return b as u8;
    }
    c as u8
}
