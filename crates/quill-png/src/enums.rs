#![allow(clippy::upper_case_acronyms, non_camel_case_types)]

/// Chunk types the decoder understands, see
/// https://www.w3.org/TR/2003/REC-PNG-20031110/
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum PngChunkType
{
    IHDR,
    PLTE,
    IDAT,
    IEND,
    tRNS,
    gAMA,
    unkn
}

/// Per scanline filter applied before compression, reversed during
/// reconstruction
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum FilterMethod
{
    None,
    Sub,
    Up,
    Average,
    Paeth
}

impl FilterMethod
{
    pub fn from_int(int: u8) -> Option<FilterMethod>
    {
        match int
        {
            0 => Some(FilterMethod::None),
            1 => Some(FilterMethod::Sub),
            2 => Some(FilterMethod::Up),
            3 => Some(FilterMethod::Average),
            4 => Some(FilterMethod::Paeth),
            _ => None
        }
    }
}

/// Pixel arrangement of the compressed scanline stream
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InterlaceMethod
{
    Standard,
    Adam7,
    Unknown
}

impl Default for InterlaceMethod
{
    fn default() -> Self
    {
        Self::Unknown
    }
}

impl InterlaceMethod
{
    pub(crate) fn from_int(int: u8) -> Option<InterlaceMethod>
    {
        match int
        {
            0 => Some(Self::Standard),
            1 => Some(Self::Adam7),
            _ => None
        }
    }
}

/// Color type declared by the image header
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngColor
{
    Luma,
    Palette,
    LumaA,
    RGB,
    RGBA,
    Unknown
}

impl Default for PngColor
{
    fn default() -> Self
    {
        Self::Unknown
    }
}

impl PngColor
{
    pub(crate) fn num_components(self) -> u8
    {
        match self
        {
            PngColor::Luma => 1,
            PngColor::Palette => 1,
            PngColor::LumaA => 2,
            PngColor::RGB => 3,
            PngColor::RGBA => 4,
            PngColor::Unknown => unreachable!()
        }
    }

    pub(crate) fn from_int(int: u8) -> Option<PngColor>
    {
        match int
        {
            0 => Some(Self::Luma),
            2 => Some(Self::RGB),
            3 => Some(Self::Palette),
            4 => Some(Self::LumaA),
            6 => Some(Self::RGBA),
            _ => None
        }
    }
}
