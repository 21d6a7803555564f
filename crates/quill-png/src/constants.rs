/// The fixed eight byte prefix every PNG stream starts with
pub const PNG_SIGNATURE: u64 = 0x8950_4E47_0D0A_1A0A;

/// Adam7 pass origins and spacings, indexed by pass
pub const XORIG: [usize; 7] = [0, 4, 0, 2, 0, 1, 0];
pub const YORIG: [usize; 7] = [0, 0, 4, 0, 2, 0, 1];

pub const XSPC: [usize; 7] = [8, 8, 4, 4, 2, 2, 1];
pub const YSPC: [usize; 7] = [8, 8, 8, 4, 4, 2, 2];

/// Multipliers replicating a sub byte sample across eight bits,
/// indexed by bit depth
pub const DEPTH_SCALE_TABLE: [u8; 9] = [0, 0xff, 0x55, 0, 0x11, 0, 0, 0, 0x01];
