pub const CHANNEL_OFFSET: usize = 0;
pub const COMMAND_OFFSET: usize = 1;
pub const LENGTH_RANGE: std::ops::Range<usize> = 2..4;
pub const HEADER_LEN: usize = 4;

/// Channel 0 addresses every strip on the receiver.
pub const BROADCAST_CHANNEL: u8 = 0;
pub const CMD_SET_PIXELS: u8 = 0;

pub const BYTES_PER_PIXEL: usize = 3;
/// Largest pixel count whose payload length fits the 16-bit length field.
pub const MAX_PIXELS: usize = u16::MAX as usize / BYTES_PER_PIXEL;
