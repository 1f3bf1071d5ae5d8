//! Art-Net protocol decoding.
//!
//! Only ArtDMX (opcode `0x5000`) is decoded; every other datagram arriving
//! on port 6454 is ignored. The declared DMX length is honoured but clipped
//! to the received bytes, so short or oversized datagrams never cause reads
//! past the buffer.
//!
//! Byte offsets live in `layout`, bounds-checked access in `reader`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{ArtDmx, decode_artdmx, parse_artdmx};
