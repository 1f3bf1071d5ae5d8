//! PixelBridge core library: Art-Net in, Open Pixel Control over serial out.
//!
//! A [`NetworkListener`] thread decodes ArtDMX datagrams and feeds a shared
//! [`FrameAssembler`]; once every universe of a frame has arrived the
//! [`Bridge`] loop takes the frame and hands it to the
//! [`SerialTransmitter`], which writes it as one OPC "set pixels" message.
//!
//! Codecs in `protocols` are byte-oriented and side-effect free; sockets and
//! serial ports are confined to `listener` and `serial`.
//!
//! Invariants:
//! - Every frame sent holds exactly `MatrixLayout::num_pixels` pixels.
//! - Malformed or foreign datagrams are dropped without error.
//! - After `NetworkListener::stop` returns, nothing more is ingested.
//!
//! # Examples
//! ```
//! use std::time::Duration;
//!
//! use pixelbridge_core::{FrameAssembler, MatrixLayout};
//!
//! let assembler = FrameAssembler::new(MatrixLayout::default());
//! for universe in 0..73u16 {
//!     assembler.ingest(universe, &[universe as u8; 510]);
//! }
//! assert!(assembler.wait_for_frame(Duration::from_millis(10)));
//! let frame = assembler.take_frame();
//! assert_eq!(frame.len(), 12288);
//! ```

pub mod assembler;
pub mod bridge;
pub mod config;
pub mod discovery;
pub mod frame;
pub mod listener;
pub mod patterns;
pub mod protocols;
pub mod serial;

pub use assembler::FrameAssembler;
pub use bridge::{Bridge, BridgeSummary};
pub use config::{BridgeConfig, ConfigError, ListenerConfig, MatrixLayout, SerialConfig};
pub use discovery::PortCandidate;
pub use frame::{Frame, Pixel};
pub use listener::{ListenerError, NetworkListener};
pub use patterns::{Pattern, PatternGenerator};
pub use serial::{SerialError, SerialTransmitter, Transport};
