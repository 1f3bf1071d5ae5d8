//! Bridge configuration.
//!
//! Defaults match the 64×192 matrix driven by 73 Art-Net universes of 170
//! RGB pixels each. The CLI maps its flags onto these structs; there is no
//! configuration file.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

use crate::protocols::{artnet, opc};

pub const MATRIX_WIDTH: usize = 64;
pub const MATRIX_HEIGHT: usize = 192;
pub const NUM_PIXELS: usize = MATRIX_WIDTH * MATRIX_HEIGHT;
pub const NUM_UNIVERSES: usize = 73;
pub const LEDS_PER_UNIVERSE: usize = 170;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Time the receiver needs after the port opens (it resets on connect).
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);
pub const FRAME_WAIT_TIMEOUT: Duration = Duration::from_secs(1);
pub const STATUS_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("matrix dimensions must be non-zero (got {width}x{height})")]
    EmptyMatrix { width: usize, height: usize },
    #[error("matrix of {pixels} pixels exceeds the OPC limit of {max}")]
    MatrixTooLarge { pixels: usize, max: usize },
    #[error("universe layout must be non-zero (got {universes} x {leds_per_universe})")]
    EmptyUniverses {
        universes: usize,
        leds_per_universe: usize,
    },
}

/// Matrix geometry and its mapping onto Art-Net universes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixLayout {
    width: usize,
    height: usize,
    num_universes: usize,
    leds_per_universe: usize,
}

impl MatrixLayout {
    pub fn new(
        width: usize,
        height: usize,
        num_universes: usize,
        leds_per_universe: usize,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyMatrix { width, height });
        }
        let pixels = width.saturating_mul(height);
        if pixels > opc::layout::MAX_PIXELS {
            return Err(ConfigError::MatrixTooLarge {
                pixels,
                max: opc::layout::MAX_PIXELS,
            });
        }
        if num_universes == 0 || leds_per_universe == 0 {
            return Err(ConfigError::EmptyUniverses {
                universes: num_universes,
                leds_per_universe,
            });
        }
        Ok(Self {
            width,
            height,
            num_universes,
            leds_per_universe,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    pub fn num_universes(&self) -> usize {
        self.num_universes
    }

    pub fn leds_per_universe(&self) -> usize {
        self.leds_per_universe
    }

    /// Largest DMX payload a universe contributes to the frame.
    pub fn universe_bytes(&self) -> usize {
        self.leds_per_universe * opc::layout::BYTES_PER_PIXEL
    }
}

impl Default for MatrixLayout {
    fn default() -> Self {
        Self {
            width: MATRIX_WIDTH,
            height: MATRIX_HEIGHT,
            num_universes: NUM_UNIVERSES,
            leds_per_universe: LEDS_PER_UNIVERSE,
        }
    }
}

/// Where the Art-Net listener binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerConfig {
    pub bind_addr: SocketAddr,
    /// Upper bound on how long `stop()` waits for a blocked receive.
    pub poll_interval: Duration,
}

impl ListenerConfig {
    pub fn on_ip(ip: IpAddr) -> Self {
        Self {
            bind_addr: SocketAddr::new(ip, artnet::layout::ARTNET_PORT),
            ..Self::default()
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(
                IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                artnet::layout::ARTNET_PORT,
            ),
            poll_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub settle_delay: Duration,
}

impl SerialConfig {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Timing of the main bridge loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    pub frame_timeout: Duration,
    pub status_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            frame_timeout: FRAME_WAIT_TIMEOUT,
            status_interval: STATUS_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_constants() {
        let layout = MatrixLayout::default();
        assert_eq!(layout.num_pixels(), NUM_PIXELS);
        assert_eq!(layout.num_pixels(), 12288);
        assert_eq!(layout.universe_bytes(), 510);
        assert_eq!(
            MatrixLayout::new(MATRIX_WIDTH, MATRIX_HEIGHT, NUM_UNIVERSES, LEDS_PER_UNIVERSE),
            Ok(layout)
        );
    }

    #[test]
    fn rejects_degenerate_layouts() {
        assert!(matches!(
            MatrixLayout::new(0, 10, 1, 1),
            Err(ConfigError::EmptyMatrix { .. })
        ));
        assert!(matches!(
            MatrixLayout::new(10, 10, 0, 170),
            Err(ConfigError::EmptyUniverses { .. })
        ));
        assert!(matches!(
            MatrixLayout::new(512, 512, 1, 170),
            Err(ConfigError::MatrixTooLarge { .. })
        ));
    }

    #[test]
    fn listener_defaults_to_artnet_port() {
        let config = ListenerConfig::default();
        assert_eq!(config.bind_addr.port(), 6454);
        assert!(config.bind_addr.ip().is_unspecified());
    }

    #[test]
    fn serial_defaults() {
        let config = SerialConfig::new("/dev/ttyACM0");
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.settle_delay, Duration::from_secs(2));
    }
}
