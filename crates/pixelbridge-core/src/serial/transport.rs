//! Byte transports the transmitter can write frames to.

use std::io::{self, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

/// Write side of a link to the pixel receiver.
pub trait Transport: Send {
    /// Writes the whole buffer.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Blocks until buffered bytes have been handed to the device.
    fn flush(&mut self) -> io::Result<()>;
}

/// Serial port transport (8N1, no flow control).
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Opens `path` at `baud_rate` with a one second write timeout.
    ///
    /// USB CDC receivers ignore the baud rate; it only matters for real UARTs.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, serialport::Error> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_secs(1))
            .open()?;

        log::debug!("Opened serial port: {path} at {baud_rate} baud");
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}
