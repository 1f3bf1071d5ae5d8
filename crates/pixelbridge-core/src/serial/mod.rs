//! Serial side of the bridge.
//!
//! [`SerialTransmitter`] is a two-state link (`Disconnected` / `Connected`)
//! that encodes frames as OPC "set pixels" messages. Write failures are
//! reported to the caller. A timed-out or interrupted write keeps the link
//! open so the next frame is attempted on the same port; any other I/O error
//! drops it to `Disconnected`. There is no automatic reconnection.

mod transport;

pub use transport::{SerialTransport, Transport};

use std::io;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::frame::Frame;
use crate::protocols::opc::{self, OpcError};

#[derive(Debug, Error)]
pub enum SerialError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[source] serialport::Error),
    #[error("serial port is not connected")]
    NotConnected,
    #[error("serial write failed: {0}")]
    Write(#[from] io::Error),
    #[error("frame encoding failed: {0}")]
    Encode(#[from] OpcError),
}

enum SerialLink {
    Disconnected,
    Connected {
        name: String,
        transport: Box<dyn Transport>,
    },
}

pub struct SerialTransmitter {
    num_pixels: usize,
    settle_delay: Duration,
    link: SerialLink,
    frames_sent: u64,
}

impl SerialTransmitter {
    pub fn new(num_pixels: usize, settle_delay: Duration) -> Self {
        Self {
            num_pixels,
            settle_delay,
            link: SerialLink::Disconnected,
            frames_sent: 0,
        }
    }

    /// Opens the serial port and waits for the receiver to settle.
    ///
    /// Any existing link is closed first.
    pub fn connect(&mut self, port: &str, baud_rate: u32) -> Result<(), SerialError> {
        self.disconnect();
        let transport = SerialTransport::open(port, baud_rate).map_err(|source| {
            SerialError::Open {
                port: port.to_string(),
                source,
            }
        })?;
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }
        log::info!("Connected to {port} at {baud_rate} baud");
        self.link = SerialLink::Connected {
            name: port.to_string(),
            transport: Box::new(transport),
        };
        Ok(())
    }

    /// Connects over an already-open transport, skipping the settling delay.
    pub fn attach(&mut self, name: impl Into<String>, transport: Box<dyn Transport>) {
        self.disconnect();
        self.link = SerialLink::Connected {
            name: name.into(),
            transport,
        };
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.link, SerialLink::Connected { .. })
    }

    pub fn port_name(&self) -> Option<&str> {
        match &self.link {
            SerialLink::Connected { name, .. } => Some(name),
            SerialLink::Disconnected => None,
        }
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    pub fn num_pixels(&self) -> usize {
        self.num_pixels
    }

    /// Writes one frame, returning `false` when it was not delivered.
    pub fn send(&mut self, frame: &Frame) -> bool {
        match self.try_send(frame) {
            Ok(()) => true,
            Err(SerialError::NotConnected) => false,
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    /// Like [`send`](Self::send) but reports why the frame was not delivered.
    ///
    /// A timed-out or interrupted write keeps the link; other write or flush
    /// errors drop it.
    pub fn try_send(&mut self, frame: &Frame) -> Result<(), SerialError> {
        let SerialLink::Connected { transport, .. } = &mut self.link else {
            return Err(SerialError::NotConnected);
        };
        if frame.len() != self.num_pixels {
            log::warn!(
                "Expected {} pixels, got {}",
                self.num_pixels,
                frame.len()
            );
        }
        let message = opc::encode_set_pixels(frame.pixels(), self.num_pixels)?;

        let written = transport
            .write_all(&message)
            .and_then(|()| transport.flush());
        if let Err(err) = written {
            if !is_transient(&err) {
                self.disconnect();
            }
            return Err(SerialError::Write(err));
        }
        self.frames_sent += 1;
        Ok(())
    }

    /// Sends an all-black frame so the display goes dark.
    pub fn send_blank(&mut self) -> bool {
        if !self.is_connected() {
            return false;
        }
        log::info!("Clearing display (sending all black)...");
        self.send(&Frame::blank(self.num_pixels))
    }

    /// Closes the link. Safe to call when already disconnected.
    pub fn disconnect(&mut self) {
        if let SerialLink::Connected { name, .. } =
            std::mem::replace(&mut self.link, SerialLink::Disconnected)
        {
            log::info!("Disconnected from {name}");
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::{SerialError, SerialTransmitter, Transport};
    use crate::frame::{Frame, Pixel};
    use crate::protocols::opc;

    #[derive(Clone)]
    struct Recorder {
        written: Arc<Mutex<Vec<u8>>>,
        failures_left: usize,
        failure: io::ErrorKind,
    }

    impl Default for Recorder {
        fn default() -> Self {
            Self {
                written: Arc::default(),
                failures_left: 0,
                failure: io::ErrorKind::TimedOut,
            }
        }
    }

    impl Transport for Recorder {
        fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(io::Error::new(self.failure, "write failed"));
            }
            self.written.lock().unwrap().extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn send_while_disconnected_fails_quietly() {
        let mut tx = SerialTransmitter::new(4, Duration::ZERO);
        assert!(!tx.send(&Frame::blank(4)));
        assert!(!tx.send_blank());
        assert!(matches!(
            tx.try_send(&Frame::blank(4)),
            Err(SerialError::NotConnected)
        ));
        assert_eq!(tx.frames_sent(), 0);
    }

    #[test]
    fn send_writes_opc_message() {
        let recorder = Recorder::default();
        let mut tx = SerialTransmitter::new(2, Duration::ZERO);
        tx.attach("memory", Box::new(recorder.clone()));

        let frame = Frame::from_pixels(vec![Pixel::new(1, 2, 3)], 2);
        assert!(tx.send(&frame));
        assert_eq!(tx.frames_sent(), 1);

        let written = recorder.written.lock().unwrap();
        let header = opc::parse_header(&written).unwrap();
        assert_eq!(header.length, 6);
        assert_eq!(&written[4..], &[1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn blank_frame_is_all_zero() {
        let recorder = Recorder::default();
        let mut tx = SerialTransmitter::new(3, Duration::ZERO);
        tx.attach("memory", Box::new(recorder.clone()));
        assert!(tx.send_blank());
        let written = recorder.written.lock().unwrap();
        assert_eq!(written.len(), 4 + 9);
        assert!(written[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn timed_out_write_keeps_link_for_next_frame() {
        let recorder = Recorder {
            failures_left: 1,
            ..Recorder::default()
        };
        let mut tx = SerialTransmitter::new(2, Duration::ZERO);
        tx.attach("memory", Box::new(recorder.clone()));

        assert!(matches!(
            tx.try_send(&Frame::blank(2)),
            Err(SerialError::Write(_))
        ));
        assert!(tx.is_connected());
        assert_eq!(tx.frames_sent(), 0);

        let later: Vec<bool> = (0..5).map(|_| tx.send(&Frame::blank(2))).collect();
        assert_eq!(later, [true; 5]);
        assert_eq!(tx.frames_sent(), 5);
        assert_eq!(recorder.written.lock().unwrap().len(), 5 * (4 + 6));
    }

    #[test]
    fn broken_pipe_disconnects() {
        let recorder = Recorder {
            failures_left: 1,
            failure: io::ErrorKind::BrokenPipe,
            ..Recorder::default()
        };
        let mut tx = SerialTransmitter::new(2, Duration::ZERO);
        tx.attach("memory", Box::new(recorder));
        assert!(!tx.send(&Frame::blank(2)));
        assert!(!tx.is_connected());
        assert_eq!(tx.frames_sent(), 0);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut tx = SerialTransmitter::new(2, Duration::ZERO);
        tx.attach("memory", Box::new(Recorder::default()));
        assert_eq!(tx.port_name(), Some("memory"));
        tx.disconnect();
        tx.disconnect();
        assert!(!tx.is_connected());
        assert_eq!(tx.port_name(), None);
    }

    #[test]
    fn connect_to_missing_port_reports_open_error() {
        let mut tx = SerialTransmitter::new(2, Duration::ZERO);
        let err = tx
            .connect("/dev/pixelbridge-does-not-exist", 115_200)
            .unwrap_err();
        assert!(matches!(err, SerialError::Open { .. }));
        assert!(err.to_string().contains("pixelbridge-does-not-exist"));
        assert!(!tx.is_connected());
    }
}
