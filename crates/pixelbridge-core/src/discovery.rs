//! Serial port enumeration and receiver auto-detection.
//!
//! The heuristic favours Teensy boards (the usual OPC receiver): a matching
//! manufacturer or product string, a generic "USB Serial" product, or the
//! PJRC USB serial vid:pid. When nothing matches, the first port wins.

use serde::Serialize;
use serialport::{SerialPortInfo, SerialPortType};

use crate::serial::{SerialError, SerialTransport};

pub const TEENSY_VID: u16 = 0x16C0;
pub const TEENSY_PID: u16 = 0x0483;

/// A serial port reported by the operating system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortCandidate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    pub likely_receiver: bool,
}

impl PortCandidate {
    pub fn new(
        name: impl Into<String>,
        usb: Option<(u16, u16)>,
        manufacturer: Option<String>,
        product: Option<String>,
    ) -> Self {
        let likely_receiver = is_likely_receiver(manufacturer.as_deref(), product.as_deref(), usb);
        Self {
            name: name.into(),
            vid: usb.map(|(vid, _)| vid),
            pid: usb.map(|(_, pid)| pid),
            manufacturer,
            product,
            likely_receiver,
        }
    }

    fn from_info(info: SerialPortInfo) -> Self {
        match info.port_type {
            SerialPortType::UsbPort(usb) => Self::new(
                info.port_name,
                Some((usb.vid, usb.pid)),
                usb.manufacturer,
                usb.product,
            ),
            _ => Self::new(info.port_name, None, None, None),
        }
    }

    /// One-line description, e.g. `/dev/ttyACM0 - USB Serial (Teensyduino)`.
    pub fn describe(&self) -> String {
        let mut line = self.name.clone();
        if let Some(product) = &self.product {
            line.push_str(" - ");
            line.push_str(product);
        }
        if let Some(manufacturer) = &self.manufacturer {
            line.push_str(&format!(" ({manufacturer})"));
        }
        line
    }
}

pub fn is_likely_receiver(
    manufacturer: Option<&str>,
    product: Option<&str>,
    usb: Option<(u16, u16)>,
) -> bool {
    let contains = |text: Option<&str>, needle: &str| {
        text.is_some_and(|t| t.to_ascii_lowercase().contains(needle))
    };
    contains(manufacturer, "teensy")
        || contains(product, "teensy")
        || contains(product, "usb serial")
        || usb == Some((TEENSY_VID, TEENSY_PID))
}

pub fn list_ports() -> Result<Vec<PortCandidate>, SerialError> {
    let ports = serialport::available_ports().map_err(SerialError::Enumerate)?;
    Ok(ports.into_iter().map(PortCandidate::from_info).collect())
}

/// Picks the first likely receiver, falling back to the first port.
pub fn auto_detect(candidates: &[PortCandidate]) -> Option<&PortCandidate> {
    candidates
        .iter()
        .find(|c| c.likely_receiver)
        .or_else(|| candidates.first())
}

/// Opens and immediately closes `port`.
pub fn probe(port: &str, baud_rate: u32) -> Result<(), SerialError> {
    SerialTransport::open(port, baud_rate)
        .map(drop)
        .map_err(|source| SerialError::Open {
            port: port.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_teensy_by_strings_and_ids() {
        assert!(is_likely_receiver(Some("Teensyduino"), None, None));
        assert!(is_likely_receiver(None, Some("USB Serial"), None));
        assert!(is_likely_receiver(None, None, Some((TEENSY_VID, TEENSY_PID))));
        assert!(!is_likely_receiver(Some("FTDI"), Some("FT232R"), Some((0x0403, 0x6001))));
        assert!(!is_likely_receiver(None, None, None));
    }

    #[test]
    fn auto_detect_prefers_likely_receiver() {
        let ports = vec![
            PortCandidate::new("/dev/ttyS0", None, None, None),
            PortCandidate::new(
                "/dev/ttyACM0",
                Some((TEENSY_VID, TEENSY_PID)),
                Some("Teensyduino".to_string()),
                Some("USB Serial".to_string()),
            ),
        ];
        assert_eq!(auto_detect(&ports).unwrap().name, "/dev/ttyACM0");
    }

    #[test]
    fn auto_detect_falls_back_to_first_port() {
        let ports = vec![
            PortCandidate::new("COM1", None, None, None),
            PortCandidate::new("COM2", None, None, None),
        ];
        assert_eq!(auto_detect(&ports).unwrap().name, "COM1");
        assert!(auto_detect(&[]).is_none());
    }

    #[test]
    fn describe_includes_product_and_manufacturer() {
        let port = PortCandidate::new(
            "/dev/ttyACM0",
            None,
            Some("Teensyduino".to_string()),
            Some("USB Serial".to_string()),
        );
        assert_eq!(port.describe(), "/dev/ttyACM0 - USB Serial (Teensyduino)");
    }

    #[test]
    fn candidate_json_omits_missing_fields() {
        let port = PortCandidate::new("COM3", None, None, None);
        let value = serde_json::to_value(&port).expect("candidate json");
        assert_eq!(value["name"], "COM3");
        assert!(value.get("vid").is_none());
        assert_eq!(value["likely_receiver"], false);
    }
}
