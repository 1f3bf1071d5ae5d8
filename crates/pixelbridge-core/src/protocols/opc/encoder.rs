use super::error::OpcError;
use super::layout;
use crate::frame::Pixel;

/// Decoded OPC message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcHeader {
    pub channel: u8,
    pub command: u8,
    pub length: u16,
}

/// Encodes a "set pixels" message for exactly `num_pixels` pixels.
///
/// Missing pixels are sent as black and extra pixels are dropped, so the
/// receiver always gets a full matrix.
pub fn encode_set_pixels(pixels: &[Pixel], num_pixels: usize) -> Result<Vec<u8>, OpcError> {
    if num_pixels > layout::MAX_PIXELS {
        return Err(OpcError::TooManyPixels {
            count: num_pixels,
            max: layout::MAX_PIXELS,
        });
    }
    if pixels.len() != num_pixels {
        log::debug!(
            "OPC frame has {} pixels, expected {}; padding/truncating",
            pixels.len(),
            num_pixels
        );
    }

    let data_len = num_pixels * layout::BYTES_PER_PIXEL;
    let mut message = Vec::with_capacity(layout::HEADER_LEN + data_len);
    message.push(layout::BROADCAST_CHANNEL);
    message.push(layout::CMD_SET_PIXELS);
    message.extend_from_slice(&(data_len as u16).to_be_bytes());

    let padding = std::iter::repeat(Pixel::BLACK);
    for pixel in pixels.iter().copied().chain(padding).take(num_pixels) {
        message.extend_from_slice(&pixel.to_bytes());
    }
    Ok(message)
}

pub fn parse_header(message: &[u8]) -> Result<OpcHeader, OpcError> {
    let header = message
        .get(..layout::HEADER_LEN)
        .ok_or(OpcError::TooShort {
            needed: layout::HEADER_LEN,
            actual: message.len(),
        })?;
    let length = &header[layout::LENGTH_RANGE];
    Ok(OpcHeader {
        channel: header[layout::CHANNEL_OFFSET],
        command: header[layout::COMMAND_OFFSET],
        length: u16::from_be_bytes([length[0], length[1]]),
    })
}

#[cfg(test)]
mod tests {
    use super::{encode_set_pixels, parse_header};
    use crate::frame::Pixel;
    use crate::protocols::opc::layout;

    #[test]
    fn header_matches_pixel_count() {
        let pixels = vec![Pixel::new(1, 2, 3); 12288];
        let message = encode_set_pixels(&pixels, 12288).unwrap();
        let header = parse_header(&message).unwrap();
        assert_eq!(header.channel, 0);
        assert_eq!(header.command, 0);
        assert_eq!(header.length, 3 * 12288);
        assert_eq!(message.len(), layout::HEADER_LEN + 3 * 12288);
    }

    #[test]
    fn pixels_are_written_in_rgb_order() {
        let pixels = [Pixel::new(10, 20, 30), Pixel::new(40, 50, 60)];
        let message = encode_set_pixels(&pixels, 2).unwrap();
        assert_eq!(&message[layout::HEADER_LEN..], &[10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn short_input_is_padded_with_black() {
        let message = encode_set_pixels(&[Pixel::new(255, 255, 255)], 3).unwrap();
        assert_eq!(&message[layout::HEADER_LEN..], &[255, 255, 255, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn long_input_is_truncated() {
        let pixels = vec![Pixel::new(7, 7, 7); 5];
        let message = encode_set_pixels(&pixels, 2).unwrap();
        assert_eq!(message.len(), layout::HEADER_LEN + 6);
    }

    #[test]
    fn rejects_oversized_matrix() {
        let err = encode_set_pixels(&[], layout::MAX_PIXELS + 1).unwrap_err();
        assert!(err.to_string().contains("exceeds OPC maximum"));
    }

    #[test]
    fn parse_header_requires_four_bytes() {
        let err = parse_header(&[0, 0, 1]).unwrap_err();
        assert!(err.to_string().contains("header too short"));
    }
}
