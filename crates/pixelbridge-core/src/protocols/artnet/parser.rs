use super::error::ArtNetError;
use super::layout;
use super::reader::ArtNetReader;

/// A decoded ArtDMX datagram. `data` borrows from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtDmx<'a> {
    pub universe: u16,
    pub sequence: Option<u8>,
    pub data: &'a [u8],
}

/// Parses an ArtDMX datagram.
///
/// Returns `Ok(None)` for Art-Net traffic that is not ArtDMX or for foreign
/// UDP payloads. The declared length is honoured but never read past the end
/// of the buffer.
pub fn parse_artdmx(payload: &[u8]) -> Result<Option<ArtDmx<'_>>, ArtNetError> {
    let reader = ArtNetReader::new(payload);
    reader.require_len(layout::DMX_DATA_OFFSET)?;

    let signature = reader.read_signature()?;
    if signature != layout::ARTNET_ID {
        return Ok(None);
    }

    let opcode = reader.read_u16_le(layout::OP_CODE_RANGE.clone())?;
    if opcode != layout::ARTDMX_OPCODE {
        return Ok(None);
    }

    let sequence = reader.read_optional_nonzero_u8(layout::SEQUENCE_OFFSET)?;
    let universe = reader.read_u16_le(layout::UNIVERSE_RANGE.clone())?;
    let length = reader.read_u16_be(layout::LENGTH_RANGE.clone())?;
    let data = reader.read_clipped(layout::DMX_DATA_OFFSET, length as usize);

    Ok(Some(ArtDmx {
        universe,
        sequence,
        data,
    }))
}

/// Decodes a datagram for a bridge carrying `num_universes` universes.
///
/// Malformed packets, other opcodes and universes outside
/// `0..num_universes` all yield `None`.
pub fn decode_artdmx(datagram: &[u8], num_universes: usize) -> Option<ArtDmx<'_>> {
    match parse_artdmx(datagram) {
        Ok(Some(dmx)) if (dmx.universe as usize) < num_universes => Some(dmx),
        Ok(Some(dmx)) => {
            log::trace!("ignoring ArtDMX for universe {}", dmx.universe);
            None
        }
        Ok(None) => None,
        Err(err) => {
            log::trace!("ignoring datagram: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_artdmx, parse_artdmx};
    use crate::protocols::artnet::layout;

    fn artdmx(universe: u16, length: u16, data: &[u8]) -> Vec<u8> {
        let mut payload = vec![0u8; layout::DMX_DATA_OFFSET];
        payload[..layout::ARTNET_ID.len()].copy_from_slice(layout::ARTNET_ID);
        payload[layout::OP_CODE_RANGE.clone()]
            .copy_from_slice(&layout::ARTDMX_OPCODE.to_le_bytes());
        payload[layout::UNIVERSE_RANGE.clone()].copy_from_slice(&universe.to_le_bytes());
        payload[layout::LENGTH_RANGE.clone()].copy_from_slice(&length.to_be_bytes());
        payload.extend_from_slice(data);
        payload
    }

    #[test]
    fn parse_valid_artdmx() {
        let mut payload = artdmx(1, 4, &[1, 2, 3, 4]);
        payload[layout::SEQUENCE_OFFSET] = 0x12;

        let parsed = parse_artdmx(&payload).unwrap().unwrap();
        assert_eq!(parsed.universe, 1);
        assert_eq!(parsed.sequence, Some(0x12));
        assert_eq!(parsed.data, &[1, 2, 3, 4]);
    }

    #[test]
    fn parse_non_artnet() {
        let payload = vec![0u8; layout::DMX_DATA_OFFSET];
        assert!(parse_artdmx(&payload).unwrap().is_none());
    }

    #[test]
    fn parse_other_opcode() {
        let mut payload = artdmx(0, 0, &[]);
        payload[layout::OP_CODE_RANGE.clone()].copy_from_slice(&0x2000u16.to_le_bytes());
        assert!(parse_artdmx(&payload).unwrap().is_none());
    }

    #[test]
    fn parse_short_payload() {
        let payload = vec![0u8; layout::DMX_DATA_OFFSET - 1];
        let err = parse_artdmx(&payload).unwrap_err();
        assert!(err.to_string().contains("payload too short"));
    }

    #[test]
    fn declared_length_truncates_data() {
        let payload = artdmx(3, 2, &[9, 8, 7, 6]);
        let parsed = parse_artdmx(&payload).unwrap().unwrap();
        assert_eq!(parsed.data, &[9, 8]);
    }

    #[test]
    fn declared_length_is_bounded_by_buffer() {
        let payload = artdmx(3, 510, &[9, 8, 7]);
        let parsed = parse_artdmx(&payload).unwrap().unwrap();
        assert_eq!(parsed.data, &[9, 8, 7]);
    }

    #[test]
    fn decode_ignores_out_of_range_universe() {
        let payload = artdmx(73, 3, &[1, 2, 3]);
        assert!(decode_artdmx(&payload, 73).is_none());
        let payload = artdmx(72, 3, &[1, 2, 3]);
        assert_eq!(decode_artdmx(&payload, 73).unwrap().universe, 72);
    }

    #[test]
    fn decode_ignores_bad_magic_for_any_payload() {
        for data in [&[][..], &[1, 2, 3][..], &[0xff; 510][..]] {
            let mut payload = artdmx(0, data.len() as u16, data);
            payload[7] = b'X';
            assert!(decode_artdmx(&payload, 73).is_none());
        }
    }

    #[test]
    fn decode_ignores_short_datagram() {
        assert!(decode_artdmx(b"Art-Net\0", 73).is_none());
        assert!(decode_artdmx(&[], 73).is_none());
    }
}
