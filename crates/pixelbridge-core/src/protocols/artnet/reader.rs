use super::error::ArtNetError;
use super::layout;

pub struct ArtNetReader<'a> {
    payload: &'a [u8],
}

impl<'a> ArtNetReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), ArtNetError> {
        if self.payload.len() < needed {
            return Err(ArtNetError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u16_le(&self, range: std::ops::Range<usize>) -> Result<u16, ArtNetError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 2 {
            return Err(ArtNetError::TooShort {
                needed: 2,
                actual: bytes.len(),
            });
        }
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u16_be(&self, range: std::ops::Range<usize>) -> Result<u16, ArtNetError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 2 {
            return Err(ArtNetError::TooShort {
                needed: 2,
                actual: bytes.len(),
            });
        }
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_optional_nonzero_u8(&self, offset: usize) -> Result<Option<u8>, ArtNetError> {
        let value = self
            .payload
            .get(offset)
            .copied()
            .ok_or(ArtNetError::TooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })?;
        Ok(if value == 0 { None } else { Some(value) })
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], ArtNetError> {
        self.payload
            .get(range.clone())
            .ok_or(ArtNetError::TooShort {
                needed: range.end,
                actual: self.payload.len(),
            })
    }

    /// Bytes from `offset` up to `declared` bytes, clipped at the end of the buffer.
    pub fn read_clipped(&self, offset: usize, declared: usize) -> &'a [u8] {
        let start = offset.min(self.payload.len());
        let end = offset.saturating_add(declared).min(self.payload.len());
        &self.payload[start..end]
    }

    pub fn read_signature(&self) -> Result<&'a [u8], ArtNetError> {
        self.read_slice(0..layout::ARTNET_ID.len())
    }
}

#[cfg(test)]
mod tests {
    use super::ArtNetReader;

    #[test]
    fn read_clipped_stops_at_buffer_end() {
        let data = [1u8, 2, 3, 4, 5];
        let reader = ArtNetReader::new(&data);
        assert_eq!(reader.read_clipped(2, 10), &[3, 4, 5]);
        assert_eq!(reader.read_clipped(2, 1), &[3]);
        assert!(reader.read_clipped(9, 4).is_empty());
    }

    #[test]
    fn read_u16_endianness() {
        let data = [0x00u8, 0x50];
        let reader = ArtNetReader::new(&data);
        assert_eq!(reader.read_u16_le(0..2).unwrap(), 0x5000);
        assert_eq!(reader.read_u16_be(0..2).unwrap(), 0x0050);
    }
}
