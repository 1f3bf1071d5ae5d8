use thiserror::Error;

/// Errors raised while reading an Art-Net datagram.
///
/// These never leave the codec: `decode_artdmx` treats every error as
/// unrelated traffic and ignores the datagram.
#[derive(Debug, Error)]
pub enum ArtNetError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}
