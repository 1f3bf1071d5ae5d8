use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpcError {
    #[error("header too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("pixel count {count} exceeds OPC maximum of {max}")]
    TooManyPixels { count: usize, max: usize },
}
