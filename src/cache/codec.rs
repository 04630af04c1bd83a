//! Text encoding for cache entries.
//!
//! Completions may carry control characters, so entries are stored as
//! standard padded base64 of the UTF-8 bytes rather than raw text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("cached payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn encode_entry(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

pub fn decode_entry(stored: &str) -> Result<String, DecodeError> {
    let bytes = STANDARD.decode(stored.trim_end())?;
    Ok(String::from_utf8(bytes)?)
}
