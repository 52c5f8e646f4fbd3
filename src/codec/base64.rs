//! Base64 transport codec for PCM payloads.
//!
//! The speech service delivers synthesized audio as a base64 string; this
//! module turns it back into raw bytes (and raw bytes into base64 for the
//! upload direction).  Decoding is **strict**: the standard alphabet with
//! canonical padding is required, any other character fails with
//! [`DecodeError`], and input is never silently truncated.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// The input was not valid standard-alphabet base64.
///
/// Carries the underlying decoder message (invalid byte, bad padding, or
/// truncated final quad).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed base64 input: {0}")]
pub struct DecodeError(pub String);

// ---------------------------------------------------------------------------
// decode / encode
// ---------------------------------------------------------------------------

/// Decode a base64 string into the exact byte sequence it encodes.
///
/// Byte values and ordering are preserved; the output length follows the
/// standard padding rules (`floor(3 * n / 4)` for `n` input characters,
/// minus padding).
///
/// # Example
///
/// ```rust
/// use voice_studio::codec::base64::decode;
///
/// assert_eq!(decode("aGVsbG8=").unwrap(), b"hello");
/// assert!(decode("not base64!").is_err());
/// ```
pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD
        .decode(input)
        .map_err(|e| DecodeError(e.to_string()))
}

/// Encode bytes as standard-alphabet base64 with padding.
///
/// Inverse of [`decode`]: `decode(&encode(b)) == b` for all byte buffers.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
