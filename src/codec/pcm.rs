//! 16-bit PCM ↔ normalized `f32` sample conversion.
//!
//! Decoded speech arrives as little-endian signed 16-bit PCM bytes; playback
//! and all in-process audio handling use `f32` samples in `[-1.0, 1.0)`.
//! Normalization divides by 32768, so every one of the 65 536 possible i16
//! values maps exactly: −32768 → −1.0 and 32767 → 32767/32768.

use thiserror::Error;

// ---------------------------------------------------------------------------
// PcmError
// ---------------------------------------------------------------------------

/// The PCM byte buffer cannot be interpreted as 16-bit samples.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PcmError {
    /// Byte length is odd — not a whole number of 16-bit samples.
    #[error("PCM byte length {len} is not a whole number of 16-bit samples")]
    MisalignedData { len: usize },
}

// ---------------------------------------------------------------------------
// pcm16_to_f32
// ---------------------------------------------------------------------------

/// Reinterpret little-endian 16-bit PCM bytes as normalized `f32` samples.
///
/// Each byte pair becomes one sample: `i16::from_le_bytes / 32768.0`.  The
/// division is by a power of two, so the conversion is exact for all i16
/// values.  Channel interleaving is preserved (one output sample per input
/// sample, regardless of channel count).
///
/// # Errors
///
/// [`PcmError::MisalignedData`] when the byte length is odd.  The buffer is
/// rejected whole; no samples are dropped.
///
/// # Example
///
/// ```rust
/// use voice_studio::codec::pcm::pcm16_to_f32;
///
/// let samples = pcm16_to_f32(&[0x00, 0x80, 0xFF, 0x7F]).unwrap();
/// assert_eq!(samples[0], -1.0);
/// assert_eq!(samples[1], 32767.0 / 32768.0);
/// ```
pub fn pcm16_to_f32(bytes: &[u8]) -> Result<Vec<f32>, PcmError> {
    if bytes.len() % 2 != 0 {
        return Err(PcmError::MisalignedData { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect())
}

// ---------------------------------------------------------------------------
// f32_to_pcm16
// ---------------------------------------------------------------------------

/// Quantize normalized `f32` samples to little-endian 16-bit PCM bytes.
///
/// Samples are clamped to `[-1.0, 1.0]` and scaled by 32767, so both ±1.0
/// map to the symmetric extremes ±32767.  This is the upload-direction
/// inverse of [`pcm16_to_f32`] (lossy by one quantization step, as any
/// float → int conversion must be).
pub fn f32_to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        let quantized = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        bytes.extend_from_slice(&quantized.to_le_bytes());
    }
    bytes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
