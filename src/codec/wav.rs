//! Minimal canonical WAV (RIFF) container encoding.
//!
//! [`encode`] wraps raw little-endian PCM bytes in the fixed 44-byte header
//! understood by every standard WAV decoder — no extension chunks, no
//! metadata.  [`WavHeader::parse`] reads the same canonical layout back,
//! which lets callers sanity-check user-supplied `.wav` files before upload
//! and lets tests verify the encoder byte-for-byte.
//!
//! Header layout (all multi-byte fields little-endian):
//!
//! | Offset | Size | Field         | Value                |
//! |--------|------|---------------|----------------------|
//! | 0      | 4    | ChunkID       | `"RIFF"`             |
//! | 4      | 4    | ChunkSize     | `36 + dataSize`      |
//! | 8      | 4    | Format        | `"WAVE"`             |
//! | 12     | 4    | Subchunk1ID   | `"fmt "`             |
//! | 16     | 4    | Subchunk1Size | `16`                 |
//! | 20     | 2    | AudioFormat   | `1` (PCM)            |
//! | 22     | 2    | NumChannels   | channels             |
//! | 24     | 4    | SampleRate    | sample rate          |
//! | 28     | 4    | ByteRate      | rate × block align   |
//! | 32     | 2    | BlockAlign    | channels × bits / 8  |
//! | 34     | 2    | BitsPerSample | bit depth            |
//! | 36     | 4    | Subchunk2ID   | `"data"`             |
//! | 40     | 4    | Subchunk2Size | `dataSize`           |

use thiserror::Error;

/// Size of the canonical WAV header in bytes.
pub const HEADER_LEN: usize = 44;

// ---------------------------------------------------------------------------
// WavError
// ---------------------------------------------------------------------------

/// Reason a WAV container could not be encoded or parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WavError {
    /// A format parameter is zero, out of range, or inexpressible in the
    /// header's fixed-width fields.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The PCM byte length is not a whole number of sample frames.
    #[error("PCM length {len} is not a multiple of block align {block_align}")]
    MisalignedData { len: usize, block_align: u16 },

    /// The byte buffer does not start with a canonical 44-byte WAV header.
    #[error("malformed WAV header: {0}")]
    MalformedHeader(String),
}

// ---------------------------------------------------------------------------
// encode
// ---------------------------------------------------------------------------

/// Assemble a minimal canonical WAV file from raw PCM bytes.
///
/// `pcm` must already be little-endian PCM at the stated bit depth, with
/// samples interleaved across channels.  The output is exactly
/// `44 + pcm.len()` bytes: the header above followed by `pcm` verbatim.
///
/// # Errors
///
/// * [`WavError::InvalidParameter`] — zero sample rate, zero channels, a bit
///   depth of zero or not a multiple of 8, or values that overflow the
///   header's `u16`/`u32` fields.
/// * [`WavError::MisalignedData`] — `pcm.len()` is not a multiple of the
///   block alignment.  Misaligned buffers are rejected, never truncated or
///   padded.
///
/// No buffer is returned on failure.
///
/// # Example
///
/// ```rust
/// use voice_studio::codec::wav;
///
/// // Two i16 samples (1, 2) at 24 kHz mono
/// let wav = wav::encode(&[0x01, 0x00, 0x02, 0x00], 24_000, 1, 16).unwrap();
/// assert_eq!(wav.len(), 48);
/// assert_eq!(&wav[0..4], b"RIFF");
/// assert_eq!(&wav[44..48], &[0x01, 0x00, 0x02, 0x00]);
/// ```
pub fn encode(
    pcm: &[u8],
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
) -> Result<Vec<u8>, WavError> {
    if sample_rate == 0 {
        return Err(WavError::InvalidParameter("sample rate must be > 0".into()));
    }
    if channels == 0 {
        return Err(WavError::InvalidParameter(
            "channel count must be > 0".into(),
        ));
    }
    if bits_per_sample == 0 || bits_per_sample % 8 != 0 {
        return Err(WavError::InvalidParameter(format!(
            "bits per sample must be a positive multiple of 8, got {bits_per_sample}"
        )));
    }

    // Bytes per sample frame across all channels.  Computed in u32 first:
    // the product can exceed u16 for extreme channel counts.
    let block_align_wide = channels as u32 * (bits_per_sample as u32 / 8);
    let block_align: u16 = block_align_wide.try_into().map_err(|_| {
        WavError::InvalidParameter(format!(
            "block align {block_align_wide} exceeds the header's u16 field"
        ))
    })?;

    let byte_rate = sample_rate
        .checked_mul(block_align as u32)
        .ok_or_else(|| {
            WavError::InvalidParameter("byte rate exceeds the header's u32 field".into())
        })?;

    if pcm.len() % block_align as usize != 0 {
        return Err(WavError::MisalignedData {
            len: pcm.len(),
            block_align,
        });
    }

    let data_size: u32 = pcm
        .len()
        .try_into()
        .ok()
        .filter(|&n: &u32| n <= u32::MAX - 36)
        .ok_or_else(|| {
            WavError::InvalidParameter("PCM payload exceeds the RIFF u32 size field".into())
        })?;

    let mut out = Vec::with_capacity(HEADER_LEN + pcm.len());

    // RIFF chunk descriptor
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt subchunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data subchunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    out.extend_from_slice(pcm);

    Ok(out)
}

// ---------------------------------------------------------------------------
// WavHeader
// ---------------------------------------------------------------------------

/// Format parameters recovered from a canonical WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Length of the PCM data that follows the header, in bytes.
    pub data_len: u32,
}

impl WavHeader {
    /// Parse the first 44 bytes of `bytes` as a canonical minimal WAV header.
    ///
    /// Only the exact layout produced by [`encode`] is accepted: `RIFF` /
    /// `WAVE` magic, a 16-byte PCM `fmt ` subchunk, and a `data` subchunk at
    /// offset 36.  Files with extension chunks (LIST, fact, …) fail with
    /// [`WavError::MalformedHeader`].
    pub fn parse(bytes: &[u8]) -> Result<Self, WavError> {
        if bytes.len() < HEADER_LEN {
            return Err(WavError::MalformedHeader(format!(
                "need at least {HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        if &bytes[0..4] != b"RIFF" {
            return Err(WavError::MalformedHeader("missing RIFF magic".into()));
        }
        if &bytes[8..12] != b"WAVE" {
            return Err(WavError::MalformedHeader("missing WAVE magic".into()));
        }
        if &bytes[12..16] != b"fmt " {
            return Err(WavError::MalformedHeader("missing fmt subchunk".into()));
        }
        if read_u32(bytes, 16) != 16 {
            return Err(WavError::MalformedHeader(
                "fmt subchunk is not the 16-byte PCM form".into(),
            ));
        }
        if read_u16(bytes, 20) != 1 {
            return Err(WavError::MalformedHeader(
                "audio format is not uncompressed PCM".into(),
            ));
        }
        if &bytes[36..40] != b"data" {
            return Err(WavError::MalformedHeader("missing data subchunk".into()));
        }

        Ok(Self {
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            bits_per_sample: read_u16(bytes, 34),
            data_len: read_u32(bytes, 40),
        })
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Byte-exact encoding ----------------------------------------------

    #[test]
    fn two_sample_mono_clip() {
        // Two int16 samples (1, 2) @ 24 kHz mono / 16-bit
        let pcm = [0x01, 0x00, 0x02, 0x00];
        let wav = encode(&pcm, 24_000, 1, 16).unwrap();

        assert_eq!(wav.len(), 48);
        // Subchunk2Size at offset 40 = 4
        assert_eq!(&wav[40..44], &[0x04, 0x00, 0x00, 0x00]);
        // PCM appended verbatim at offset 44
        assert_eq!(&wav[44..48], &pcm);
    }

    #[test]
    fn header_field_layout() {
        let pcm = vec![0u8; 960]; // 10 ms of 24 kHz stereo 16-bit
        let wav = encode(&pcm, 24_000, 2, 16).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(read_u32(&wav, 4), 36 + 960); // ChunkSize
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(read_u32(&wav, 16), 16); // Subchunk1Size
        assert_eq!(read_u16(&wav, 20), 1); // AudioFormat = PCM
        assert_eq!(read_u16(&wav, 22), 2); // NumChannels
        assert_eq!(read_u32(&wav, 24), 24_000); // SampleRate
        assert_eq!(read_u32(&wav, 28), 24_000 * 4); // ByteRate
        assert_eq!(read_u16(&wav, 32), 4); // BlockAlign
        assert_eq!(read_u16(&wav, 34), 16); // BitsPerSample
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(read_u32(&wav, 40), 960); // Subchunk2Size
    }

    #[test]
    fn empty_pcm_is_a_valid_44_byte_header() {
        let wav = encode(&[], 24_000, 1, 16).unwrap();
        assert_eq!(wav.len(), HEADER_LEN);
        assert_eq!(read_u32(&wav, 4), 36); // ChunkSize = 36 + 0
        assert_eq!(read_u32(&wav, 40), 0); // Subchunk2Size = 0
    }

    #[test]
    fn output_length_is_header_plus_data() {
        for frames in [1usize, 7, 100, 4800] {
            let pcm = vec![0u8; frames * 2];
            let wav = encode(&pcm, 16_000, 1, 16).unwrap();
            assert_eq!(wav.len(), HEADER_LEN + pcm.len());
        }
    }

    // ---- Header round trip -------------------------------------------------

    #[test]
    fn parse_recovers_encode_parameters() {
        let pcm = vec![0u8; 24_000 * 2]; // 0.5 s of 24 kHz mono 16-bit
        let wav = encode(&pcm, 24_000, 1, 16).unwrap();

        let header = WavHeader::parse(&wav).unwrap();
        assert_eq!(header.sample_rate, 24_000);
        assert_eq!(header.channels, 1);
        assert_eq!(header.bits_per_sample, 16);
        assert_eq!(header.data_len as usize, pcm.len());
    }

    #[test]
    fn parse_recovers_stereo_parameters() {
        let pcm = vec![0u8; 44_100 * 4];
        let wav = encode(&pcm, 44_100, 2, 16).unwrap();

        let header = WavHeader::parse(&wav).unwrap();
        assert_eq!(header.sample_rate, 44_100);
        assert_eq!(header.channels, 2);
        assert_eq!(header.data_len as usize, pcm.len());
    }

    // ---- Parameter validation ----------------------------------------------

    #[test]
    fn zero_sample_rate_rejected() {
        let err = encode(&[0, 0], 0, 1, 16).unwrap_err();
        assert!(matches!(err, WavError::InvalidParameter(_)), "{err}");
    }

    #[test]
    fn zero_channels_rejected() {
        let err = encode(&[0, 0], 24_000, 0, 16).unwrap_err();
        assert!(matches!(err, WavError::InvalidParameter(_)), "{err}");
    }

    #[test]
    fn zero_bit_depth_rejected() {
        let err = encode(&[0, 0], 24_000, 1, 0).unwrap_err();
        assert!(matches!(err, WavError::InvalidParameter(_)), "{err}");
    }

    #[test]
    fn non_byte_multiple_bit_depth_rejected() {
        let err = encode(&[0, 0], 24_000, 1, 12).unwrap_err();
        assert!(matches!(err, WavError::InvalidParameter(_)), "{err}");
    }

    #[test]
    fn misaligned_pcm_rejected_not_truncated() {
        // 3 bytes is not a whole 16-bit mono frame
        let err = encode(&[0, 0, 0], 24_000, 1, 16).unwrap_err();
        assert_eq!(
            err,
            WavError::MisalignedData {
                len: 3,
                block_align: 2
            }
        );
    }

    #[test]
    fn misaligned_stereo_frame_rejected() {
        // 6 bytes is 1.5 stereo 16-bit frames (block align 4)
        let err = encode(&[0u8; 6], 24_000, 2, 16).unwrap_err();
        assert!(matches!(err, WavError::MisalignedData { block_align: 4, .. }));
    }

    // ---- Parser rejection ---------------------------------------------------

    #[test]
    fn parse_rejects_short_buffer() {
        assert!(matches!(
            WavHeader::parse(&[0u8; 10]),
            Err(WavError::MalformedHeader(_))
        ));
    }

    #[test]
    fn parse_rejects_wrong_magic() {
        let mut wav = encode(&[0, 0], 24_000, 1, 16).unwrap();
        wav[0] = b'X';
        assert!(matches!(
            WavHeader::parse(&wav),
            Err(WavError::MalformedHeader(_))
        ));
    }

    #[test]
    fn parse_rejects_non_pcm_format() {
        let mut wav = encode(&[0, 0], 24_000, 1, 16).unwrap();
        wav[20] = 3; // IEEE float
        assert!(matches!(
            WavHeader::parse(&wav),
            Err(WavError::MalformedHeader(_))
        ));
    }
}
