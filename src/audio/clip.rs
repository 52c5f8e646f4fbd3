//! A captured (or decoded) mono audio clip.
//!
//! [`RecordedClip`] is the unit everything downstream operates on: the
//! quality gate validates it, the uploader serializes it to a WAV byte
//! buffer, and the player feeds its samples to the output device.

use crate::codec::{pcm, wav, WavError};

use super::resample::resample;

// ---------------------------------------------------------------------------
// RecordedClip
// ---------------------------------------------------------------------------

/// Mono normalized samples plus the rate they were captured (or decoded) at.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedClip {
    /// Mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl RecordedClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Clip length in seconds (`0.0` when the rate is unknown/zero).
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Return a copy of this clip converted to `target_rate` Hz.
    pub fn resampled(&self, target_rate: u32) -> RecordedClip {
        RecordedClip {
            samples: resample(&self.samples, self.sample_rate, target_rate),
            sample_rate: target_rate,
        }
    }

    /// Serialize the clip as a 16-bit mono WAV byte buffer.
    ///
    /// Samples are quantized to little-endian i16 PCM and wrapped in the
    /// canonical 44-byte header at the clip's own sample rate.  This is the
    /// upload payload format for transcription requests.
    ///
    /// # Errors
    ///
    /// [`WavError::InvalidParameter`] when the clip's sample rate is zero.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, WavError> {
        let pcm_bytes = pcm::f32_to_pcm16(&self.samples);
        wav::encode(&pcm_bytes, self.sample_rate, 1, 16)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WavHeader;

    #[test]
    fn duration_from_rate_and_length() {
        let clip = RecordedClip::new(vec![0.0; 12_000], 24_000);
        assert!((clip.duration_secs() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_rate_duration_is_zero() {
        let clip = RecordedClip::new(vec![0.0; 100], 0);
        assert_eq!(clip.duration_secs(), 0.0);
    }

    #[test]
    fn resampled_changes_rate_and_length() {
        let clip = RecordedClip::new(vec![0.5; 480], 48_000);
        let down = clip.resampled(16_000);
        assert_eq!(down.sample_rate, 16_000);
        assert_eq!(down.samples.len(), 160);
        assert!((down.duration_secs() - clip.duration_secs()).abs() < 1e-3);
    }

    #[test]
    fn wav_bytes_carry_the_clip_format() {
        let clip = RecordedClip::new(vec![0.25; 1_600], 16_000);
        let bytes = clip.to_wav_bytes().unwrap();

        let header = WavHeader::parse(&bytes).unwrap();
        assert_eq!(header.sample_rate, 16_000);
        assert_eq!(header.channels, 1);
        assert_eq!(header.bits_per_sample, 16);
        assert_eq!(header.data_len as usize, 1_600 * 2);
        assert_eq!(bytes.len(), 44 + 1_600 * 2);
    }

    #[test]
    fn empty_clip_encodes_to_bare_header() {
        let clip = RecordedClip::new(Vec::new(), 24_000);
        let bytes = clip.to_wav_bytes().unwrap();
        assert_eq!(bytes.len(), 44);
    }

    #[test]
    fn zero_rate_clip_cannot_encode() {
        let clip = RecordedClip::new(vec![0.0; 10], 0);
        assert!(clip.to_wav_bytes().is_err());
    }
}
