//! Pre-upload clip validation.
//!
//! Every transcription request costs a network round-trip, so a captured
//! clip is checked locally first:
//!
//! | Check    | Rejects                                              |
//! |----------|------------------------------------------------------|
//! | Duration | Clips outside `[min_secs, max_secs]`                 |
//! | Silence  | Clips whose peak amplitude never leaves the noise floor |
//! | Clipping | Clips where too many samples sit at full scale       |
//!
//! Unlike a fixed-rate STT front end, clips here arrive at whatever rate the
//! input device ran at, so all duration math uses the clip's own rate.

use thiserror::Error;

use super::clip::RecordedClip;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Reason a clip failed validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    #[error("recording too short: {got_secs:.2}s (minimum {min_secs:.2}s)")]
    TooShort { min_secs: f32, got_secs: f32 },

    #[error("recording too long: {got_secs:.2}s (maximum {max_secs:.2}s)")]
    TooLong { max_secs: f32, got_secs: f32 },

    #[error("audio too quiet: peak amplitude {amplitude:.4} (threshold {threshold:.4})")]
    TooQuiet { amplitude: f32, threshold: f32 },

    #[error("audio clipping: {clipped_pct:.1}% of samples at full scale (max {max_pct:.1}%)")]
    Clipping { clipped_pct: f32, max_pct: f32 },
}

// ---------------------------------------------------------------------------
// AudioQuality
// ---------------------------------------------------------------------------

/// Validates a [`RecordedClip`] before it is shipped to the speech service.
pub struct AudioQuality {
    /// Minimum clip duration in seconds.
    pub min_recording_secs: f32,
    /// Maximum clip duration in seconds.
    pub max_recording_secs: f32,
    /// Peak amplitude below which the clip counts as silence.
    pub silence_threshold: f32,
    /// Amplitude at or above which a sample counts as clipped.
    pub clipping_threshold: f32,
    /// Maximum tolerated percentage of clipped samples.
    pub clipping_max_pct: f32,
}

impl Default for AudioQuality {
    fn default() -> Self {
        Self {
            min_recording_secs: 0.5,
            max_recording_secs: 300.0,
            silence_threshold: 0.01,
            clipping_threshold: 0.99,
            clipping_max_pct: 10.0,
        }
    }
}

impl AudioQuality {
    /// Validator with the given duration window and default thresholds.
    pub fn new(min_secs: f32, max_secs: f32) -> Self {
        Self {
            min_recording_secs: min_secs,
            max_recording_secs: max_secs,
            ..Default::default()
        }
    }

    /// Run all checks against `clip`, returning the first failure.
    ///
    /// Order: duration, silence, clipping.
    pub fn validate(&self, clip: &RecordedClip) -> Result<(), AudioError> {
        let duration_secs = clip.duration_secs();

        if duration_secs < self.min_recording_secs {
            return Err(AudioError::TooShort {
                min_secs: self.min_recording_secs,
                got_secs: duration_secs,
            });
        }
        if duration_secs > self.max_recording_secs {
            return Err(AudioError::TooLong {
                max_secs: self.max_recording_secs,
                got_secs: duration_secs,
            });
        }

        let peak = clip
            .samples
            .iter()
            .map(|s| s.abs())
            .fold(0.0_f32, f32::max);

        if peak < self.silence_threshold {
            return Err(AudioError::TooQuiet {
                amplitude: peak,
                threshold: self.silence_threshold,
            });
        }

        if !clip.samples.is_empty() {
            let clipped = clip
                .samples
                .iter()
                .filter(|&&s| s.abs() > self.clipping_threshold)
                .count();
            let clipped_pct = clipped as f32 / clip.samples.len() as f32 * 100.0;

            if clipped_pct > self.clipping_max_pct {
                return Err(AudioError::Clipping {
                    clipped_pct,
                    max_pct: self.clipping_max_pct,
                });
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn clip_at(rate: u32, secs: f32, amplitude: f32) -> RecordedClip {
        let n = (secs * rate as f32) as usize;
        RecordedClip::new(vec![amplitude; n], rate)
    }

    #[test]
    fn ordinary_speech_clip_passes() {
        let gate = AudioQuality::default();
        assert!(gate.validate(&clip_at(24_000, 2.0, 0.3)).is_ok());
    }

    #[test]
    fn duration_uses_the_clip_rate() {
        // 8 000 samples is 0.5 s at 16 kHz but only ~0.17 s at 48 kHz
        let gate = AudioQuality::new(0.5, 300.0);
        assert!(gate.validate(&clip_at(16_000, 0.5, 0.3)).is_ok());

        let too_short = RecordedClip::new(vec![0.3; 8_000], 48_000);
        assert!(matches!(
            gate.validate(&too_short),
            Err(AudioError::TooShort { .. })
        ));
    }

    #[test]
    fn short_clip_rejected() {
        let gate = AudioQuality::new(0.5, 300.0);
        let err = gate.validate(&clip_at(24_000, 0.1, 0.3)).unwrap_err();
        assert!(matches!(err, AudioError::TooShort { .. }), "{err}");
    }

    #[test]
    fn long_clip_rejected() {
        let gate = AudioQuality::new(0.5, 10.0);
        let err = gate.validate(&clip_at(16_000, 11.0, 0.3)).unwrap_err();
        assert!(matches!(err, AudioError::TooLong { .. }), "{err}");
    }

    #[test]
    fn silent_clip_rejected() {
        let gate = AudioQuality::default();
        let err = gate.validate(&clip_at(24_000, 1.0, 0.0)).unwrap_err();
        assert!(matches!(err, AudioError::TooQuiet { .. }), "{err}");
    }

    #[test]
    fn clipped_clip_rejected() {
        let mut gate = AudioQuality::default();
        gate.clipping_max_pct = 5.0;
        let err = gate.validate(&clip_at(24_000, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, AudioError::Clipping { .. }), "{err}");
    }

    #[test]
    fn minor_clipping_tolerated() {
        let gate = AudioQuality::default(); // 10% ceiling
        let total = 24_000usize;
        let clipped = total / 20; // 5%
        let mut samples = vec![0.3_f32; total - clipped];
        samples.extend(vec![1.0_f32; clipped]);
        assert!(gate.validate(&RecordedClip::new(samples, 24_000)).is_ok());
    }

    #[test]
    fn boundary_duration_passes() {
        let gate = AudioQuality::new(0.5, 300.0);
        assert!(gate.validate(&clip_at(24_000, 0.5, 0.2)).is_ok());
    }

    #[test]
    fn error_messages_carry_measurements() {
        let err = AudioError::TooShort {
            min_secs: 0.5,
            got_secs: 0.1,
        };
        let msg = err.to_string();
        assert!(msg.contains("0.10"), "message: {msg}");
        assert!(msg.contains("0.50"), "message: {msg}");
    }
}
