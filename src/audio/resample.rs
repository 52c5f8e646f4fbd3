//! Sample-rate conversion and channel mixing.
//!
//! Two conversions bracket every clip's life:
//!
//! 1. [`downmix_to_mono`] — collapse interleaved capture channels before
//!    upload (the transcription service needs no stereo image).
//! 2. [`resample`] — linear-interpolation rate conversion, used to shrink
//!    recordings to the 16 kHz upload rate and to match 24 kHz synthesized
//!    speech to whatever rate the output device runs at.
//!
//! Linear interpolation is audibly transparent for speech; a windowed-sinc
//! resampler would only matter for music-grade material.

// ---------------------------------------------------------------------------
// downmix_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging each frame.
///
/// The output length is `samples.len() / channels`.  Already-mono input is
/// returned as an owned copy; `channels == 0` yields an empty vector.
///
/// # Example
///
/// ```rust
/// use voice_studio::audio::downmix_to_mono;
///
/// let stereo = [0.5_f32, -0.5, 0.2, -0.2]; // L R L R
/// let mono = downmix_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!(mono[0].abs() < 1e-6);
/// ```
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// resample
// ---------------------------------------------------------------------------

/// Resample mono `samples` from `source_rate` Hz to `target_rate` Hz by
/// linear interpolation.
///
/// * Equal rates return an owned copy unchanged.
/// * Empty input, or a zero source/target rate, returns an empty vector.
///
/// The output length is `ceil(samples.len() * target_rate / source_rate)`.
///
/// # Example
///
/// ```rust
/// use voice_studio::audio::resample;
///
/// // 10 ms at 48 kHz → 10 ms at 16 kHz
/// let out = resample(&vec![0.5_f32; 480], 48_000, 16_000);
/// assert_eq!(out.len(), 160);
///
/// // 10 ms at 24 kHz → 10 ms at 48 kHz (upsampling for playback)
/// let out = resample(&vec![0.5_f32; 240], 24_000, 48_000);
/// assert_eq!(out.len(), 480);
/// ```
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == 0 || target_rate == 0 || samples.is_empty() {
        return Vec::new();
    }
    if source_rate == target_rate {
        return samples.to_vec();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
