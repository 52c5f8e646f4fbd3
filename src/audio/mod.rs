//! Audio device handling — capture, playback, clip assembly, validation.
//!
//! # Capture path
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → downmix_to_mono
//!           → RecordedClip → AudioQuality → resample(16 kHz) → WAV upload
//! ```
//!
//! # Playback path
//!
//! ```text
//! decoded PCM f32 (24 kHz) → resample(device rate) → AudioPlayer → speakers
//! ```

pub mod capture;
pub mod clip;
pub mod playback;
pub mod quality;
pub mod resample;

pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use clip::RecordedClip;
pub use playback::{AudioPlayer, PlaybackError, PlaybackHandle, PlaybackWorker};
pub use quality::{AudioError, AudioQuality};
pub use resample::{downmix_to_mono, resample};
