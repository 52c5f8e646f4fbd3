//! Binary audio-format handling — the codec core.
//!
//! The speech service transports raw PCM as base64 strings; everything the
//! application plays or exports goes through this module:
//!
//! ```text
//! base64 string ─▶ base64::decode ─▶ PCM bytes ─┬▶ pcm::pcm16_to_f32 ─▶ playback
//!                                               └▶ wav::encode ──────▶ .wav export
//! captured f32 ─▶ pcm::f32_to_pcm16 ─▶ wav::encode ─▶ upload payload
//! ```
//!
//! All operations are synchronous, pure functions over in-memory buffers —
//! deterministic, no I/O, no shared state.

pub mod base64;
pub mod pcm;
pub mod wav;

pub use self::base64::DecodeError;
pub use pcm::{f32_to_pcm16, pcm16_to_f32, PcmError};
pub use wav::{WavError, WavHeader, HEADER_LEN};
