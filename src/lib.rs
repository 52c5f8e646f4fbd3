//! voice-studio — audio transcription and speech generation against a
//! remote speech service.
//!
//! The crate records (or loads) audio, ships it to the service for
//! transcription, and turns typed text into synthesized speech that is
//! played locally and exported as a `.wav` file.  The speech service
//! transports raw PCM as base64; all container and sample-format work
//! happens locally in [`codec`].
//!
//! # Module map
//!
//! | Module       | Responsibility                                        |
//! |--------------|-------------------------------------------------------|
//! | [`codec`]    | base64 ↔ bytes, PCM ↔ `f32`, WAV container            |
//! | [`audio`]    | capture, playback, resampling, clip validation        |
//! | [`remote`]   | the speech service client and voice catalog           |
//! | [`pipeline`] | command-driven orchestration and status state         |
//! | [`config`]   | `settings.toml` and platform paths                    |
//! | [`export`]   | `.wav` export and audio-file loading                  |

pub mod audio;
pub mod codec;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod remote;
