//! Remote speech service — transcription and speech generation.
//!
//! The service contract is deliberately narrow (see [`client::SpeechService`]):
//! audio in → text out, text + voice in → base64 PCM out.  PCM format
//! metadata travels out-of-band via [`crate::config::AudioConfig`].

pub mod client;
pub mod voices;

pub use client::{AudioPayload, GeminiClient, RemoteError, SpeechService};
pub use voices::{Voice, VOICES};
