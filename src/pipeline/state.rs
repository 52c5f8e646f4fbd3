//! Pipeline status machines and shared application state.
//!
//! The two halves of the app run independent status machines, mirrored from
//! the recording/upload and generation flows they drive:
//!
//! ```text
//! Transcription:  Idle ──start──▶ Recording ──stop──▶ Idle
//!                 Idle ──transcribe──▶ Processing ──▶ Success | Error
//!
//! Generation:     Idle ──preview──▶ Previewing ──▶ Idle | Error
//!                 Idle ──generate──▶ Processing ──▶ Success | Error
//! ```
//!
//! [`AppState`] is the single source of truth a front end reads:
//! both statuses, the last transcript, the last export path, and any error
//! message.  [`SharedState`] (`Arc<Mutex<AppState>>`) is cheap to clone and
//! safe to share across threads.

use std::sync::{Arc, Mutex};

use std::path::PathBuf;

use crate::config::AppConfig;

// ---------------------------------------------------------------------------
// TranscribeStatus
// ---------------------------------------------------------------------------

/// Status of the audio → text flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscribeStatus {
    /// Waiting for a recording or an upload.
    #[default]
    Idle,
    /// Microphone is live; samples are accumulating.
    Recording,
    /// Clips are on their way to the speech service.
    Processing,
    /// A transcript is available.
    Success,
    /// The last attempt failed; see `AppState::error_message`.
    Error,
}

impl TranscribeStatus {
    /// `true` while recording or waiting on the service.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Recording | Self::Processing)
    }

    /// Short label for a status line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Recording => "Recording",
            Self::Processing => "Transcribing",
            Self::Success => "Done",
            Self::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// GenerateStatus
// ---------------------------------------------------------------------------

/// Status of the text → speech flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerateStatus {
    /// Waiting for text.
    #[default]
    Idle,
    /// A short voice sample is being synthesized and played.
    Previewing,
    /// Full synthesis is in flight.
    Processing,
    /// Audio was generated, exported, and played.
    Success,
    /// The last attempt failed; see `AppState::error_message`.
    Error,
}

impl GenerateStatus {
    /// `true` while synthesis (full or preview) is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Previewing | Self::Processing)
    }

    /// Short label for a status line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Previewing => "Previewing",
            Self::Processing => "Generating",
            Self::Success => "Done",
            Self::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared application state, mutated by the pipeline and read by the shell.
pub struct AppState {
    /// Audio → text status.
    pub transcribe: TranscribeStatus,

    /// Text → speech status.
    pub generate: GenerateStatus,

    /// Most recent transcript (combined form), if any.
    pub transcript: Option<String>,

    /// Path of the most recently exported `.wav`, if any.
    pub last_export: Option<PathBuf>,

    /// Message to show when either status is `Error`.
    pub error_message: Option<String>,

    /// Length of the in-progress (or just-stopped) recording in seconds.
    pub recording_secs: f32,

    /// Configuration snapshot the pipeline runs with.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            transcribe: TranscribeStatus::Idle,
            generate: GenerateStatus::Idle,
            transcript: None,
            last_export: None,
            error_message: None,
            recording_secs: 0.0,
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AppState`].
///
/// Lock for short critical sections only; never hold the lock across an
/// `.await` point.
pub type SharedState = Arc<Mutex<AppState>>;

/// Construct a new [`SharedState`] around a default [`AppState`].
pub fn new_shared_state(config: AppConfig) -> SharedState {
    Arc::new(Mutex::new(AppState::new(config)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- busy flags ---

    #[test]
    fn transcribe_busy_states() {
        assert!(!TranscribeStatus::Idle.is_busy());
        assert!(TranscribeStatus::Recording.is_busy());
        assert!(TranscribeStatus::Processing.is_busy());
        assert!(!TranscribeStatus::Success.is_busy());
        assert!(!TranscribeStatus::Error.is_busy());
    }

    #[test]
    fn generate_busy_states() {
        assert!(!GenerateStatus::Idle.is_busy());
        assert!(GenerateStatus::Previewing.is_busy());
        assert!(GenerateStatus::Processing.is_busy());
        assert!(!GenerateStatus::Success.is_busy());
        assert!(!GenerateStatus::Error.is_busy());
    }

    // ---- labels ---

    #[test]
    fn transcribe_labels() {
        assert_eq!(TranscribeStatus::Idle.label(), "Idle");
        assert_eq!(TranscribeStatus::Recording.label(), "Recording");
        assert_eq!(TranscribeStatus::Processing.label(), "Transcribing");
        assert_eq!(TranscribeStatus::Success.label(), "Done");
        assert_eq!(TranscribeStatus::Error.label(), "Error");
    }

    #[test]
    fn generate_labels() {
        assert_eq!(GenerateStatus::Previewing.label(), "Previewing");
        assert_eq!(GenerateStatus::Processing.label(), "Generating");
    }

    // ---- defaults / sharing ---

    #[test]
    fn default_statuses_are_idle() {
        let state = AppState::default();
        assert_eq!(state.transcribe, TranscribeStatus::Idle);
        assert_eq!(state.generate, GenerateStatus::Idle);
        assert!(state.transcript.is_none());
        assert!(state.last_export.is_none());
        assert!(state.error_message.is_none());
    }

    #[test]
    fn shared_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedState>();
    }

    #[test]
    fn shared_state_clones_see_mutations() {
        let state = new_shared_state(AppConfig::default());
        let state2 = Arc::clone(&state);

        state.lock().unwrap().transcribe = TranscribeStatus::Recording;
        assert_eq!(
            state2.lock().unwrap().transcribe,
            TranscribeStatus::Recording
        );
    }
}
