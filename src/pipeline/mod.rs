//! Pipeline — command-driven orchestration of both application flows.

pub mod runner;
pub mod state;

pub use runner::{
    new_shared_recording, FileTranscript, Pipeline, PipelineCommand, PipelineEvent,
    RecordingState, SharedRecording, TranscriptionMode,
};
pub use state::{new_shared_state, AppState, GenerateStatus, SharedState, TranscribeStatus};
