//! Pipeline orchestrator — drives both application flows end to end.
//!
//! ```text
//! StartRecording / StopRecording
//!   └─▶ toggle the shared recording buffer the capture thread fills
//!
//! TranscribeClip
//!   └─▶ drain buffer → quality gate → resample(16 kHz) → WAV encode
//!         └─▶ service.transcribe ──▶ TranscriptReady          [Processing → Success]
//!
//! TranscribeFiles { paths, mode }
//!   └─▶ load files (spawn_blocking) ─▶ combined or per-file requests
//!
//! GenerateSpeech { text, voice }
//!   └─▶ service.generate_speech ─▶ base64 decode ─▶ WAV encode
//!         ├─▶ export .wav (spawn_blocking) ─▶ SpeechReady
//!         └─▶ PCM → f32 → playback worker
//! ```
//!
//! Blocking work (file I/O, waiting on the playback thread) goes through
//! `tokio::task::spawn_blocking` so the async runtime never stalls.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::audio::{downmix_to_mono, AudioQuality, PlaybackWorker, RecordedClip};
use crate::codec::{self, pcm, wav};
use crate::config::AppConfig;
use crate::export;
use crate::remote::{AudioPayload, SpeechService};

use super::state::{GenerateStatus, SharedState, TranscribeStatus};

// ---------------------------------------------------------------------------
// Shared recording buffer
// ---------------------------------------------------------------------------

/// Samples accumulated by the capture feed thread while `active` is set.
#[derive(Debug, Default)]
pub struct RecordingState {
    /// Mono samples at `sample_rate`.
    pub samples: Vec<f32>,
    /// Rate the capture device delivers at (0 until the first chunk).
    pub sample_rate: u32,
    /// Whether the feed thread should currently append chunks.
    pub active: bool,
}

/// Thread-safe handle shared between the capture feed thread and the
/// orchestrator.
pub type SharedRecording = Arc<Mutex<RecordingState>>;

/// Construct an empty, inactive [`SharedRecording`].
pub fn new_shared_recording() -> SharedRecording {
    Arc::new(Mutex::new(RecordingState::default()))
}

// ---------------------------------------------------------------------------
// Commands and events
// ---------------------------------------------------------------------------

/// How multiple uploaded files are transcribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptionMode {
    /// All clips in one request, one continuous transcript.
    Combined,
    /// One request per clip, one transcript per file.
    Separate,
}

/// Commands the shell sends to the orchestrator.
#[derive(Debug, Clone)]
pub enum PipelineCommand {
    StartRecording,
    StopRecording,
    /// Transcribe the most recent microphone recording.
    TranscribeClip,
    /// Transcribe audio files from disk.
    TranscribeFiles {
        paths: Vec<PathBuf>,
        mode: TranscriptionMode,
    },
    /// Synthesize `text` with a voice, play it, and export a `.wav`.
    GenerateSpeech { text: String, voice_id: String },
    /// Play a short sample of a voice without exporting anything.
    PreviewVoice { voice_id: String },
    /// Abandon any in-progress recording and reset both statuses.
    Cancel,
}

/// One file's transcript in [`TranscriptionMode::Separate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTranscript {
    pub file_name: String,
    pub text: String,
}

/// Progress and results the orchestrator emits.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    RecordingStarted,
    RecordingStopped { duration_secs: f32 },
    TranscriptReady { text: String },
    FileTranscriptsReady { results: Vec<FileTranscript> },
    SpeechReady { path: PathBuf, duration_secs: f32 },
    PreviewFinished { voice_id: String },
    Error { message: String },
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Drives capture → transcription and text → speech.
///
/// Create with [`Pipeline::new`], then spawn [`run`](Self::run) as a tokio
/// task; it serves commands until the channel closes.
pub struct Pipeline {
    state: SharedState,
    recording: SharedRecording,
    service: Arc<dyn SpeechService>,
    /// `None` when no output device is available (headless hosts); speech is
    /// still generated and exported, just not played.
    player: Option<PlaybackWorker>,
    quality: AudioQuality,
    config: AppConfig,
}

impl Pipeline {
    pub fn new(
        state: SharedState,
        recording: SharedRecording,
        service: Arc<dyn SpeechService>,
        player: Option<PlaybackWorker>,
        config: AppConfig,
    ) -> Self {
        let quality = AudioQuality::new(
            config.audio.min_recording_secs,
            config.audio.max_recording_secs,
        );
        Self {
            state,
            recording,
            service,
            player,
            quality,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Serve commands until `command_rx` closes.
    pub async fn run(
        self,
        mut command_rx: mpsc::Receiver<PipelineCommand>,
        event_tx: mpsc::Sender<PipelineEvent>,
    ) {
        while let Some(command) = command_rx.recv().await {
            match command {
                PipelineCommand::StartRecording => self.handle_start(&event_tx).await,
                PipelineCommand::StopRecording => self.handle_stop(&event_tx).await,
                PipelineCommand::TranscribeClip => self.handle_transcribe_clip(&event_tx).await,
                PipelineCommand::TranscribeFiles { paths, mode } => {
                    self.handle_transcribe_files(paths, mode, &event_tx).await
                }
                PipelineCommand::GenerateSpeech { text, voice_id } => {
                    self.handle_generate(&text, &voice_id, &event_tx).await
                }
                PipelineCommand::PreviewVoice { voice_id } => {
                    self.handle_preview(&voice_id, &event_tx).await
                }
                PipelineCommand::Cancel => self.handle_cancel(),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    async fn handle_start(&self, event_tx: &mpsc::Sender<PipelineEvent>) {
        {
            let mut rec = self.recording.lock().unwrap();
            rec.samples.clear();
            rec.active = true;
        }
        {
            let mut state = self.state.lock().unwrap();
            state.transcribe = TranscribeStatus::Recording;
            state.error_message = None;
            state.recording_secs = 0.0;
        }
        let _ = event_tx.send(PipelineEvent::RecordingStarted).await;
    }

    async fn handle_stop(&self, event_tx: &mpsc::Sender<PipelineEvent>) {
        let duration_secs = {
            let mut rec = self.recording.lock().unwrap();
            rec.active = false;
            if rec.sample_rate == 0 {
                0.0
            } else {
                rec.samples.len() as f32 / rec.sample_rate as f32
            }
        };
        {
            let mut state = self.state.lock().unwrap();
            state.transcribe = TranscribeStatus::Idle;
            state.recording_secs = duration_secs;
        }
        let _ = event_tx
            .send(PipelineEvent::RecordingStopped { duration_secs })
            .await;
    }

    // -----------------------------------------------------------------------
    // Transcription
    // -----------------------------------------------------------------------

    async fn handle_transcribe_clip(&self, event_tx: &mpsc::Sender<PipelineEvent>) {
        let clip = {
            let mut rec = self.recording.lock().unwrap();
            rec.active = false;
            RecordedClip::new(std::mem::take(&mut rec.samples), rec.sample_rate)
        };

        if clip.is_empty() {
            self.fail_transcribe("no recording to transcribe", event_tx)
                .await;
            return;
        }
        if let Err(e) = self.quality.validate(&clip) {
            self.fail_transcribe(&e.to_string(), event_tx).await;
            return;
        }

        self.set_transcribe(TranscribeStatus::Processing);

        // Shrink the upload: mono 16 kHz is plenty for speech recognition
        let upload = clip.resampled(self.config.audio.upload_sample_rate);
        let wav_bytes = match upload.to_wav_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.fail_transcribe(&e.to_string(), event_tx).await;
                return;
            }
        };

        match self.service.transcribe(&wav_bytes, "audio/wav").await {
            Ok(text) => self.finish_transcript(text, event_tx).await,
            Err(e) => self.fail_transcribe(&e.to_string(), event_tx).await,
        }
    }

    async fn handle_transcribe_files(
        &self,
        paths: Vec<PathBuf>,
        mode: TranscriptionMode,
        event_tx: &mpsc::Sender<PipelineEvent>,
    ) {
        if paths.is_empty() {
            self.fail_transcribe("no files to transcribe", event_tx).await;
            return;
        }

        self.set_transcribe(TranscribeStatus::Processing);

        // File reads are blocking; keep them off the async runtime.
        let loaded = tokio::task::spawn_blocking(move || {
            paths
                .iter()
                .map(|path| {
                    export::load_audio_file(path).map(|payload| (display_name(path), payload))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .await;

        let files: Vec<(String, AudioPayload)> = match loaded {
            Ok(Ok(files)) => files,
            Ok(Err(e)) => {
                self.fail_transcribe(&e.to_string(), event_tx).await;
                return;
            }
            Err(e) => {
                self.fail_transcribe(&format!("internal error: {e}"), event_tx)
                    .await;
                return;
            }
        };

        match mode {
            TranscriptionMode::Combined => {
                let payloads: Vec<AudioPayload> =
                    files.into_iter().map(|(_, payload)| payload).collect();
                match self.service.transcribe_combined(&payloads).await {
                    Ok(text) => self.finish_transcript(text, event_tx).await,
                    Err(e) => self.fail_transcribe(&e.to_string(), event_tx).await,
                }
            }
            TranscriptionMode::Separate => {
                let mut results = Vec::with_capacity(files.len());
                for (file_name, payload) in files {
                    match self
                        .service
                        .transcribe(&payload.bytes, &payload.mime_type)
                        .await
                    {
                        Ok(text) => results.push(FileTranscript { file_name, text }),
                        Err(e) => {
                            self.fail_transcribe(
                                &format!("{file_name}: {e}"),
                                event_tx,
                            )
                            .await;
                            return;
                        }
                    }
                }

                {
                    let mut state = self.state.lock().unwrap();
                    state.transcribe = TranscribeStatus::Success;
                    state.transcript = Some(join_transcripts(&results));
                }
                let _ = event_tx
                    .send(PipelineEvent::FileTranscriptsReady { results })
                    .await;
            }
        }
    }

    async fn finish_transcript(&self, text: String, event_tx: &mpsc::Sender<PipelineEvent>) {
        {
            let mut state = self.state.lock().unwrap();
            state.transcribe = TranscribeStatus::Success;
            state.transcript = Some(text.clone());
        }
        let _ = event_tx.send(PipelineEvent::TranscriptReady { text }).await;
    }

    // -----------------------------------------------------------------------
    // Speech generation
    // -----------------------------------------------------------------------

    async fn handle_generate(
        &self,
        text: &str,
        voice_id: &str,
        event_tx: &mpsc::Sender<PipelineEvent>,
    ) {
        if text.trim().is_empty() {
            self.fail_generate("no text to synthesize", event_tx).await;
            return;
        }

        self.set_generate(GenerateStatus::Processing);

        let samples = match self.synthesize(text, voice_id, event_tx).await {
            Some(samples) => samples,
            None => return, // synthesize already reported the failure
        };

        // Export first so the file exists even if playback is unavailable.
        // The service's PCM bytes go into the container verbatim; the f32
        // conversion is for playback only.
        let audio_cfg = &self.config.audio;
        let wav_bytes = match wav::encode(
            &samples.pcm_bytes,
            audio_cfg.pcm_sample_rate,
            audio_cfg.pcm_channels,
            audio_cfg.pcm_bits_per_sample,
        ) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.fail_generate(&e.to_string(), event_tx).await;
                return;
            }
        };

        let dir = self.config.export.resolved_dir();
        let written = tokio::task::spawn_blocking(move || {
            export::write_wav_file(&dir, "speech", &wav_bytes)
        })
        .await;

        let path = match written {
            Ok(Ok(path)) => path,
            Ok(Err(e)) => {
                self.fail_generate(&e.to_string(), event_tx).await;
                return;
            }
            Err(e) => {
                self.fail_generate(&format!("internal error: {e}"), event_tx)
                    .await;
                return;
            }
        };

        self.play_to_completion(samples.mono, audio_cfg.pcm_sample_rate)
            .await;

        {
            let mut state = self.state.lock().unwrap();
            state.generate = GenerateStatus::Success;
            state.last_export = Some(path.clone());
        }
        let _ = event_tx
            .send(PipelineEvent::SpeechReady {
                path,
                duration_secs: samples.duration_secs,
            })
            .await;
    }

    async fn handle_preview(&self, voice_id: &str, event_tx: &mpsc::Sender<PipelineEvent>) {
        self.set_generate(GenerateStatus::Previewing);

        let preview_text = self.config.tts.preview_text.clone();
        let samples = match self.synthesize(&preview_text, voice_id, event_tx).await {
            Some(samples) => samples,
            None => return,
        };

        self.play_to_completion(samples.mono, self.config.audio.pcm_sample_rate)
            .await;

        self.set_generate(GenerateStatus::Idle);
        let _ = event_tx
            .send(PipelineEvent::PreviewFinished {
                voice_id: voice_id.to_string(),
            })
            .await;
    }

    /// Call the service and decode its base64 PCM payload.
    ///
    /// On failure, reports through [`fail_generate`](Self::fail_generate) and
    /// returns `None`.
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        event_tx: &mpsc::Sender<PipelineEvent>,
    ) -> Option<DecodedSpeech> {
        let payload_b64 = match self.service.generate_speech(text, voice_id).await {
            Ok(payload) => payload,
            Err(e) => {
                self.fail_generate(&e.to_string(), event_tx).await;
                return None;
            }
        };

        let pcm_bytes = match codec::base64::decode(&payload_b64) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.fail_generate(&e.to_string(), event_tx).await;
                return None;
            }
        };

        let interleaved = match pcm::pcm16_to_f32(&pcm_bytes) {
            Ok(samples) => samples,
            Err(e) => {
                self.fail_generate(&e.to_string(), event_tx).await;
                return None;
            }
        };

        let audio_cfg = &self.config.audio;
        let mono = downmix_to_mono(&interleaved, audio_cfg.pcm_channels);
        let duration_secs = if audio_cfg.pcm_sample_rate == 0 {
            0.0
        } else {
            mono.len() as f32 / audio_cfg.pcm_sample_rate as f32
        };

        Some(DecodedSpeech {
            pcm_bytes,
            mono,
            duration_secs,
        })
    }

    /// Hand `samples` to the playback worker and wait for the clip to end.
    ///
    /// A missing worker (headless host) is a no-op, not an error.
    async fn play_to_completion(&self, samples: Vec<f32>, sample_rate: u32) {
        let Some(player) = &self.player else {
            return;
        };
        let done = player.play(samples, sample_rate);
        // recv blocks until the worker finishes the clip (or is gone)
        let _ = tokio::task::spawn_blocking(move || done.recv()).await;
    }

    // -----------------------------------------------------------------------
    // Cancel / status plumbing
    // -----------------------------------------------------------------------

    fn handle_cancel(&self) {
        {
            let mut rec = self.recording.lock().unwrap();
            rec.active = false;
            rec.samples.clear();
        }
        let mut state = self.state.lock().unwrap();
        state.transcribe = TranscribeStatus::Idle;
        state.generate = GenerateStatus::Idle;
        state.error_message = None;
        state.recording_secs = 0.0;
    }

    fn set_transcribe(&self, status: TranscribeStatus) {
        let mut state = self.state.lock().unwrap();
        state.transcribe = status;
        state.error_message = None;
    }

    fn set_generate(&self, status: GenerateStatus) {
        let mut state = self.state.lock().unwrap();
        state.generate = status;
        state.error_message = None;
    }

    async fn fail_transcribe(&self, message: &str, event_tx: &mpsc::Sender<PipelineEvent>) {
        log::warn!("transcription failed: {message}");
        {
            let mut state = self.state.lock().unwrap();
            state.transcribe = TranscribeStatus::Error;
            state.error_message = Some(message.to_string());
        }
        let _ = event_tx
            .send(PipelineEvent::Error {
                message: message.to_string(),
            })
            .await;
    }

    async fn fail_generate(&self, message: &str, event_tx: &mpsc::Sender<PipelineEvent>) {
        log::warn!("speech generation failed: {message}");
        {
            let mut state = self.state.lock().unwrap();
            state.generate = GenerateStatus::Error;
            state.error_message = Some(message.to_string());
        }
        let _ = event_tx
            .send(PipelineEvent::Error {
                message: message.to_string(),
            })
            .await;
    }
}

/// Decoded synthesis output in both layouts the pipeline needs.
struct DecodedSpeech {
    /// As delivered: raw little-endian PCM, exported into the container
    /// verbatim.
    pcm_bytes: Vec<u8>,
    /// Normalized and downmixed for the mono playback path.
    mono: Vec<f32>,
    duration_secs: f32,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn join_transcripts(results: &[FileTranscript]) -> String {
    results
        .iter()
        .map(|r| format!("--- {} ---\n\n{}", r.file_name, r.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
