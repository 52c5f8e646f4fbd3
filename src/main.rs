//! Application entry point — voice-studio.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the speech service client ([`GeminiClient`]) from config.
//! 5. Create pipeline channels (`command`, `event`).
//! 6. Start the playback worker (skipped with a warning on headless hosts).
//! 7. Start cpal capture, feeding the shared recording buffer.
//! 8. Spawn the pipeline orchestrator and the event printer on the runtime.
//! 9. Run the stdin command loop on the main thread until `quit`.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use voice_studio::{
    audio::{downmix_to_mono, AudioCapture, AudioChunk, PlaybackWorker},
    config::AppConfig,
    pipeline::{
        new_shared_recording, new_shared_state, Pipeline, PipelineCommand, PipelineEvent,
        SharedRecording, TranscriptionMode,
    },
    remote::{voices, GeminiClient, SpeechService},
};

// ---------------------------------------------------------------------------
// Capture feed
// ---------------------------------------------------------------------------

/// Drain cpal chunks into the shared recording buffer while recording is
/// active.  Runs on its own thread for the life of the process.
fn spawn_capture_feed(
    recording: SharedRecording,
    chunk_rx: std::sync::mpsc::Receiver<AudioChunk>,
    max_recording_secs: f32,
) {
    std::thread::Builder::new()
        .name("audio-feed".into())
        .spawn(move || {
            while let Ok(chunk) = chunk_rx.recv() {
                let mut rec = recording.lock().unwrap();
                if !rec.active {
                    continue;
                }

                rec.sample_rate = chunk.sample_rate;

                // Stop accumulating past the configured maximum
                let limit = (max_recording_secs * chunk.sample_rate as f32) as usize;
                if rec.samples.len() >= limit {
                    continue;
                }

                let mono = downmix_to_mono(&chunk.samples, chunk.channels);
                rec.samples.extend_from_slice(&mono);
            }
        })
        .expect("failed to spawn audio-feed thread");
}

// ---------------------------------------------------------------------------
// Event printer
// ---------------------------------------------------------------------------

async fn print_events(mut event_rx: mpsc::Receiver<PipelineEvent>) {
    while let Some(event) = event_rx.recv().await {
        match event {
            PipelineEvent::RecordingStarted => {
                println!("recording — type 'stop' to finish");
            }
            PipelineEvent::RecordingStopped { duration_secs } => {
                println!("stopped ({duration_secs:.1}s captured) — type 'transcribe' to send");
            }
            PipelineEvent::TranscriptReady { text } => {
                println!("--- transcript ---\n{text}");
            }
            PipelineEvent::FileTranscriptsReady { results } => {
                for r in &results {
                    println!("--- {} ---\n{}\n", r.file_name, r.text);
                }
            }
            PipelineEvent::SpeechReady {
                path,
                duration_secs,
            } => {
                println!("saved {} ({duration_secs:.1}s)", path.display());
            }
            PipelineEvent::PreviewFinished { voice_id } => {
                println!("previewed voice {voice_id}");
            }
            PipelineEvent::Error { message } => {
                eprintln!("error: {message}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Command parsing
// ---------------------------------------------------------------------------

fn print_help() {
    println!(
        "commands:\n\
         \x20 record                      start a microphone recording\n\
         \x20 stop                        stop the recording\n\
         \x20 transcribe                  transcribe the last recording\n\
         \x20 transcribe <files...>       transcribe audio files (--separate for per-file)\n\
         \x20 voices                      list available voices\n\
         \x20 voice <id>                  select a voice\n\
         \x20 preview [id]                play a short sample of a voice\n\
         \x20 say <text>                  synthesize text, play it, export a .wav\n\
         \x20 cancel                      abandon the current operation\n\
         \x20 quit                        exit"
    );
}

fn print_voices(selected: &str) {
    for voice in &voices::VOICES {
        let marker = if voice.id.eq_ignore_ascii_case(selected) {
            "*"
        } else {
            " "
        };
        println!("{marker} {:8} {}", voice.name, voice.description);
    }
}

/// Parse `transcribe` arguments into paths plus the transcription mode.
fn parse_transcribe_args(args: &[&str]) -> (Vec<PathBuf>, TranscriptionMode) {
    let mode = if args.contains(&"--separate") {
        TranscriptionMode::Separate
    } else {
        TranscriptionMode::Combined
    };
    let paths = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(|a| PathBuf::from(*a))
        .collect();
    (paths, mode)
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voice-studio starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 workers — transcription and synthesis can overlap)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Speech service client
    let service: Arc<dyn SpeechService> = Arc::new(GeminiClient::from_config(&config.api));
    if config.api.resolved_api_key().is_none() {
        log::warn!("No API key configured — set api.api_key in settings.toml or GEMINI_API_KEY");
    }

    // 5. Channel setup
    let (command_tx, command_rx) = mpsc::channel::<PipelineCommand>(16);
    let (event_tx, event_rx) = mpsc::channel::<PipelineEvent>(32);

    // 6. Playback worker — degrade gracefully without an output device
    let player = match PlaybackWorker::start() {
        Ok(worker) => Some(worker),
        Err(e) => {
            log::warn!("Audio output unavailable ({e}); speech will only be exported");
            None
        }
    };

    // 7. Capture — degrade gracefully without an input device
    let recording = new_shared_recording();
    let _stream_handle = match AudioCapture::new(config.audio.input_device.as_deref()) {
        Ok(capture) => {
            let (chunk_tx, chunk_rx) = std::sync::mpsc::channel::<AudioChunk>();
            spawn_capture_feed(
                Arc::clone(&recording),
                chunk_rx,
                config.audio.max_recording_secs,
            );
            match capture.start(chunk_tx) {
                Ok(handle) => {
                    log::info!(
                        "Audio capture ready ({} Hz, {} ch)",
                        capture.sample_rate(),
                        capture.channels()
                    );
                    Some(handle)
                }
                Err(e) => {
                    log::warn!("Failed to start audio stream: {e}");
                    None
                }
            }
        }
        Err(e) => {
            log::warn!("Audio capture unavailable: {e}");
            None
        }
    };

    // 8. Pipeline orchestrator + event printer
    let state = new_shared_state(config.clone());
    let pipeline = Pipeline::new(
        state,
        Arc::clone(&recording),
        service,
        player,
        config.clone(),
    );
    rt.spawn(pipeline.run(command_rx, event_tx));
    rt.spawn(print_events(event_rx));

    // 9. Command loop
    let mut selected_voice = config.tts.default_voice.clone();
    println!("voice-studio — type 'help' for commands");

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (word, rest) = match input.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (input, ""),
        };

        let command = match word {
            "help" => {
                print_help();
                continue;
            }
            "quit" | "exit" => break,
            "record" => Some(PipelineCommand::StartRecording),
            "stop" => Some(PipelineCommand::StopRecording),
            "transcribe" => {
                if rest.is_empty() {
                    Some(PipelineCommand::TranscribeClip)
                } else {
                    let args: Vec<&str> = rest.split_whitespace().collect();
                    let (paths, mode) = parse_transcribe_args(&args);
                    Some(PipelineCommand::TranscribeFiles { paths, mode })
                }
            }
            "voices" => {
                print_voices(&selected_voice);
                continue;
            }
            "voice" => {
                match voices::find(rest) {
                    Some(voice) => {
                        selected_voice = voice.id.to_string();
                        println!("voice set to {} ({})", voice.name, voice.description);
                    }
                    None => eprintln!("unknown voice \"{rest}\" — see 'voices'"),
                }
                continue;
            }
            "preview" => {
                let id = if rest.is_empty() {
                    selected_voice.clone()
                } else {
                    rest.to_string()
                };
                Some(PipelineCommand::PreviewVoice { voice_id: id })
            }
            "say" => Some(PipelineCommand::GenerateSpeech {
                text: rest.to_string(),
                voice_id: selected_voice.clone(),
            }),
            "cancel" => Some(PipelineCommand::Cancel),
            other => {
                eprintln!("unknown command \"{other}\" — type 'help'");
                continue;
            }
        };

        if let Some(command) = command {
            if command_tx.blocking_send(command).is_err() {
                break; // pipeline gone
            }
        }
    }

    log::info!("voice-studio shutting down");
    Ok(())
}
