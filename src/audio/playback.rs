//! Audio output via `cpal`.
//!
//! The browser original leaned on a lazily created global `AudioContext`;
//! here the output device is an explicitly owned resource: construct an
//! [`AudioPlayer`], call [`play`](AudioPlayer::play), and drop the returned
//! [`PlaybackHandle`] to tear the stream down.  Nothing global, no implicit
//! lifetime.
//!
//! The player accepts mono normalized samples at any rate; it resamples to
//! the device's native rate and fans the mono signal out to every output
//! channel.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use super::resample::resample;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors raised while opening or running the output stream.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no output device found on the default audio host")]
    NoDevice,

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("failed to spawn playback thread: {0}")]
    Thread(String),
}

// ---------------------------------------------------------------------------
// PlaybackHandle
// ---------------------------------------------------------------------------

/// RAII guard for one playing clip.
///
/// The stream keeps running (emitting silence once the clip is exhausted)
/// until this handle is dropped.
pub struct PlaybackHandle {
    _stream: cpal::Stream,
    total_frames: usize,
    next_frame: Arc<AtomicUsize>,
}

impl PlaybackHandle {
    /// `true` once every clip sample has been handed to the device.
    pub fn is_finished(&self) -> bool {
        self.next_frame.load(Ordering::Relaxed) >= self.total_frames
    }

    /// Block until the clip has fully played, then a short tail so the
    /// device buffer drains before the stream is dropped.
    pub fn wait(self) {
        while !self.is_finished() {
            std::thread::sleep(Duration::from_millis(10));
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

// ---------------------------------------------------------------------------
// AudioPlayer
// ---------------------------------------------------------------------------

/// Output-device wrapper built on top of `cpal`.
///
/// # Example
///
/// ```rust,no_run
/// use voice_studio::audio::AudioPlayer;
///
/// let player = AudioPlayer::new().unwrap();
/// // 0.5 s of silence at the synthesis rate
/// let handle = player.play(&vec![0.0_f32; 12_000], 24_000).unwrap();
/// handle.wait(); // blocks until done; dropping early stops playback
/// ```
pub struct AudioPlayer {
    device: cpal::Device,
    sample_rate: u32,
    channels: u16,
}

impl AudioPlayer {
    /// Open the system default output device with its preferred
    /// configuration.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::NoDevice`] when no output device is available, or
    /// [`PlaybackError::DefaultConfig`] when it cannot report a stream
    /// configuration.
    pub fn new() -> Result<Self, PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlaybackError::NoDevice)?;

        let supported = device.default_output_config()?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();

        Ok(Self {
            device,
            sample_rate,
            channels,
        })
    }

    /// Play mono normalized `samples` recorded/decoded at `source_rate` Hz.
    ///
    /// The clip is resampled to the device rate up front and the same value
    /// is written to every output channel.  Returns immediately; use the
    /// [`PlaybackHandle`] to wait for completion or drop it to stop.
    pub fn play(
        &self,
        samples: &[f32],
        source_rate: u32,
    ) -> Result<PlaybackHandle, PlaybackError> {
        let device_samples: Arc<[f32]> =
            Arc::from(resample(samples, source_rate, self.sample_rate));
        let total_frames = device_samples.len();
        let next_frame = Arc::new(AtomicUsize::new(0));

        let config = cpal::StreamConfig {
            channels: self.channels,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let channels = self.channels as usize;
        let cursor = Arc::clone(&next_frame);
        let clip = Arc::clone(&device_samples);

        let stream = self.device.build_output_stream(
            &config,
            move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in out.chunks_mut(channels) {
                    let i = cursor.fetch_add(1, Ordering::Relaxed);
                    let sample = clip.get(i).copied().unwrap_or(0.0);
                    for slot in frame.iter_mut() {
                        *slot = sample;
                    }
                }
            },
            |err: cpal::StreamError| {
                log::error!("playback stream error: {err}");
            },
            None,
        )?;

        stream.play()?;

        Ok(PlaybackHandle {
            _stream: stream,
            total_frames,
            next_frame,
        })
    }

    /// Native sample rate of the output device in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of output channels the device runs.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// PlaybackWorker
// ---------------------------------------------------------------------------

struct PlaybackJob {
    samples: Vec<f32>,
    sample_rate: u32,
    done: std::sync::mpsc::Sender<()>,
}

/// A dedicated thread that owns the [`AudioPlayer`] and plays clips
/// sequentially.
///
/// `cpal::Stream` is not `Send`, so streams must live and die on one thread.
/// The worker keeps the whole device lifecycle there: clips are queued over
/// a channel, each plays to completion before the next starts, and dropping
/// the worker closes the channel and ends the thread.
pub struct PlaybackWorker {
    tx: std::sync::mpsc::Sender<PlaybackJob>,
}

impl PlaybackWorker {
    /// Spawn the worker thread and open the default output device on it.
    ///
    /// # Errors
    ///
    /// Propagates [`AudioPlayer::new`] failures (no device, no config), or
    /// [`PlaybackError::Thread`] when the thread cannot start.
    pub fn start() -> Result<Self, PlaybackError> {
        let (tx, rx) = std::sync::mpsc::channel::<PlaybackJob>();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), PlaybackError>>();

        std::thread::Builder::new()
            .name("audio-playback".into())
            .spawn(move || {
                let player = match AudioPlayer::new() {
                    Ok(player) => {
                        let _ = ready_tx.send(Ok(()));
                        player
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                while let Ok(job) = rx.recv() {
                    match player.play(&job.samples, job.sample_rate) {
                        Ok(handle) => handle.wait(),
                        Err(e) => log::error!("playback failed: {e}"),
                    }
                    // Receiver may have given up waiting; that's fine.
                    let _ = job.done.send(());
                }
            })
            .map_err(|e| PlaybackError::Thread(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { tx }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PlaybackError::Thread("worker exited during startup".into())),
        }
    }

    /// Queue a mono clip for playback.
    ///
    /// Returns a receiver that yields one `()` when the clip has finished
    /// (or errors immediately if the worker is gone).
    pub fn play(&self, samples: Vec<f32>, sample_rate: u32) -> std::sync::mpsc::Receiver<()> {
        let (done_tx, done_rx) = std::sync::mpsc::channel();
        let _ = self.tx.send(PlaybackJob {
            samples,
            sample_rate,
            done: done_tx,
        });
        done_rx
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
