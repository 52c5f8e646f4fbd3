//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they round-trip through `settings.toml` and can be shared across
//! threads as part of a config snapshot.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::AppPaths;

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

/// Connection settings for the remote speech service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Gemini REST surface.
    pub base_url: String,
    /// API key.  `None` falls back to the `GEMINI_API_KEY` environment
    /// variable at call time.
    pub api_key: Option<String>,
    /// Model used for audio transcription.
    pub model: String,
    /// Model used for speech synthesis.
    pub tts_model: String,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            model: "gemini-2.5-flash".into(),
            tts_model: "gemini-2.5-flash-preview-tts".into(),
            timeout_secs: 60,
        }
    }
}

impl ApiConfig {
    /// The API key to send: the configured value when present and non-empty,
    /// otherwise the `GEMINI_API_KEY` environment variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Some(key.to_string()),
            _ => std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Audio capture settings and the PCM conventions of the speech service.
///
/// The service returns headerless PCM; its format is not carried in-band, so
/// the three `pcm_*` fields state the convention (24 kHz, mono, 16-bit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate of synthesized PCM in Hz.
    pub pcm_sample_rate: u32,
    /// Channel count of synthesized PCM.
    pub pcm_channels: u16,
    /// Bit depth of synthesized PCM.
    pub pcm_bits_per_sample: u16,
    /// Rate recordings are downsampled to before upload.
    pub upload_sample_rate: u32,
    /// Input device name — `None` means the system default.
    pub input_device: Option<String>,
    /// Minimum recording length in seconds accepted for transcription.
    pub min_recording_secs: f32,
    /// Maximum recording length in seconds accepted for transcription.
    pub max_recording_secs: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            pcm_sample_rate: 24_000,
            pcm_channels: 1,
            pcm_bits_per_sample: 16,
            upload_sample_rate: 16_000,
            input_device: None,
            min_recording_secs: 0.5,
            max_recording_secs: 300.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Speech-generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Voice used when none is selected explicitly.
    pub default_voice: String,
    /// Sentence spoken when previewing a voice.
    pub preview_text: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            default_voice: "Kore".into(),
            preview_text: "Hello, this is a sample of my voice.".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ExportConfig
// ---------------------------------------------------------------------------

/// Where generated `.wav` files land.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export directory override; `None` uses the platform download dir.
    pub directory: Option<PathBuf>,
}

impl ExportConfig {
    /// The directory exports are written to.
    pub fn resolved_dir(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| AppPaths::new().export_dir)
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_studio::config::AppConfig;
///
/// // Load (returns Default when the file is missing)
/// let config = AppConfig::load().unwrap();
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote speech service settings.
    pub api: ApiConfig,
    /// Capture settings and PCM conventions.
    pub audio: AudioConfig,
    /// Speech-generation settings.
    pub tts: TtsConfig,
    /// Export location settings.
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet,
    /// so callers never special-case a first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.api.base_url, loaded.api.base_url);
        assert_eq!(original.api.model, loaded.api.model);
        assert_eq!(original.api.tts_model, loaded.api.tts_model);
        assert_eq!(original.api.timeout_secs, loaded.api.timeout_secs);
        assert_eq!(original.audio.pcm_sample_rate, loaded.audio.pcm_sample_rate);
        assert_eq!(original.audio.pcm_channels, loaded.audio.pcm_channels);
        assert_eq!(
            original.audio.upload_sample_rate,
            loaded.audio.upload_sample_rate
        );
        assert_eq!(original.tts.default_voice, loaded.tts.default_voice);
        assert_eq!(original.export.directory, loaded.export.directory);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.api.base_url, default.api.base_url);
        assert_eq!(config.audio.pcm_sample_rate, default.audio.pcm_sample_rate);
        assert_eq!(config.tts.default_voice, default.tts.default_voice);
    }

    #[test]
    fn defaults_match_service_conventions() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.api.base_url, "https://generativelanguage.googleapis.com");
        assert!(cfg.api.api_key.is_none());
        assert_eq!(cfg.audio.pcm_sample_rate, 24_000);
        assert_eq!(cfg.audio.pcm_channels, 1);
        assert_eq!(cfg.audio.pcm_bits_per_sample, 16);
        assert_eq!(cfg.audio.upload_sample_rate, 16_000);
        assert_eq!(cfg.tts.default_voice, "Kore");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.api.api_key = Some("test-key".into());
        cfg.api.timeout_secs = 120;
        cfg.audio.input_device = Some("USB Microphone".into());
        cfg.audio.max_recording_secs = 60.0;
        cfg.tts.default_voice = "Puck".into();
        cfg.export.directory = Some(PathBuf::from("/tmp/exports"));

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.api.api_key, Some("test-key".into()));
        assert_eq!(loaded.api.timeout_secs, 120);
        assert_eq!(loaded.audio.input_device, Some("USB Microphone".into()));
        assert_eq!(loaded.audio.max_recording_secs, 60.0);
        assert_eq!(loaded.tts.default_voice, "Puck");
        assert_eq!(loaded.export.directory, Some(PathBuf::from("/tmp/exports")));
    }

    #[test]
    fn configured_key_wins_over_environment() {
        let cfg = ApiConfig {
            api_key: Some("configured".into()),
            ..Default::default()
        };
        assert_eq!(cfg.resolved_api_key(), Some("configured".into()));
    }

    #[test]
    fn empty_configured_key_is_ignored() {
        let cfg = ApiConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        // Falls through to the environment; either way, never Some("")
        assert_ne!(cfg.resolved_api_key(), Some(String::new()));
    }

    #[test]
    fn export_dir_override_is_used() {
        let export = ExportConfig {
            directory: Some(PathBuf::from("/tmp/wav-out")),
        };
        assert_eq!(export.resolved_dir(), PathBuf::from("/tmp/wav-out"));
    }
}
