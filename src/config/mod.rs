//! Configuration: platform paths and TOML-backed settings.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{ApiConfig, AppConfig, AudioConfig, ExportConfig, TtsConfig};
