//! Audio file I/O — exporting `.wav` buffers and loading clips for upload.
//!
//! Exports never overwrite: `speech.wav`, `speech-1.wav`, `speech-2.wav`, …
//! Loading maps the file extension to the MIME type the speech service
//! expects; unrecognized extensions are rejected up front rather than
//! shipped and bounced by the API.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::remote::AudioPayload;

// ---------------------------------------------------------------------------
// ExportError
// ---------------------------------------------------------------------------

/// Errors raised while reading or writing audio files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported audio file extension: {0}")]
    UnsupportedFormat(String),
}

// ---------------------------------------------------------------------------
// write_wav_file
// ---------------------------------------------------------------------------

/// Write `bytes` into `dir` as `<stem>.wav`, creating the directory as
/// needed and suffixing `-1`, `-2`, … when the name is taken.
///
/// Returns the path actually written.
pub fn write_wav_file(dir: &Path, stem: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;

    let mut path = dir.join(format!("{stem}.wav"));
    let mut counter = 1u32;
    while path.exists() {
        path = dir.join(format!("{stem}-{counter}.wav"));
        counter += 1;
    }

    fs::write(&path, bytes)?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// MIME mapping / loading
// ---------------------------------------------------------------------------

/// MIME type for an audio file, judged by extension (case-insensitive).
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "wav" => Some("audio/wav"),
        "mp3" => Some("audio/mpeg"),
        "ogg" => Some("audio/ogg"),
        "flac" => Some("audio/flac"),
        "m4a" => Some("audio/mp4"),
        "aac" => Some("audio/aac"),
        "webm" => Some("audio/webm"),
        _ => None,
    }
}

/// Read an audio file into an upload-ready [`AudioPayload`].
///
/// # Errors
///
/// [`ExportError::UnsupportedFormat`] when the extension maps to no known
/// audio MIME type, or [`ExportError::Io`] when the file cannot be read.
pub fn load_audio_file(path: &Path) -> Result<AudioPayload, ExportError> {
    let mime_type = mime_for_path(path)
        .ok_or_else(|| ExportError::UnsupportedFormat(path.display().to_string()))?;

    let bytes = fs::read(path)?;
    Ok(AudioPayload {
        bytes,
        mime_type: mime_type.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::wav;
    use tempfile::tempdir;

    #[test]
    fn written_file_has_wav_extension_and_bytes() {
        let dir = tempdir().expect("temp dir");
        let wav_bytes = wav::encode(&[0x01, 0x00], 24_000, 1, 16).unwrap();

        let path = write_wav_file(dir.path(), "speech", &wav_bytes).unwrap();

        assert_eq!(path.extension().unwrap(), "wav");
        let written = fs::read(&path).unwrap();
        assert_eq!(written, wav_bytes);
        assert_eq!(&written[0..4], b"RIFF");
    }

    #[test]
    fn collisions_get_numbered_suffixes() {
        let dir = tempdir().expect("temp dir");

        let first = write_wav_file(dir.path(), "speech", b"one").unwrap();
        let second = write_wav_file(dir.path(), "speech", b"two").unwrap();
        let third = write_wav_file(dir.path(), "speech", b"three").unwrap();

        assert_eq!(first.file_name().unwrap(), "speech.wav");
        assert_eq!(second.file_name().unwrap(), "speech-1.wav");
        assert_eq!(third.file_name().unwrap(), "speech-2.wav");
        assert_eq!(fs::read(&second).unwrap(), b"two");
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = tempdir().expect("temp dir");
        let nested = dir.path().join("a").join("b");

        let path = write_wav_file(&nested, "speech", b"x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn mime_mapping_is_case_insensitive() {
        assert_eq!(mime_for_path(Path::new("clip.wav")), Some("audio/wav"));
        assert_eq!(mime_for_path(Path::new("CLIP.WAV")), Some("audio/wav"));
        assert_eq!(mime_for_path(Path::new("a.mp3")), Some("audio/mpeg"));
        assert_eq!(mime_for_path(Path::new("a.webm")), Some("audio/webm"));
    }

    #[test]
    fn unknown_extensions_have_no_mime() {
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_for_path(Path::new("no_extension")), None);
    }

    #[test]
    fn load_reads_bytes_and_mime() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("clip.wav");
        fs::write(&path, b"RIFFdata").unwrap();

        let payload = load_audio_file(&path).unwrap();
        assert_eq!(payload.bytes, b"RIFFdata");
        assert_eq!(payload.mime_type, "audio/wav");
    }

    #[test]
    fn load_rejects_unsupported_extension() {
        let err = load_audio_file(Path::new("clip.txt")).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat(_)), "{err}");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempdir().expect("temp dir");
        let err = load_audio_file(&dir.path().join("absent.wav")).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)), "{err}");
    }
}
