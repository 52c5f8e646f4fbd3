//! `SpeechService` trait and the Gemini `generateContent` implementation.
//!
//! The remote service is a narrow external collaborator: audio bytes + MIME
//! type in → transcript text out; text + voice identifier in → base64 PCM
//! out.  Everything else (PCM decoding, WAV assembly, playback) happens
//! locally in [`crate::codec`].

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::codec;
use crate::config::ApiConfig;
use crate::remote::voices;

// ---------------------------------------------------------------------------
// RemoteError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the speech service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport or connection error, or a non-success status.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("speech service request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse speech service response: {0}")]
    Parse(String),

    /// The response carried no usable text or audio content.
    #[error("speech service returned an empty response")]
    EmptyResponse,

    /// No API key in config and none in the `GEMINI_API_KEY` environment.
    #[error("no API key configured (set api.api_key or GEMINI_API_KEY)")]
    MissingApiKey,

    /// The requested voice is not in the catalog.
    #[error("unknown voice \"{0}\"")]
    UnknownVoice(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout
        } else {
            RemoteError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// AudioPayload
// ---------------------------------------------------------------------------

/// One audio clip ready for upload: raw container bytes plus their MIME type.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

// ---------------------------------------------------------------------------
// SpeechService trait
// ---------------------------------------------------------------------------

/// Async trait for the remote transcription / speech-generation service.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn SpeechService>` between the pipeline and its callers.
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Transcribe one audio clip into text.
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, RemoteError>;

    /// Transcribe several clips into one continuous document, with a `---`
    /// separator between clips.
    async fn transcribe_combined(&self, clips: &[AudioPayload]) -> Result<String, RemoteError>;

    /// Synthesize `text` with the given voice.  Returns the service's
    /// base64-encoded raw PCM payload (24 kHz mono 16-bit by convention);
    /// decode it with [`crate::codec::base64::decode`].
    async fn generate_speech(&self, text: &str, voice_id: &str) -> Result<String, RemoteError>;
}

// ---------------------------------------------------------------------------
// Request / response shaping
// ---------------------------------------------------------------------------

const TRANSCRIBE_PROMPT: &str =
    "Transcribe this audio. If the audio is in another language, transcribe it \
     in the original language. Return only the transcript text.";

const COMBINED_PROMPT: &str =
    "You will receive several audio clips. Transcribe all of them into a single \
     continuous text document. Clearly mark where one clip ends and the next \
     begins using a '---' separator. Return only the transcript text.";

fn inline_audio_part(payload: &AudioPayload) -> Value {
    json!({
        "inlineData": {
            "mimeType": payload.mime_type,
            "data": codec::base64::encode(&payload.bytes),
        }
    })
}

fn transcription_request_body(clips: &[AudioPayload], prompt: &str) -> Value {
    let mut parts: Vec<Value> = clips.iter().map(inline_audio_part).collect();
    parts.push(json!({ "text": prompt }));
    json!({ "contents": [{ "parts": parts }] })
}

fn speech_request_body(text: &str, voice_id: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": text }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice_id }
                }
            }
        }
    })
}

/// Pull the transcript text out of a `generateContent` response.
fn extract_text(response: &Value) -> Result<String, RemoteError> {
    let text = response["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or(RemoteError::EmptyResponse)?
        .trim()
        .to_string();

    if text.is_empty() {
        return Err(RemoteError::EmptyResponse);
    }
    Ok(text)
}

/// Pull the base64 audio payload out of a `generateContent` response.
///
/// Scans all candidate parts: synthesis responses occasionally lead with a
/// text part before the inline audio.
fn extract_inline_audio(response: &Value) -> Result<String, RemoteError> {
    let parts = response["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or(RemoteError::EmptyResponse)?;

    parts
        .iter()
        .find_map(|part| part["inlineData"]["data"].as_str())
        .filter(|data| !data.is_empty())
        .map(str::to_string)
        .ok_or(RemoteError::EmptyResponse)
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Calls the Gemini `generateContent` REST endpoints.
///
/// All connection details (`base_url`, `api_key`, model names, timeout)
/// come exclusively from the [`ApiConfig`] passed to
/// [`GeminiClient::from_config`]; nothing is hardcoded.
pub struct GeminiClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl GeminiClient {
    /// Build a client from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is the
    /// last-resort fallback if the builder fails.
    pub fn from_config(config: &ApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    async fn generate_content(&self, model: &str, body: Value) -> Result<Value, RemoteError> {
        let key = self
            .config
            .resolved_api_key()
            .ok_or(RemoteError::MissingApiKey)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RemoteError::Request(format!(
                "HTTP {status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))
    }
}

#[async_trait]
impl SpeechService for GeminiClient {
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, RemoteError> {
        let clip = AudioPayload {
            bytes: audio.to_vec(),
            mime_type: mime_type.to_string(),
        };
        let body = transcription_request_body(std::slice::from_ref(&clip), TRANSCRIBE_PROMPT);

        let response = self.generate_content(&self.config.model, body).await?;
        extract_text(&response)
    }

    async fn transcribe_combined(&self, clips: &[AudioPayload]) -> Result<String, RemoteError> {
        match clips {
            [] => Err(RemoteError::EmptyResponse),
            [single] => self.transcribe(&single.bytes, &single.mime_type).await,
            many => {
                let body = transcription_request_body(many, COMBINED_PROMPT);
                let response = self.generate_content(&self.config.model, body).await?;
                extract_text(&response)
            }
        }
    }

    async fn generate_speech(&self, text: &str, voice_id: &str) -> Result<String, RemoteError> {
        // Validate locally before any network traffic
        let voice = voices::find(voice_id)
            .ok_or_else(|| RemoteError::UnknownVoice(voice_id.to_string()))?;

        let body = speech_request_body(text, voice.id);
        let response = self.generate_content(&self.config.tts_model, body).await?;
        extract_inline_audio(&response)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(bytes: &[u8], mime: &str) -> AudioPayload {
        AudioPayload {
            bytes: bytes.to_vec(),
            mime_type: mime.to_string(),
        }
    }

    // ---- Request bodies ----------------------------------------------------

    #[test]
    fn transcription_body_carries_audio_then_prompt() {
        let body = transcription_request_body(&[payload(b"hello", "audio/wav")], "prompt here");

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "audio/wav");
        assert_eq!(
            parts[0]["inlineData"]["data"].as_str().unwrap(),
            codec::base64::encode(b"hello")
        );
        assert_eq!(parts[1]["text"], "prompt here");
    }

    #[test]
    fn combined_body_has_one_part_per_clip() {
        let clips = [
            payload(b"a", "audio/wav"),
            payload(b"b", "audio/mpeg"),
            payload(b"c", "audio/ogg"),
        ];
        let body = transcription_request_body(&clips, COMBINED_PROMPT);

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 4); // 3 clips + prompt
        assert_eq!(parts[1]["inlineData"]["mimeType"], "audio/mpeg");
    }

    #[test]
    fn speech_body_requests_audio_with_the_voice() {
        let body = speech_request_body("say this", "Puck");

        assert_eq!(body["contents"][0]["parts"][0]["text"], "say this");
        assert_eq!(
            body["generationConfig"]["responseModalities"][0],
            "AUDIO"
        );
        assert_eq!(
            body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Puck"
        );
    }

    // ---- Response extraction -----------------------------------------------

    #[test]
    fn extract_text_reads_the_first_part() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "  a transcript  " }] } }]
        });
        assert_eq!(extract_text(&response).unwrap(), "a transcript");
    }

    #[test]
    fn extract_text_rejects_missing_and_blank() {
        assert!(matches!(
            extract_text(&json!({})),
            Err(RemoteError::EmptyResponse)
        ));

        let blank = json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        });
        assert!(matches!(
            extract_text(&blank),
            Err(RemoteError::EmptyResponse)
        ));
    }

    #[test]
    fn extract_audio_skips_leading_text_parts() {
        let response = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "here is your audio" },
                { "inlineData": { "mimeType": "audio/L16;rate=24000", "data": "AQACAA==" } }
            ] } }]
        });
        assert_eq!(extract_inline_audio(&response).unwrap(), "AQACAA==");
    }

    #[test]
    fn extract_audio_rejects_audioless_response() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "no audio" }] } }]
        });
        assert!(matches!(
            extract_inline_audio(&response),
            Err(RemoteError::EmptyResponse)
        ));
    }

    // ---- Client construction / local validation ----------------------------

    #[test]
    fn from_config_builds_without_panic() {
        let _client = GeminiClient::from_config(&ApiConfig::default());
    }

    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn SpeechService> = Box::new(GeminiClient::from_config(
            &ApiConfig::default(),
        ));
        drop(client);
    }

    #[tokio::test]
    async fn unknown_voice_fails_before_any_request() {
        let client = GeminiClient::from_config(&ApiConfig::default());
        let err = client.generate_speech("hi", "NotAVoice").await.unwrap_err();
        assert!(matches!(err, RemoteError::UnknownVoice(v) if v == "NotAVoice"));
    }

    #[tokio::test]
    async fn combined_with_no_clips_is_empty() {
        let client = GeminiClient::from_config(&ApiConfig::default());
        assert!(matches!(
            client.transcribe_combined(&[]).await,
            Err(RemoteError::EmptyResponse)
        ));
    }
}
