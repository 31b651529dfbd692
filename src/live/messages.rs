use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// MIME type attached to outbound PCM audio chunks.
pub const AUDIO_MIME_TYPE: &str = "audio/pcm";

/// MIME type attached to outbound encoded video frames.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Prebuilt voice used when the caller does not pick one.
pub const DEFAULT_VOICE: &str = "Zephyr";

const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant.";

/// One outbound unit of media, produced by a capture source and consumed by
/// the transmitter. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaChunk {
    /// Raw PCM audio (i16 little-endian, serialized as base64).
    Audio {
        #[serde(with = "pcm_base64")]
        data: Vec<u8>,
    },
    /// A base64-encoded, already-compressed video frame.
    Image { mime_type: String, data: String },
}

impl MediaChunk {
    pub fn audio(data: Vec<u8>) -> Self {
        Self::Audio { data }
    }

    /// Wrap an already-encoded JPEG as a base64 image chunk.
    pub fn jpeg(base64_data: String) -> Self {
        Self::Image {
            mime_type: IMAGE_MIME_TYPE.to_string(),
            data: base64_data,
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            Self::Audio { .. } => AUDIO_MIME_TYPE,
            Self::Image { mime_type, .. } => mime_type,
        }
    }

    pub fn payload_len(&self) -> usize {
        match self {
            Self::Audio { data } => data.len(),
            Self::Image { data, .. } => data.len(),
        }
    }
}

mod pcm_base64 {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

/// One unit of the remote endpoint's response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Raw PCM audio to be played back, in order.
    Audio(Vec<u8>),
    /// Incremental text fragment, display only.
    Text(String),
    /// The current turn is finished; the next one follows on the same stream.
    TurnComplete,
}

/// Incremental text fragment surfaced by the receiver for display.
///
/// Text deltas are fire-and-forget: no loop buffers them or waits on their
/// consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDelta {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl TextDelta {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Requested modality of the endpoint's responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseModality {
    Audio,
}

/// Resolution hint for media the endpoint receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaResolution {
    Low,
    Medium,
    High,
}

/// Connection parameters handed to [`LiveClient::connect`](super::LiveClient::connect).
///
/// Constructed once before the session runs and treated as immutable input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectConfig {
    pub response_modality: ResponseModality,

    /// Prebuilt voice the endpoint speaks with.
    pub voice: String,

    pub system_instruction: String,

    pub media_resolution: MediaResolution,

    /// Token count at which the endpoint starts compressing its context window.
    pub compression_trigger_tokens: u32,

    /// Sliding-window size the context is compressed down to.
    pub compression_target_tokens: u32,
}

impl ConnectConfig {
    /// Build a config around a system instruction, falling back to a generic
    /// one when the caller provides none.
    pub fn new(system_instruction: &str) -> Self {
        let system_instruction = if system_instruction.trim().is_empty() {
            warn!("no system instruction provided, using a generic default");
            DEFAULT_SYSTEM_INSTRUCTION.to_string()
        } else {
            system_instruction.to_string()
        };

        Self {
            response_modality: ResponseModality::Audio,
            voice: DEFAULT_VOICE.to_string(),
            system_instruction,
            media_resolution: MediaResolution::Medium,
            compression_trigger_tokens: 25_600,
            compression_target_tokens: 12_800,
        }
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_INSTRUCTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    #[test]
    fn audio_chunk_serializes_pcm_as_base64() {
        let chunk = MediaChunk::audio(vec![0x01, 0x02, 0xFF]);
        let json = serde_json::to_value(&chunk).unwrap();

        assert_eq!(json["kind"], "audio");
        let encoded = json["data"].as_str().unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        assert_eq!(decoded, vec![0x01, 0x02, 0xFF]);

        let back: MediaChunk = serde_json::from_value(json).unwrap();
        assert_eq!(back, chunk);
    }

    #[test]
    fn image_chunk_carries_mime_type() {
        let chunk = MediaChunk::jpeg("aGVsbG8=".to_string());
        assert_eq!(chunk.mime_type(), IMAGE_MIME_TYPE);
        assert_eq!(chunk.payload_len(), 8);
    }

    #[test]
    fn connect_config_defaults_match_endpoint_expectations() {
        let config = ConnectConfig::default();

        assert_eq!(config.response_modality, ResponseModality::Audio);
        assert_eq!(config.voice, "Zephyr");
        assert_eq!(config.media_resolution, MediaResolution::Medium);
        assert_eq!(config.compression_trigger_tokens, 25_600);
        assert_eq!(config.compression_target_tokens, 12_800);
    }

    #[test]
    fn empty_system_instruction_gets_a_generic_default() {
        let config = ConnectConfig::new("   ");
        assert!(!config.system_instruction.trim().is_empty());

        let config = ConnectConfig::new("Answer in haiku.");
        assert_eq!(config.system_instruction, "Answer in haiku.");
    }
}
