use anyhow::Result;
use serde::Deserialize;

use crate::live::{ConnectConfig, DEFAULT_VOICE};
use crate::session::SessionConfig;
use crate::video::VideoMode;

/// File-backed configuration, deserialized from `config/<name>.{toml,yaml,...}`.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub video: VideoConfig,
}

#[derive(Debug, Deserialize)]
pub struct EndpointConfig {
    pub model: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default)]
    pub system_instruction: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub send_sample_rate: u32,
    pub receive_sample_rate: u32,
    pub channels: u16,
    pub frame_samples: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoConfig {
    #[serde(default)]
    pub mode: VideoMode,
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            send_sample_rate: crate::audio::SEND_SAMPLE_RATE,
            receive_sample_rate: crate::audio::RECEIVE_SAMPLE_RATE,
            channels: crate::audio::CHANNELS,
            frame_samples: crate::audio::FRAME_SAMPLES,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Flatten the file layout into the session's runtime configuration.
    pub fn into_session_config(self) -> SessionConfig {
        let mut connect = ConnectConfig::new(&self.endpoint.system_instruction);
        connect.voice = self.endpoint.voice;

        SessionConfig {
            model: self.endpoint.model,
            connect,
            video_mode: self.video.mode,
            send_sample_rate: self.audio.send_sample_rate,
            receive_sample_rate: self.audio.receive_sample_rate,
            channels: self.audio.channels,
            frame_samples: self.audio.frame_samples,
            ..SessionConfig::default()
        }
    }
}
