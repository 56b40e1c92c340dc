use thiserror::Error;

/// Failures opening or running the audio output.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no default output device available")]
    NoOutputDevice,
    #[error("output device does not support {channels} channel(s) at {sample_rate} Hz")]
    UnsupportedConfig { channels: u16, sample_rate: u32 },
    #[error("failed to query output configurations")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),
    #[error("failed to build output stream")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start output stream")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Failures talking to the relay.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("not connected")]
    Closed,
    #[error("connection error")]
    Io(#[from] std::io::Error),
    #[error("failed to encode message")]
    Encode(#[from] serde_json::Error),
}

/// Rejected engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` must be greater than zero")]
    Zero { field: &'static str },
}
