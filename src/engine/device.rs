//! Audio output via cpal.
//!
//! The stream callback owns the [`MixingEngine`] outright; everything else
//! talks to it through the control ring.

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, SampleFormat, SampleRate, Stream, StreamConfig, SupportedBufferSize,
    SupportedStreamConfigRange,
};

use crate::{
    engine::{EngineConfig, MixingEngine},
    error::DeviceError,
};

/// A running output stream, or the record that none could be opened.
pub struct AudioDevice {
    stream: Option<Stream>,
}

impl AudioDevice {
    /// Open the default output device and start rendering `engine` into it.
    ///
    /// The engine always mixes mono. If the device cannot take
    /// `config.channels`, the mix is copied across whatever channel count
    /// the device prefers.
    pub fn open(config: &EngineConfig, engine: MixingEngine) -> Result<Self, DeviceError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DeviceError::NoOutputDevice)?;

        let stream_config = stream_config_for(&device, config)?;
        if stream_config.channels != config.channels {
            tracing::warn!(
                requested = config.channels,
                using = stream_config.channels,
                "output device does not offer the requested channel count"
            );
        }
        tracing::info!(
            sample_rate = config.sample_rate,
            channels = stream_config.channels,
            buffer = ?stream_config.buffer_size,
            "opening audio output"
        );

        let mut engine = engine.with_channels(stream_config.channels);

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _| engine.render_block(data),
            |err| tracing::error!("audio stream error: {err}"),
            None,
        )?;
        stream.play()?;

        Ok(Self {
            stream: Some(stream),
        })
    }

    /// Like [`AudioDevice::open`], but failure leaves an unavailable device
    /// instead of an error. Check [`AudioDevice::is_available`].
    pub fn start(config: &EngineConfig, engine: MixingEngine) -> Self {
        match Self::open(config, engine) {
            Ok(device) => device,
            Err(err) => {
                tracing::error!("audio output unavailable: {err}");
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self { stream: None }
    }

    pub fn is_available(&self) -> bool {
        self.stream.is_some()
    }

    /// Stop output and release the device.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::info!("audio output closed");
        }
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.close();
    }
}

fn stream_config_for(
    device: &cpal::Device,
    config: &EngineConfig,
) -> Result<StreamConfig, DeviceError> {
    let ranges: Vec<_> = device.supported_output_configs()?.collect();
    let default_channels = match device.default_output_config() {
        Ok(default) => Some(default.channels()),
        Err(err) => {
            tracing::debug!("no default output config: {err}");
            None
        }
    };
    choose_stream_config(&ranges, default_channels, config)
}

/// Pick an f32 output layout at `config.sample_rate`.
///
/// Preference: the requested channel count, then the device's default
/// channel count, then any channel count the device lists.
fn choose_stream_config(
    ranges: &[SupportedStreamConfigRange],
    default_channels: Option<u16>,
    config: &EngineConfig,
) -> Result<StreamConfig, DeviceError> {
    let sample_rate = SampleRate(config.sample_rate);
    let usable = |range: &&SupportedStreamConfigRange| {
        range.sample_format() == SampleFormat::F32
            && range.channels() > 0
            && range.min_sample_rate() <= sample_rate
            && sample_rate <= range.max_sample_rate()
    };
    let with_channels =
        |channels: u16| ranges.iter().filter(usable).find(|r| r.channels() == channels);

    let range = with_channels(config.channels)
        .or_else(|| default_channels.and_then(with_channels))
        .or_else(|| ranges.iter().find(usable))
        .ok_or(DeviceError::UnsupportedConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
        })?;

    let wanted = config.buffer_len as u32;
    let buffer_size = match range.buffer_size() {
        SupportedBufferSize::Range { min, max } if (*min..=*max).contains(&wanted) => {
            BufferSize::Fixed(wanted)
        }
        // Engine renders in buffer_len chunks whatever the device picks.
        _ => BufferSize::Default,
    };

    Ok(StreamConfig {
        channels: range.channels(),
        sample_rate,
        buffer_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(channels: u16, format: SampleFormat) -> SupportedStreamConfigRange {
        SupportedStreamConfigRange::new(
            channels,
            SampleRate(8_000),
            SampleRate(192_000),
            SupportedBufferSize::Range { min: 64, max: 8192 },
            format,
        )
    }

    #[test]
    fn prefers_requested_channels() {
        let ranges = [range(2, SampleFormat::F32), range(1, SampleFormat::F32)];
        let chosen = choose_stream_config(&ranges, Some(2), &EngineConfig::default()).unwrap();
        assert_eq!(chosen.channels, 1);
        assert_eq!(chosen.sample_rate, SampleRate(44_100));
        assert_eq!(chosen.buffer_size, BufferSize::Fixed(4096));
    }

    #[test]
    fn stereo_only_device_falls_back() {
        let ranges = [range(2, SampleFormat::F32)];
        let chosen = choose_stream_config(&ranges, Some(2), &EngineConfig::default()).unwrap();
        assert_eq!(chosen.channels, 2);

        // No default reported: any usable layout will do.
        let ranges = [range(6, SampleFormat::I16), range(8, SampleFormat::F32)];
        let chosen = choose_stream_config(&ranges, None, &EngineConfig::default()).unwrap();
        assert_eq!(chosen.channels, 8);
    }

    #[test]
    fn default_channels_beat_arbitrary_ones() {
        let ranges = [range(8, SampleFormat::F32), range(2, SampleFormat::F32)];
        let chosen = choose_stream_config(&ranges, Some(2), &EngineConfig::default()).unwrap();
        assert_eq!(chosen.channels, 2);
    }

    #[test]
    fn nothing_usable_is_an_error() {
        let ranges = [range(2, SampleFormat::I16)];
        let err = choose_stream_config(&ranges, Some(2), &EngineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::UnsupportedConfig {
                channels: 1,
                sample_rate: 44_100
            }
        ));
    }

    #[test]
    fn unavailable_device_reports_itself() {
        let mut device = AudioDevice::unavailable();
        assert!(!device.is_available());
        device.close();
        assert!(!device.is_available());
    }
}
