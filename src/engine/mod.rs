//! The mixing engine: owns every participant's generator and sums the
//! sounding ones once per audio period.
//!
//! Control events never touch the registry directly. They arrive as
//! [`SynthMessage`]s over a bounded SPSC ring and are applied at the start of
//! a render cycle, so a generator is never half-updated while it is summed.

pub mod device;

use std::time::Duration;

use rtrb::{Consumer, Producer, RingBuffer};
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    synth::{GeneratorRegistry, MessageReceiver, SynthMessage},
};

/// Fixed at construction; the device cannot renegotiate any of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_rate: u32,
    /// Frames per render cycle.
    pub buffer_len: usize,
    pub channels: u16,
    /// Participants to reserve generator slots for.
    pub max_participants: usize,
    /// Capacity of the control ring.
    pub message_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            buffer_len: 4096,
            channels: 1,
            max_participants: 16,
            message_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Wall-clock budget of one render cycle. Saturates for a zero rate.
    pub fn deadline(&self) -> Duration {
        Duration::try_from_secs_f64(self.buffer_len as f64 / self.sample_rate as f64)
            .unwrap_or(Duration::MAX)
    }

    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = |field| Err(ConfigError::Zero { field });
        if self.sample_rate == 0 {
            return zero("sample_rate");
        }
        if self.buffer_len == 0 {
            return zero("buffer_len");
        }
        if self.channels == 0 {
            return zero("channels");
        }
        if self.message_capacity == 0 {
            return zero("message_capacity");
        }
        Ok(())
    }
}

/// Producer/consumer pair sized for `config`.
pub fn control_channel(config: &EngineConfig) -> (Producer<SynthMessage>, Consumer<SynthMessage>) {
    RingBuffer::new(config.message_capacity)
}

pub struct MixingEngine {
    registry: GeneratorRegistry,
    rx: Consumer<SynthMessage>,
    buffer_len: usize,
    channels: usize,
    /// Mono mix of the current cycle.
    mix: Vec<f32>,
    /// One voice's output before it is summed.
    scratch: Vec<f32>,
}

impl MixingEngine {
    pub fn new(config: &EngineConfig, rx: Consumer<SynthMessage>) -> Self {
        let buffer_len = config.buffer_len.max(1);
        Self {
            registry: GeneratorRegistry::with_capacity(config.sample_rate, config.max_participants),
            rx,
            buffer_len,
            channels: usize::from(config.channels.max(1)),
            mix: vec![0.0; buffer_len],
            scratch: vec![0.0; buffer_len],
        }
    }

    /// Spread the mono mix over `channels` instead of the configured count,
    /// for devices that only offer a different layout.
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = usize::from(channels.max(1));
        self
    }

    /// Render exactly one `buffer_len` period of mono output.
    pub fn render_mono(&mut self) -> &[f32] {
        self.process_messages();
        self.mix_frames(self.buffer_len);
        &self.mix
    }

    /// Fill an interleaved `frames × channels` buffer. The mono mix is
    /// copied unchanged into every channel.
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.process_messages();

        let channels = self.channels;
        let total_frames = out.len() / channels;
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames = (total_frames - frames_written).min(self.buffer_len);
            self.mix_frames(frames);

            let out_off = frames_written * channels;
            let chunk = &mut out[out_off..out_off + frames * channels];
            for (frame, &s) in chunk.chunks_exact_mut(channels).zip(&self.mix[..frames]) {
                frame.fill(s);
            }

            frames_written += frames;
        }

        // Trailing partial frame, if the device handed us one.
        out[total_frames * channels..].fill(0.0);
    }

    fn mix_frames(&mut self, frames: usize) {
        let mix = &mut self.mix[..frames];
        mix.fill(0.0);

        for generator in self.registry.all_active() {
            let voice = &mut self.scratch[..frames];
            generator.next_buffer(voice);
            for (o, v) in mix.iter_mut().zip(voice.iter()) {
                *o += v;
            }
        }
    }

    fn process_messages(&mut self) {
        while let Some(msg) = MessageReceiver::pop(&mut self.rx) {
            match msg {
                SynthMessage::NoteOn {
                    participant,
                    frequency,
                } => self.registry.get_or_create(participant).activate(frequency),
                SynthMessage::NoteOff { participant } => {
                    self.registry.get_or_create(participant).deactivate()
                }
                SynthMessage::ChangeOscillator { participant, kind } => {
                    self.registry.get_or_create(participant).change_oscillator(kind)
                }
                SynthMessage::Remove { participant } => {
                    self.registry.remove(participant.as_str());
                }
                SynthMessage::AllNotesOff => {
                    for generator in self.registry.all_active() {
                        generator.deactivate();
                    }
                }
            }
        }
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}
