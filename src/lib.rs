//! Shared networked keyboard.
//!
//! Every participant's key press is broadcast to all others, and each client
//! synthesizes and mixes the notes held by everyone, itself included.
//!
//! - [`dsp`]: the four stateless waveforms
//! - [`synth`]: per-participant generators and the registry that owns them
//! - [`engine`]: the mixing engine driven by the audio device
//! - [`net`]: routing note events to and from the relay
//! - [`io`]: pitch conversion and the JSON wire format

pub mod dsp;
pub mod engine;
pub mod error;
pub mod io;
pub mod net;
pub mod synth;

pub use engine::{EngineConfig, MixingEngine};
pub use error::{ConfigError, DeviceError, TransportError};
