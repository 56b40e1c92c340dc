// Purpose: per-participant voices and the registry that owns them
// This layer sits above the raw waveforms and below the mixing engine

pub mod generator;
pub mod message;
pub mod registry;

pub use generator::{GeneratorState, NoteGenerator, VOICE_GAIN};
pub use message::{MessageReceiver, SynthMessage};
pub use registry::{GeneratorRegistry, ParticipantId};
