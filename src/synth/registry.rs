use std::{borrow::Borrow, collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{dsp::OscillatorKind, synth::generator::NoteGenerator};

/// Opaque participant identifier, as assigned by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Id this client uses for its own voice. Never sent on the wire.
    pub const LOCAL: &'static str = "self";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn local() -> Self {
        Self(Self::LOCAL.to_owned())
    }

    pub fn is_local(&self) -> bool {
        self.0 == Self::LOCAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ParticipantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every participant's generator, created on first mention.
///
/// Owned by exactly one [`crate::engine::MixingEngine`]; nothing else holds
/// a reference to a generator.
pub struct GeneratorRegistry {
    generators: HashMap<ParticipantId, NoteGenerator>,
    sample_rate: u32,
}

impl GeneratorRegistry {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_capacity(sample_rate, 0)
    }

    /// Reserve room for `capacity` participants so lazy creation does not
    /// grow the table from the render thread.
    pub fn with_capacity(sample_rate: u32, capacity: usize) -> Self {
        Self {
            generators: HashMap::with_capacity(capacity),
            sample_rate,
        }
    }

    /// The participant's generator, created idle with a sine if unseen.
    pub fn get_or_create(&mut self, participant: ParticipantId) -> &mut NoteGenerator {
        let sample_rate = self.sample_rate;
        self.generators.entry(participant).or_insert_with_key(|id| {
            tracing::debug!(participant = %id, "creating generator");
            NoteGenerator::new(OscillatorKind::Sine, sample_rate)
        })
    }

    pub fn get(&self, participant: &str) -> Option<&NoteGenerator> {
        self.generators.get(participant)
    }

    /// Forget a departed participant. Returns whether it was known.
    pub fn remove(&mut self, participant: &str) -> bool {
        self.generators.remove(participant).is_some()
    }

    /// Generators currently sounding, in no particular order.
    pub fn all_active(&mut self) -> impl Iterator<Item = &mut NoteGenerator> {
        self.generators.values_mut().filter(|g| g.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.generators.values().filter(|g| g.is_active()).count()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
