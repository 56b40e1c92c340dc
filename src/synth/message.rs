use rtrb::Consumer;

use crate::{dsp::OscillatorKind, synth::registry::ParticipantId};

/// Registry mutation, handed from the control side to the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn {
        participant: ParticipantId,
        frequency: f64,
    },
    NoteOff {
        participant: ParticipantId,
    },
    ChangeOscillator {
        participant: ParticipantId,
        kind: OscillatorKind,
    },
    Remove {
        participant: ParticipantId,
    },
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}
