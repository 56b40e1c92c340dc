use rtrb::Producer;

use crate::{
    dsp::OscillatorKind,
    error::TransportError,
    io::{note_to_freq, InboundMessage, OutboundMessage},
    net::transport::Transport,
    synth::{ParticipantId, SynthMessage},
};

/// Turns note events into registry mutations for the audio thread, and
/// local input into wire messages for everyone else.
pub struct NetworkEventRouter<T: Transport> {
    synth: Producer<SynthMessage>,
    transport: T,
    local: ParticipantId,
}

impl<T: Transport> NetworkEventRouter<T> {
    pub fn new(synth: Producer<SynthMessage>, transport: T) -> Self {
        Self {
            synth,
            transport,
            local: ParticipantId::local(),
        }
    }

    /// Decode and apply one relayed message.
    ///
    /// Malformed or unknown messages are logged and dropped. The decoded
    /// message is handed back so the caller can reflect it on screen.
    pub fn handle_inbound(&mut self, text: &str) -> Option<InboundMessage> {
        if text.trim().is_empty() {
            return None;
        }

        let msg = match InboundMessage::parse(text) {
            Ok(msg) => msg,
            Err(err) => {
                tracing::warn!("dropping malformed message ({err}): {text}");
                return None;
            }
        };

        match &msg {
            InboundMessage::NoteOn { note, id } => self.note_on(id.clone(), *note),
            InboundMessage::NoteOff { id } => self.note_off(id.clone()),
            InboundMessage::SoundTypeChanged { sound_type, id } => {
                self.change_sound(id.clone(), *sound_type)
            }
            InboundMessage::ParticipantLeft { id } => {
                tracing::info!(participant = %id, "participant left");
                self.push(SynthMessage::Remove {
                    participant: id.clone(),
                });
            }
            InboundMessage::Unknown => {
                tracing::warn!("ignoring message of unknown type: {text}");
                return None;
            }
        }

        Some(msg)
    }

    /// Local key down: tell the others, then sound it here.
    pub fn local_note_on(&mut self, note: i32) -> Result<(), TransportError> {
        let sent = self.transport.send(&OutboundMessage::NoteOn { note });
        self.note_on(self.local.clone(), note);
        sent
    }

    /// Local key up.
    pub fn local_note_off(&mut self) -> Result<(), TransportError> {
        let sent = self.transport.send(&OutboundMessage::NoteOff);
        self.note_off(self.local.clone());
        sent
    }

    /// Local timbre selector changed.
    pub fn local_sound_changed(&mut self, kind: OscillatorKind) -> Result<(), TransportError> {
        let sent = self
            .transport
            .send(&OutboundMessage::SoundTypeChanged { sound_type: kind });
        self.change_sound(self.local.clone(), kind);
        sent
    }

    /// Silence every voice and close the connection.
    pub fn close(&mut self) {
        self.push(SynthMessage::AllNotesOff);
        self.transport.close();
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn local_id(&self) -> &ParticipantId {
        &self.local
    }

    fn note_on(&mut self, participant: ParticipantId, note: i32) {
        self.push(SynthMessage::NoteOn {
            participant,
            frequency: note_to_freq(note),
        });
    }

    fn note_off(&mut self, participant: ParticipantId) {
        self.push(SynthMessage::NoteOff { participant });
    }

    fn change_sound(&mut self, participant: ParticipantId, kind: OscillatorKind) {
        self.push(SynthMessage::ChangeOscillator { participant, kind });
    }

    fn push(&mut self, msg: SynthMessage) {
        // Never wait on the audio thread.
        if let Err(rtrb::PushError::Full(msg)) = self.synth.push(msg) {
            tracing::warn!(?msg, "control queue full, dropping");
        }
    }
}
