//! JSON messages exchanged with the relay.
//!
//! Clients send events without an id; the relay knows who sent them and
//! stamps `"id"` on before fanning the event out, so every inbound message
//! names its sender.
//!
//! ```text
//! out  {"type":"noteOn","note":69}
//! in   {"type":"noteOn","note":69,"id":"p3"}
//! out  {"type":"noteOff"}
//! in   {"type":"noteOff","id":"p3"}
//! out  {"type":"soundTypeChanged","soundType":2}
//! in   {"type":"soundTypeChanged","soundType":2,"id":"p3"}
//! in   {"type":"participantLeft","id":"p3"}
//! ```

use serde::{de::Error as _, Deserialize, Serialize};
use serde_json::Value;

use crate::{dsp::OscillatorKind, synth::ParticipantId};

/// Event produced by this client. The sender is implicit in the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    NoteOn {
        note: i32,
    },
    NoteOff,
    SoundTypeChanged {
        #[serde(rename = "soundType")]
        sound_type: OscillatorKind,
    },
}

impl OutboundMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Event relayed from another participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    NoteOn {
        note: i32,
        id: ParticipantId,
    },
    NoteOff {
        id: ParticipantId,
    },
    SoundTypeChanged {
        #[serde(rename = "soundType", default)]
        sound_type: OscillatorKind,
        id: ParticipantId,
    },
    /// Sent by the relay when a connection closes.
    ParticipantLeft {
        id: ParticipantId,
    },
    /// Any `type` this client does not understand.
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn sender(&self) -> Option<&ParticipantId> {
        match self {
            InboundMessage::NoteOn { id, .. }
            | InboundMessage::NoteOff { id }
            | InboundMessage::SoundTypeChanged { id, .. }
            | InboundMessage::ParticipantLeft { id } => Some(id),
            InboundMessage::Unknown => None,
        }
    }
}

/// Attach the sender's id to a raw client event, overwriting any id the
/// client tried to claim. Fields the relay does not know are kept.
pub fn stamp_sender(raw: &str, id: &ParticipantId) -> serde_json::Result<String> {
    let mut value: Value = serde_json::from_str(raw)?;
    let Some(object) = value.as_object_mut() else {
        return Err(serde_json::Error::custom("event is not a JSON object"));
    };
    object.insert("id".to_owned(), Value::String(id.as_str().to_owned()));
    serde_json::to_string(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_shapes_match_the_protocol() {
        let on = OutboundMessage::NoteOn { note: 64 }.to_json().unwrap();
        assert_eq!(on, r#"{"type":"noteOn","note":64}"#);

        let off = OutboundMessage::NoteOff.to_json().unwrap();
        assert_eq!(off, r#"{"type":"noteOff"}"#);

        let change = OutboundMessage::SoundTypeChanged {
            sound_type: OscillatorKind::Triangle,
        }
        .to_json()
        .unwrap();
        assert_eq!(change, r#"{"type":"soundTypeChanged","soundType":3}"#);
    }

    #[test]
    fn parses_relayed_events() {
        let msg = InboundMessage::parse(r#"{"type":"noteOn","note":69,"id":"A"}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::NoteOn {
                note: 69,
                id: "A".into()
            }
        );

        // Older clients send a null note with noteOff.
        let msg = InboundMessage::parse(r#"{"type":"noteOff","note":null,"id":"B"}"#).unwrap();
        assert_eq!(msg, InboundMessage::NoteOff { id: "B".into() });

        let msg =
            InboundMessage::parse(r#"{"type":"soundTypeChanged","soundType":9,"id":"C"}"#)
                .unwrap();
        assert_eq!(
            msg,
            InboundMessage::SoundTypeChanged {
                sound_type: OscillatorKind::Sine,
                id: "C".into()
            }
        );
    }

    #[test]
    fn unreadable_sound_type_becomes_sine() {
        for raw in [
            r#"{"type":"soundTypeChanged","soundType":"saw","id":"A"}"#,
            r#"{"type":"soundTypeChanged","soundType":null,"id":"A"}"#,
            r#"{"type":"soundTypeChanged","soundType":1.5,"id":"A"}"#,
            r#"{"type":"soundTypeChanged","id":"A"}"#,
        ] {
            let msg = InboundMessage::parse(raw).unwrap();
            assert_eq!(
                msg,
                InboundMessage::SoundTypeChanged {
                    sound_type: OscillatorKind::Sine,
                    id: "A".into()
                },
                "{raw}"
            );
        }
    }

    #[test]
    fn unknown_type_is_not_an_error() {
        let msg = InboundMessage::parse(r#"{"type":"chat","text":"hi","id":"A"}"#).unwrap();
        assert_eq!(msg, InboundMessage::Unknown);
        assert_eq!(msg.sender(), None);
    }

    #[test]
    fn malformed_events_are_errors() {
        assert!(InboundMessage::parse("not json").is_err());
        assert!(InboundMessage::parse(r#"{"type":"noteOn","id":"A"}"#).is_err());
        assert!(InboundMessage::parse(r#"{"note":60}"#).is_err());
    }

    #[test]
    fn stamping_overrides_claimed_id() {
        let stamped = stamp_sender(r#"{"type":"noteOn","note":60,"id":"liar"}"#, &"p1".into())
            .unwrap();
        let msg = InboundMessage::parse(&stamped).unwrap();
        assert_eq!(
            msg,
            InboundMessage::NoteOn {
                note: 60,
                id: "p1".into()
            }
        );
        assert!(stamp_sender("[1,2]", &"p1".into()).is_err());
    }
}
