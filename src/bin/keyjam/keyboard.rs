//! Computer keyboard to note mapping
//!
//! The home row plays white keys, the row above plays black keys, laid out
//! like a piano starting at C4:
//!
//! ```text
//!   w e   t y u
//!  a s d f g h j k
//! ```

use crossterm::event::KeyCode;
use keyjam::dsp::OscillatorKind;

const NOTE_KEYS: [(char, i32); 13] = [
    ('a', 60),
    ('w', 61),
    ('s', 62),
    ('e', 63),
    ('d', 64),
    ('f', 65),
    ('t', 66),
    ('g', 67),
    ('y', 68),
    ('h', 69),
    ('u', 70),
    ('j', 71),
    ('k', 72),
];

/// What a key press means to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Note(i32),
    Release,
    Sound(OscillatorKind),
    Quit,
}

pub fn action_for(code: KeyCode) -> Option<KeyAction> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(KeyAction::Quit),
        KeyCode::Char(' ') => Some(KeyAction::Release),
        KeyCode::Char(c @ '1'..='4') => {
            let value = i64::from(c as u8 - b'1');
            Some(KeyAction::Sound(OscillatorKind::from_wire(value)))
        }
        KeyCode::Char(c) => note_for(c.to_ascii_lowercase()).map(KeyAction::Note),
        _ => None,
    }
}

fn note_for(c: char) -> Option<i32> {
    NOTE_KEYS.iter().find(|(k, _)| *k == c).map(|(_, n)| *n)
}

/// Key label for a note, for the on-screen keyboard.
pub fn key_for(note: i32) -> Option<char> {
    NOTE_KEYS.iter().find(|(_, n)| *n == note).map(|(k, _)| *k)
}
