// Purpose - external interfaces, format conversions

pub mod converter;
pub mod wire;

pub use converter::{fractional_note_to_freq, note_name, note_to_freq};
pub use wire::{InboundMessage, OutboundMessage};
