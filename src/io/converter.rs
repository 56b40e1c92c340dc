/// Reference pitch: note 69 (A4) sounds at 440 Hz.
pub const A4_NOTE: i32 = 69;
pub const A4_FREQUENCY: f64 = 440.0;

/// Semitone note number to frequency in Hz.
///
/// Total over every integer: negative or very high notes produce very low or
/// very high frequencies rather than errors.
#[inline]
pub fn note_to_freq(note: i32) -> f64 {
    fractional_note_to_freq(note as f64)
}

/// Same mapping for detuned / fractional note numbers.
#[inline]
pub fn fractional_note_to_freq(note: f64) -> f64 {
    A4_FREQUENCY * 2.0_f64.powf((note - A4_NOTE as f64) / 12.0)
}

/// Display names for the playable range of the shared keyboard, C4 through C5.
pub const KEYBOARD_NOTES: [(i32, &str); 13] = [
    (60, "C4"),
    (61, "Cs4"),
    (62, "D4"),
    (63, "Ds4"),
    (64, "E4"),
    (65, "F4"),
    (66, "Fs4"),
    (67, "G4"),
    (68, "Gs4"),
    (69, "A4"),
    (70, "As4"),
    (71, "B4"),
    (72, "C5"),
];

/// Name of a note on the shared keyboard, if it has one.
pub fn note_name(note: i32) -> Option<&'static str> {
    KEYBOARD_NOTES
        .iter()
        .find(|(n, _)| *n == note)
        .map(|(_, name)| *name)
}
