use std::f64::consts::TAU;

use crate::dsp::OscillatorKind;

/// Per-voice attenuation, leaves headroom for several participants to sum.
pub const VOICE_GAIN: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Idle,   // Silent, excluded from the mix
    Active, // Producing its oscillator at `frequency`
}

/// One participant's voice: an oscillator, its phase, and whether it sounds.
///
/// A participant holds at most one note, so a second `activate` while active
/// just moves the pitch (the phase carries on and the note glides rather
/// than restarting).
#[derive(Debug, Clone)]
pub struct NoteGenerator {
    kind: OscillatorKind,
    sample_rate: f64,
    /// Kept in `[0, 2π)`; every waveform is 2π-periodic.
    phase: f64,
    phase_increment: f64,
    frequency: f64,
    state: GeneratorState,
}

impl NoteGenerator {
    pub fn new(kind: OscillatorKind, sample_rate: u32) -> Self {
        Self {
            kind,
            sample_rate: sample_rate as f64,
            phase: 0.0,
            phase_increment: 0.0,
            frequency: 0.0,
            state: GeneratorState::Idle,
        }
    }

    /// Start sounding at `frequency`, clamped to `[0, nyquist]` (NaN counts
    /// as 0). The phase stays finite for any input.
    pub fn activate(&mut self, frequency: f64) {
        let nyquist = self.sample_rate / 2.0;
        self.frequency = if frequency.is_nan() {
            0.0
        } else {
            frequency.clamp(0.0, nyquist)
        };
        let increment = TAU * self.frequency / self.sample_rate;
        self.phase_increment = if increment.is_finite() { increment } else { 0.0 };
        self.state = GeneratorState::Active;
    }

    /// Back to Idle. Phase is reset so the next note starts at zero.
    pub fn deactivate(&mut self) {
        self.frequency = 0.0;
        self.phase_increment = 0.0;
        self.phase = 0.0;
        self.state = GeneratorState::Idle;
    }

    /// Swap the timbre. Phase and state are untouched.
    pub fn change_oscillator(&mut self, kind: OscillatorKind) {
        self.kind = kind;
    }

    /// Fill `out` with the next `out.len()` samples and advance the phase.
    ///
    /// Only meaningful while active; the registry never hands out idle
    /// generators for rendering.
    pub fn next_buffer(&mut self, out: &mut [f32]) {
        debug_assert!(self.is_active(), "rendering an idle generator");

        for sample in out.iter_mut() {
            *sample = (self.kind.sample(self.phase) * VOICE_GAIN) as f32;
            self.phase += self.phase_increment;
            if self.phase >= TAU || self.phase.is_nan() {
                self.phase = self.phase.rem_euclid(TAU);
                if !self.phase.is_finite() {
                    self.phase = 0.0;
                }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == GeneratorState::Active
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn oscillator(&self) -> OscillatorKind {
        self.kind
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn phase_increment(&self) -> f64 {
        self.phase_increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::converter::note_to_freq;

    const SAMPLE_RATE: u32 = 44_100;

    #[test]
    fn starts_idle() {
        let generator = NoteGenerator::new(OscillatorKind::Sine, SAMPLE_RATE);
        assert_eq!(generator.state(), GeneratorState::Idle);
        assert_eq!(generator.phase(), 0.0);
        assert_eq!(generator.frequency(), 0.0);
    }

    #[test]
    fn activate_then_deactivate() {
        let mut generator = NoteGenerator::new(OscillatorKind::Saw, SAMPLE_RATE);
        generator.activate(440.0);
        assert!(generator.is_active());
        assert!((generator.phase_increment() - TAU * 440.0 / 44_100.0).abs() < 1e-15);

        let mut buffer = [0.0f32; 64];
        generator.next_buffer(&mut buffer);
        assert!(generator.phase() > 0.0);

        generator.deactivate();
        assert!(!generator.is_active());
        assert_eq!(generator.phase(), 0.0);
        assert_eq!(generator.frequency(), 0.0);
        assert_eq!(generator.phase_increment(), 0.0);
    }

    #[test]
    fn deactivate_when_idle_changes_nothing() {
        let mut generator = NoteGenerator::new(OscillatorKind::Triangle, SAMPLE_RATE);
        generator.deactivate();
        generator.deactivate();
        assert_eq!(generator.state(), GeneratorState::Idle);
        assert_eq!(generator.phase(), 0.0);
        assert_eq!(generator.oscillator(), OscillatorKind::Triangle);
    }

    #[test]
    fn sine_voice_matches_reference_tone() {
        let mut generator = NoteGenerator::new(OscillatorKind::Sine, SAMPLE_RATE);
        generator.activate(note_to_freq(69));

        let mut buffer = vec![0.0f32; 512];
        generator.next_buffer(&mut buffer);

        for (n, &actual) in buffer.iter().enumerate() {
            let expected = 0.25 * (TAU * 440.0 * n as f64 / 44_100.0).sin();
            assert!(
                (actual as f64 - expected).abs() < 1e-6,
                "sample {n}: expected {expected}, got {actual}"
            );
        }
    }

    #[test]
    fn phase_continues_across_buffers() {
        let mut split = NoteGenerator::new(OscillatorKind::Sine, SAMPLE_RATE);
        let mut whole = NoteGenerator::new(OscillatorKind::Sine, SAMPLE_RATE);
        split.activate(523.25);
        whole.activate(523.25);

        let mut a = vec![0.0f32; 100];
        let mut b = vec![0.0f32; 156];
        split.next_buffer(&mut a);
        split.next_buffer(&mut b);

        let mut full = vec![0.0f32; 256];
        whole.next_buffer(&mut full);

        a.extend_from_slice(&b);
        for (x, y) in a.iter().zip(&full) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn phase_stays_bounded() {
        let mut generator = NoteGenerator::new(OscillatorKind::Sine, SAMPLE_RATE);
        generator.activate(19_000.0);
        let mut buffer = vec![0.0f32; 4096];
        for _ in 0..50 {
            generator.next_buffer(&mut buffer);
            assert!((0.0..TAU).contains(&generator.phase()));
        }
    }

    #[test]
    fn retrigger_keeps_phase() {
        let mut generator = NoteGenerator::new(OscillatorKind::Sine, SAMPLE_RATE);
        generator.activate(440.0);
        let mut buffer = [0.0f32; 33];
        generator.next_buffer(&mut buffer);
        let phase = generator.phase();

        generator.activate(880.0);
        assert_eq!(generator.phase(), phase);
        assert_eq!(generator.frequency(), 880.0);
    }

    #[test]
    fn square_voice_is_two_level() {
        let mut generator = NoteGenerator::new(OscillatorKind::Square, SAMPLE_RATE);
        generator.activate(440.0);
        let mut buffer = vec![0.0f32; 1024];
        generator.next_buffer(&mut buffer);
        assert!(buffer.iter().all(|s| *s == 0.2 || *s == -0.2));
        assert!(buffer.iter().any(|s| *s > 0.0));
        assert!(buffer.iter().any(|s| *s < 0.0));
    }

    #[test]
    fn out_of_range_frequencies_stay_finite() {
        for frequency in [note_to_freq(20_000), f64::INFINITY, f64::NAN, -5.0] {
            let mut generator = NoteGenerator::new(OscillatorKind::Sine, SAMPLE_RATE);
            generator.activate(frequency);
            assert!(generator.is_active());
            assert!(generator.frequency() <= 22_050.0 && generator.frequency() >= 0.0);

            let mut buffer = vec![0.0f32; 256];
            generator.next_buffer(&mut buffer);
            assert!(buffer.iter().all(|s| s.is_finite()), "{frequency} Hz");
            assert!((0.0..TAU).contains(&generator.phase()));
        }
    }

    #[test]
    fn zero_sample_rate_does_not_poison_phase() {
        let mut generator = NoteGenerator::new(OscillatorKind::Saw, 0);
        generator.activate(440.0);
        assert_eq!(generator.phase_increment(), 0.0);
        let mut buffer = [0.0f32; 8];
        generator.next_buffer(&mut buffer);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn changing_oscillator_keeps_phase_and_state() {
        let mut generator = NoteGenerator::new(OscillatorKind::Sine, SAMPLE_RATE);
        generator.activate(330.0);
        let mut buffer = [0.0f32; 10];
        generator.next_buffer(&mut buffer);
        let phase = generator.phase();

        generator.change_oscillator(OscillatorKind::Saw);
        assert_eq!(generator.oscillator(), OscillatorKind::Saw);
        assert_eq!(generator.phase(), phase);
        assert!(generator.is_active());
    }
}
