use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/*
Waveforms
=========

Each participant picks one of four timbres. An oscillator here is a pure
function of phase: the caller owns the phase accumulator and asks for one
sample at a time, so switching timbre mid-note never glitches the pitch.

  Sine      sin(phase)                           [-1, 1]
  Saw       (phase mod 2π) / 2π * 2 - 1          [-1, 1)   linear ramp
  Square    sin(phase) > 0 ? 0.8 : -0.8          {-0.8, 0.8}
  Triangle  asin(sin(phase)) / (π/2)             [-1, 1]

The square wave is deliberately attenuated to 0.8. It carries the most
energy of the four and would otherwise dominate (and clip) a shared mix.
Keep the constant as-is: peers expect the same loudness on every client.

Wire values: 0 = Sine, 1 = Saw, 2 = Square, 3 = Triangle. Anything else
resolves to Sine, including strings, null and fractional numbers.
*/

/// Fixed amplitude of the square wave.
pub const SQUARE_LEVEL: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "i64")]
pub enum OscillatorKind {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
}

impl OscillatorKind {
    pub const ALL: [OscillatorKind; 4] = [
        OscillatorKind::Sine,
        OscillatorKind::Saw,
        OscillatorKind::Square,
        OscillatorKind::Triangle,
    ];

    /// Resolve a wire value. Unknown values fall back to `Sine`.
    pub fn from_wire(value: i64) -> Self {
        match value {
            0 => OscillatorKind::Sine,
            1 => OscillatorKind::Saw,
            2 => OscillatorKind::Square,
            3 => OscillatorKind::Triangle,
            _ => OscillatorKind::Sine,
        }
    }

    pub fn wire_value(self) -> i64 {
        match self {
            OscillatorKind::Sine => 0,
            OscillatorKind::Saw => 1,
            OscillatorKind::Square => 2,
            OscillatorKind::Triangle => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OscillatorKind::Sine => "sine",
            OscillatorKind::Saw => "saw",
            OscillatorKind::Square => "square",
            OscillatorKind::Triangle => "triangle",
        }
    }

    /// One sample at `phase` (radians, any magnitude).
    #[inline]
    pub fn sample(self, phase: f64) -> f64 {
        match self {
            OscillatorKind::Sine => phase.sin(),
            OscillatorKind::Saw => phase.rem_euclid(TAU) / TAU * 2.0 - 1.0,
            OscillatorKind::Square => {
                if phase.sin() > 0.0 {
                    SQUARE_LEVEL
                } else {
                    -SQUARE_LEVEL
                }
            }
            OscillatorKind::Triangle => phase.sin().asin() / FRAC_PI_2,
        }
    }
}

impl From<i64> for OscillatorKind {
    fn from(value: i64) -> Self {
        Self::from_wire(value)
    }
}

impl<'de> Deserialize<'de> for OscillatorKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let wire = match value.as_i64() {
            Some(n) => Some(n),
            None => value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= 3.0)
                .map(|f| f as i64),
        };
        Ok(wire.map_or(OscillatorKind::Sine, Self::from_wire))
    }
}

impl From<OscillatorKind> for i64 {
    fn from(kind: OscillatorKind) -> Self {
        kind.wire_value()
    }
}
