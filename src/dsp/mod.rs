//! Signal generation primitives.
//!
//! Everything here is allocation-free and stateless so it can run inside the
//! audio callback. Phase bookkeeping lives one level up, in
//! [`crate::synth::generator`].

/// The four participant timbres.
pub mod oscillator;

pub use oscillator::OscillatorKind;
