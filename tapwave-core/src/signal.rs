/*
    Copyright (C) 2020-2024  Rafal Michalski

    This file is part of TAPWAVE, a Rust library for converting tape signals.

    For the full copyright notice, see the lib.rs file.
*/
//! Signal edge, polarity and waveform selectors.
use core::ops::Not;

#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

/// The polarity of a semiwave.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    Positive,
    Negative,
}

/// Determines which signal edges delimit pulses.
///
/// With [EdgeMode::Rising] or [EdgeMode::Falling] a pulse is a full signal cycle
/// measured between two edges of the same direction. With [EdgeMode::Both] every
/// edge ends a pulse so each pulse is a single semiwave, the first of which has
/// the given polarity.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeMode {
    Rising,
    Falling,
    Both(Polarity),
}

/// The shape of synthesized semiwaves.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Waveform {
    Square,
    Triangle,
    Sine,
}

impl Default for Polarity {
    fn default() -> Self {
        Polarity::Positive
    }
}

impl Not for Polarity {
    type Output = Polarity;
    #[inline]
    fn not(self) -> Self::Output {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

impl Polarity {
    #[inline]
    pub fn is_positive(self) -> bool {
        self == Polarity::Positive
    }
    /// Returns `amplitude` with the sign of this polarity applied.
    #[inline]
    pub fn apply(self, amplitude: i32) -> i32 {
        match self {
            Polarity::Positive => amplitude,
            Polarity::Negative => -amplitude,
        }
    }
}

impl Default for EdgeMode {
    fn default() -> Self {
        EdgeMode::Rising
    }
}

impl EdgeMode {
    /// Creates an edge mode from the `inverted` and `semiwaves` flags of a tape archive.
    ///
    /// With `semiwaves` set, `inverted` selects a negative first semiwave.
    pub fn from_flags(inverted: bool, semiwaves: bool) -> Self {
        match (semiwaves, inverted) {
            (true, false) => EdgeMode::Both(Polarity::Positive),
            (true, true)  => EdgeMode::Both(Polarity::Negative),
            (false, false) => EdgeMode::Rising,
            (false, true)  => EdgeMode::Falling,
        }
    }
    /// Returns `true` if an edge in the given direction ends a pulse.
    #[inline]
    pub fn triggers_on(self, rising: bool) -> bool {
        match self {
            EdgeMode::Rising => rising,
            EdgeMode::Falling => !rising,
            EdgeMode::Both(..) => true,
        }
    }
    /// Returns `true` if each pulse is a single semiwave.
    #[inline]
    pub fn is_semiwave(self) -> bool {
        matches!(self, EdgeMode::Both(..))
    }
    /// Returns the polarity of the first synthesized semiwave.
    pub fn initial_polarity(self) -> Polarity {
        match self {
            EdgeMode::Rising => Polarity::Positive,
            EdgeMode::Falling => Polarity::Negative,
            EdgeMode::Both(polarity) => polarity,
        }
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Square
    }
}
