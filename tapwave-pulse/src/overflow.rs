/*
    Copyright (C) 2020-2024  Rafal Michalski

    This file is part of TAPWAVE, a Rust library for converting tape signals.

    For the full copyright notice, see the lib.rs file.
*/
//! Pulse lengths in tape clock units.
//!
//! A single unit can't exceed [OVERFLOW_VALUE] tape clock cycles. Longer pulses are archived
//! as a sequence of overflow units, each of [OVERFLOW_VALUE], followed by a remainder unit.
//! An overflow unit stands for [ClockScale::overflow_samples] samples without a signal edge.
//!
//! The remainder of a pulse that is an exact multiple of the overflow unit is archived as `0`
//! so the decoder knows the pulse has ended.
use core::iter::FusedIterator;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};
#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use tapwave_core::clock::{ClockScale, OVERFLOW_VALUE};

/// Converts pulse lengths between samples and tape clock units.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverflowCodec {
    scale: ClockScale,
}

/// An iterator of tape clock units of a single pulse.
///
/// Created by [OverflowCodec::encode].
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverflowUnits {
    overflows: u32,
    remainder: Option<u32>,
}

/// Joins the tape clock units back into pulse lengths measured in samples.
///
/// Created by [OverflowCodec::decoder].
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverflowDecoder {
    scale: ClockScale,
    held: u32,
}

impl From<ClockScale> for OverflowCodec {
    fn from(scale: ClockScale) -> Self {
        OverflowCodec::new(scale)
    }
}

impl OverflowCodec {
    pub fn new(scale: ClockScale) -> Self {
        OverflowCodec { scale }
    }
    /// Returns the clock scale.
    pub fn scale(&self) -> &ClockScale {
        &self.scale
    }
    /// Returns the number of samples an overflow unit stands for.
    pub fn overflow_samples(&self) -> u32 {
        self.scale.overflow_samples()
    }
    /// Returns an iterator of tape clock units of a pulse `samples` long.
    ///
    /// A zero length pulse yields no units.
    ///
    /// The remainder unit is limited to `1..OVERFLOW_VALUE` unless it's zero, so a non-zero
    /// remainder too short to be measured in tape clock cycles is archived as `1`.
    pub fn encode(&self, samples: u32) -> OverflowUnits {
        if samples == 0 {
            return OverflowUnits::default();
        }
        let overflow_samples = self.scale.overflow_samples();
        let overflows = samples / overflow_samples;
        let remainder = match samples % overflow_samples {
            0 => 0,
            rem => self.scale.samples_to_units(rem).max(1).min(OVERFLOW_VALUE - 1)
        };
        if overflows != 0 {
            trace!("pulse: {} samples, overflows: {}, remainder: {}", samples, overflows, remainder);
        }
        OverflowUnits { overflows, remainder: Some(remainder) }
    }
    /// Returns a new decoder of tape clock units.
    pub fn decoder(&self) -> OverflowDecoder {
        OverflowDecoder { scale: self.scale, held: 0 }
    }
}

impl OverflowUnits {
    /// Returns `true` if there are no more units.
    pub fn is_done(&self) -> bool {
        self.overflows == 0 && self.remainder.is_none()
    }
}

impl Iterator for OverflowUnits {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.overflows != 0 {
            self.overflows -= 1;
            Some(OVERFLOW_VALUE)
        }
        else {
            self.remainder.take()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.overflows as usize + self.remainder.is_some() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for OverflowUnits {}

impl FusedIterator for OverflowUnits {}

impl OverflowDecoder {
    /// Returns the clock scale.
    pub fn scale(&self) -> &ClockScale {
        &self.scale
    }
    /// Returns the number of samples held by the overflow units received so far.
    pub fn held(&self) -> u32 {
        self.held
    }
    /// Forgets the overflow units received so far.
    pub fn clear(&mut self) {
        self.held = 0;
    }
    /// Accepts the next tape clock unit.
    ///
    /// Returns the length of the pulse in samples when the pulse has ended, that is when
    /// `units` is not [OVERFLOW_VALUE]. Overflow units are held until then.
    pub fn push(&mut self, units: u32) -> Option<u32> {
        if units == OVERFLOW_VALUE {
            self.held = self.held.saturating_add(self.scale.overflow_samples());
            None
        }
        else {
            let samples = self.held.saturating_add(self.scale.units_to_samples(units));
            self.held = 0;
            Some(samples)
        }
    }
}
