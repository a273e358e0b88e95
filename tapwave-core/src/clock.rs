/*
    Copyright (C) 2020-2024  Rafal Michalski

    This file is part of TAPWAVE, a Rust library for converting tape signals.

    For the full copyright notice, see the lib.rs file.
*/
//! Tape clock model of the supported machines and the sample rate scaling.
//!
//! Pulse lengths are archived in units of the machine's tape clock cycles.
//! A [ClockModel] selects the clock frequency from the machine family and the
//! video standard, and [ClockScale] relates it to the sample rate of the audio
//! signal.
use core::convert::TryFrom;
use core::fmt;
use core::num::NonZeroU32;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};
#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use crate::error::ConfigError;

/// The largest pulse length in tape clock cycles that can be archived as a single unit.
///
/// A unit with this value is used as an escape marker meaning: no edge for the time it spans.
pub const OVERFLOW_VALUE: u32 = 0x00FF_FFFF;

/// Tape clock frequencies in Hz indexed by [Machine] and [VideoStandard].
const TAPE_CLOCKS: [[u32; 2]; 3] = [
    /*     PAL      NTSC   */
    [  985_248, 1_022_727], // C64
    [1_108_405, 1_022_727], // VIC-20
    [  886_724,   894_886], // C16, Plus/4
];

/// The machine family selector.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Machine {
    C64   = 0,
    Vic20 = 1,
    C16   = 2,
}

/// The video standard selector.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VideoStandard {
    Pal  = 0,
    Ntsc = 1,
}

/// The error returned when a machine selector code is out of the clock table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryFromU8MachineError(pub u8);

/// The error returned when a video standard selector code is out of the clock table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryFromU8VideoStandardError(pub u8);

/// A tape clock model: the machine family and its video standard.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct ClockModel {
    pub machine: Machine,
    pub video: VideoStandard,
}

/// Relates the tape clock of a [ClockModel] to the audio sample rate.
///
/// The values are derived once on creation.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockScale {
    model: ClockModel,
    sample_rate: NonZeroU32,
    factor: f64,
    overflow_samples: u32,
}

impl Default for Machine {
    fn default() -> Self {
        Machine::C64
    }
}

impl Default for VideoStandard {
    fn default() -> Self {
        VideoStandard::Pal
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Machine::C64   => "C64",
            Machine::Vic20 => "VIC-20",
            Machine::C16   => "C16",
        })
    }
}

impl fmt::Display for VideoStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VideoStandard::Pal  => "PAL",
            VideoStandard::Ntsc => "NTSC",
        })
    }
}

impl std::error::Error for TryFromU8MachineError {}

impl fmt::Display for TryFromU8MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "converted integer ({}) out of range for `Machine`", self.0)
    }
}

impl std::error::Error for TryFromU8VideoStandardError {}

impl fmt::Display for TryFromU8VideoStandardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "converted integer ({}) out of range for `VideoStandard`", self.0)
    }
}

impl TryFrom<u8> for Machine {
    type Error = TryFromU8MachineError;
    fn try_from(code: u8) -> core::result::Result<Self, Self::Error> {
        Ok(match code {
            0 => Machine::C64,
            1 => Machine::Vic20,
            2 => Machine::C16,
            _ => return Err(TryFromU8MachineError(code))
        })
    }
}

impl TryFrom<u8> for VideoStandard {
    type Error = TryFromU8VideoStandardError;
    fn try_from(code: u8) -> core::result::Result<Self, Self::Error> {
        Ok(match code {
            0 => VideoStandard::Pal,
            1 => VideoStandard::Ntsc,
            _ => return Err(TryFromU8VideoStandardError(code))
        })
    }
}

impl From<Machine> for u8 {
    fn from(machine: Machine) -> u8 {
        machine as u8
    }
}

impl From<VideoStandard> for u8 {
    fn from(video: VideoStandard) -> u8 {
        video as u8
    }
}

impl fmt::Display for ClockModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.machine, self.video)
    }
}

impl ClockModel {
    pub const fn new(machine: Machine, video: VideoStandard) -> Self {
        ClockModel { machine, video }
    }
    /// Creates a clock model from the selector codes found in the tape archive headers.
    pub fn try_from_codes(machine: u8, video: u8) -> Result<Self, ConfigError> {
        let machine = Machine::try_from(machine)?;
        let video = VideoStandard::try_from(video)?;
        Ok(ClockModel { machine, video })
    }
    /// Returns the tape clock frequency in Hz.
    #[inline]
    pub fn clock_hz(self) -> u32 {
        TAPE_CLOCKS[self.machine as usize][self.video as usize]
    }
    /// Returns the scale relating this clock to the given `sample_rate`.
    pub fn scale(self, sample_rate: u32) -> Result<ClockScale, ConfigError> {
        ClockScale::new(self, sample_rate)
    }
}

impl ClockScale {
    /// Creates a new scale.
    ///
    /// Returns an error if `sample_rate` is zero.
    pub fn new(model: ClockModel, sample_rate: u32) -> Result<Self, ConfigError> {
        let sample_rate = NonZeroU32::new(sample_rate).ok_or(ConfigError::ZeroSampleRate)?;
        let factor = f64::from(model.clock_hz()) / f64::from(sample_rate.get());
        let overflow_samples = overflow_samples(factor);
        debug!("clock: {} at {} Hz, factor: {}, overflow samples: {}",
                model, sample_rate, factor, overflow_samples);
        Ok(ClockScale { model, sample_rate, factor, overflow_samples })
    }
    /// Returns the clock model.
    pub fn model(&self) -> ClockModel {
        self.model
    }
    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.get()
    }
    /// Returns the number of tape clock cycles per a single sample.
    pub fn factor(&self) -> f64 {
        self.factor
    }
    /// Returns the largest number of samples that fits in [OVERFLOW_VALUE] tape clock cycles.
    pub fn overflow_samples(&self) -> u32 {
        self.overflow_samples
    }
    /// Converts the number of samples to tape clock cycles, rounding to the nearest cycle.
    ///
    /// Saturates at `u32::MAX`.
    #[inline]
    pub fn samples_to_units(&self, samples: u32) -> u32 {
        (f64::from(samples) * self.factor).round() as u32
    }
    /// Converts tape clock cycles to the number of samples, rounding to the nearest sample.
    #[inline]
    pub fn units_to_samples(&self, units: u32) -> u32 {
        (f64::from(units) / self.factor).round() as u32
    }
}

/// Estimates the sample count from the inverse scale and steps back once if
/// the float rounding of the estimate overshoots the overflow value.
fn overflow_samples(factor: f64) -> u32 {
    let limit = f64::from(OVERFLOW_VALUE);
    let estimate = ((limit / factor) as u32).saturating_add(1);
    if f64::from(estimate) * factor > limit {
        estimate - 1
    }
    else {
        estimate
    }
}
