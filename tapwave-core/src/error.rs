/*
    Copyright (C) 2020-2024  Rafal Michalski

    This file is part of TAPWAVE, a Rust library for converting tape signals.

    For the full copyright notice, see the lib.rs file.
*/
//! Configuration errors.
use core::fmt;
use std::error;

use crate::clock::{TryFromU8MachineError, TryFromU8VideoStandardError};

/// An error returned when an encoder or a decoder can't be created or reconfigured.
///
/// Nothing is created when this error is returned and a reconfigured instance
/// keeps its previous configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The sample rate was zero.
    ZeroSampleRate,
    /// The synthesized signal volume was zero or negative.
    NonPositiveVolume(i32),
    /// The machine selector code is not in the clock table.
    Machine(TryFromU8MachineError),
    /// The video standard selector code is not in the clock table.
    VideoStandard(TryFromU8VideoStandardError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroSampleRate => write!(f, "the sample rate must not be zero"),
            ConfigError::NonPositiveVolume(volume) => {
                write!(f, "the volume must be positive, got: {}", volume)
            }
            ConfigError::Machine(e) => fmt::Display::fmt(e, f),
            ConfigError::VideoStandard(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ConfigError::Machine(e) => Some(e),
            ConfigError::VideoStandard(e) => Some(e),
            _ => None
        }
    }
}

impl From<TryFromU8MachineError> for ConfigError {
    fn from(error: TryFromU8MachineError) -> Self {
        ConfigError::Machine(error)
    }
}

impl From<TryFromU8VideoStandardError> for ConfigError {
    fn from(error: TryFromU8VideoStandardError) -> Self {
        ConfigError::VideoStandard(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_works() {
        assert_eq!("the sample rate must not be zero", ConfigError::ZeroSampleRate.to_string());
        assert_eq!("the volume must be positive, got: -5",
                   ConfigError::NonPositiveVolume(-5).to_string());
        let err = ConfigError::from(TryFromU8MachineError(3));
        assert_eq!("converted integer (3) out of range for `Machine`", err.to_string());
        assert!(err.source().is_some());
        let err = ConfigError::from(TryFromU8VideoStandardError(2));
        assert_eq!("converted integer (2) out of range for `VideoStandard`", err.to_string());
        assert!(ConfigError::ZeroSampleRate.source().is_none());
    }
}
