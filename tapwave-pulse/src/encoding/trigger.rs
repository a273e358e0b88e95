/*
    Copyright (C) 2020-2024  Rafal Michalski

    This file is part of TAPWAVE, a Rust library for converting tape signals.

    For the full copyright notice, see the lib.rs file.
*/
use core::num::NonZeroU32;

#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use tapwave_core::signal::EdgeMode;
use super::peak::Extremum;

/// A signal crossing of the trigger level.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crossing {
    /// The position of the first sample past the trigger level.
    pub position: u32,
    /// `true` if the signal crossed the level upwards.
    pub rising: bool,
}

/// The current state of the [TriggerEngine].
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerState {
    /// The current half-cycle has already triggered, waiting for the next extremum.
    Crossed,
    /// Untriggered after a minimum, waiting for the signal to rise above the trigger level.
    WaitingRising,
    /// Untriggered after a maximum, waiting for the signal to fall below the trigger level.
    WaitingFalling,
    /// Crossed, but the pulse ending with this crossing has not been committed yet.
    Pending(Crossing),
}

/// Detects crossings of the trigger level and measures pulses between the committed ones.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerEngine {
    state: TriggerState,
    trigger_position: u32,
}

impl Default for TriggerState {
    fn default() -> Self {
        TriggerState::Crossed
    }
}

impl TriggerState {
    /// Returns `true` if waiting for a crossing.
    pub fn is_untriggered(&self) -> bool {
        matches!(self, TriggerState::WaitingRising|TriggerState::WaitingFalling)
    }
    /// Returns `true` if a crossing awaits commitment.
    pub fn is_pending(&self) -> bool {
        matches!(self, TriggerState::Pending(..))
    }
}

impl Default for TriggerEngine {
    fn default() -> Self {
        TriggerEngine { state: TriggerState::Crossed, trigger_position: 0 }
    }
}

impl TriggerEngine {
    /// Returns the current state.
    pub fn state(&self) -> TriggerState {
        self.state
    }
    /// Returns the position of the last committed trigger.
    pub fn trigger_position(&self) -> u32 {
        self.trigger_position
    }
    /// Returns the direction of the awaited crossing, if untriggered.
    pub(super) fn awaits_rising(&self) -> Option<bool> {
        match self.state {
            TriggerState::WaitingRising => Some(true),
            TriggerState::WaitingFalling => Some(false),
            _ => None
        }
    }
    /// Re-arms the trigger after an extremum of the given `kind` has been accepted.
    pub(super) fn arm(&mut self, kind: Extremum) {
        self.state = if kind.is_followed_by_rising() {
            TriggerState::WaitingRising
        }
        else {
            TriggerState::WaitingFalling
        };
    }
    /// Registers a crossing if the awaited one happened with the `value` at `position`.
    pub(super) fn detect(&mut self, value: i32, level: i32, position: u32) {
        let rising = match self.state {
            TriggerState::WaitingRising if value > level => true,
            TriggerState::WaitingFalling if value < level => false,
            _ => return
        };
        self.state = TriggerState::Pending(Crossing { position, rising });
    }
    /// Registers a crossing unconditionally.
    pub(super) fn cross(&mut self, crossing: Crossing) {
        self.state = TriggerState::Pending(crossing);
    }
    /// Takes the pending crossing out, leaving the engine crossed.
    pub(super) fn take_pending(&mut self) -> Option<Crossing> {
        match self.state {
            TriggerState::Pending(crossing) => {
                self.state = TriggerState::Crossed;
                Some(crossing)
            }
            _ => None
        }
    }
    /// Commits a trigger at the `crossing`.
    ///
    /// Returns the length of the pulse ending with the crossing if its direction
    /// matches the `edge` mode. Crossings in the opposite direction and crossings
    /// not past the last committed trigger yield nothing.
    pub(super) fn commit(&mut self, crossing: Crossing, edge: EdgeMode) -> Option<NonZeroU32> {
        if !edge.triggers_on(crossing.rising) {
            return None;
        }
        let pulse = NonZeroU32::new(crossing.position.checked_sub(self.trigger_position)?)?;
        self.trigger_position = crossing.position;
        Some(pulse)
    }
}
