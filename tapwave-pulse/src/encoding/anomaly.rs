/*
    Copyright (C) 2020-2024  Rafal Michalski

    This file is part of TAPWAVE, a Rust library for converting tape signals.

    For the full copyright notice, see the lib.rs file.
*/
#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};
#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use super::trigger::Crossing;

/// A deferred trigger.
///
/// Created when an extremum is accepted before the signal crossed the trigger level
/// set by the previous pair of extrema. The crossing that should have happened
/// between the two extrema is either confirmed or disproved by the following samples.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anomaly {
    /// The position halfway between the extrema the anomaly derives from.
    pub position: u32,
    /// The trigger level in force before the anomaly.
    pub resolution_level: i32,
    /// The direction of the deferred crossing.
    pub rising: bool,
}

/// Holds at most one active anomaly and at most one superseded anomaly awaiting commitment.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnomalyCorrector {
    active: Option<Anomaly>,
    superseded: Option<Anomaly>,
}

impl Anomaly {
    /// Creates an anomaly halfway between `position` and `opposite`, rounding down.
    pub fn between(position: u32, opposite: u32, resolution_level: i32, rising: bool) -> Self {
        let position = position / 2 + opposite / 2 + (position & opposite & 1);
        Anomaly { position, resolution_level, rising }
    }
    /// Returns the deferred crossing.
    pub fn crossing(&self) -> Crossing {
        Crossing { position: self.position, rising: self.rising }
    }
}

impl AnomalyCorrector {
    /// Returns the active anomaly.
    pub fn active(&self) -> Option<&Anomaly> {
        self.active.as_ref()
    }
    /// Returns the anomaly superseded by the active one that awaits commitment.
    pub fn superseded(&self) -> Option<&Anomaly> {
        self.superseded.as_ref()
    }
    /// Defers a new anomaly, superseding the active one.
    pub(super) fn defer(&mut self, anomaly: Anomaly) {
        trace!("anomaly: {:?}", anomaly);
        if let Some(previous) = self.active.replace(anomaly) {
            trace!("superseded: {:?}", previous);
            debug_assert!(self.superseded.is_none());
            self.superseded = Some(previous);
        }
    }
    /// Discards the active anomaly if `value` went back past its resolution level.
    ///
    /// `rising` is the direction of the crossing awaited by the trigger.
    ///
    /// Returns `true` if the anomaly has been discarded.
    pub(super) fn disprove(&mut self, value: i32, rising: bool) -> bool {
        match self.active {
            Some(Anomaly { resolution_level, .. })
                if rising && value < resolution_level || !rising && value > resolution_level =>
            {
                trace!("disproved: {:?} by {}", self.active, value);
                self.active = None;
                true
            }
            _ => false
        }
    }
    /// Takes out the superseded anomaly.
    pub(super) fn take_superseded(&mut self) -> Option<Anomaly> {
        self.superseded.take()
    }
    /// Takes out the active anomaly, confirmed by a crossing.
    pub(super) fn confirm(&mut self) -> Option<Anomaly> {
        let anomaly = self.active.take();
        if anomaly.is_some() {
            trace!("confirmed: {:?}", anomaly);
        }
        anomaly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anomaly_position_works() {
        assert_eq!(5, Anomaly::between(10, 0, 0, true).position);
        assert_eq!(5, Anomaly::between(3, 7, 0, true).position);
        assert_eq!(4, Anomaly::between(4, 5, 0, true).position);
        assert_eq!(u32::MAX - 1, Anomaly::between(u32::MAX, u32::MAX - 2, 0, false).position);
        assert_eq!(u32::MAX - 1, Anomaly::between(u32::MAX - 1, u32::MAX, 0, false).position);
        let anomaly = Anomaly::between(20, 10, -3, false);
        assert_eq!(Crossing { position: 15, rising: false }, anomaly.crossing());
    }

    #[test]
    fn anomaly_corrector_works() {
        let mut corrector = AnomalyCorrector::default();
        assert_eq!(None, corrector.active());
        assert_eq!(false, corrector.disprove(0, true));
        let first = Anomaly::between(10, 20, 100, true);
        corrector.defer(first);
        assert_eq!(Some(&first), corrector.active());
        assert_eq!(None, corrector.superseded());
        let second = Anomaly::between(20, 30, -100, false);
        corrector.defer(second);
        assert_eq!(Some(&second), corrector.active());
        assert_eq!(Some(&first), corrector.superseded());
        assert_eq!(Some(first), corrector.take_superseded());
        assert_eq!(None, corrector.take_superseded());
        // awaiting a falling crossing, the signal went above the level
        assert_eq!(false, corrector.disprove(-101, false));
        assert_eq!(true, corrector.disprove(-99, false));
        assert_eq!(None, corrector.active());
        corrector.defer(first);
        // awaiting a rising crossing, the signal went below the level
        assert_eq!(false, corrector.disprove(100, true));
        assert_eq!(true, corrector.disprove(99, true));
        corrector.defer(second);
        assert_eq!(Some(second), corrector.confirm());
        assert_eq!(None, corrector.confirm());
    }
}
