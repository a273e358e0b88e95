/*
    Copyright (C) 2020-2024  Rafal Michalski

    This file is part of TAPWAVE, a Rust library for converting tape signals.

    For the full copyright notice, see the lib.rs file.
*/
#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use tapwave_core::signal::{EdgeMode, Polarity};
use super::EncoderConfig;

/// The kind of a signal extremum.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extremum {
    Minimum,
    Maximum,
}

/// An extremum accepted in alternation with the previous one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct Accepted {
    pub kind: Extremum,
    pub position: u32,
    /// The position of the last accepted extremum of the opposite kind.
    pub opposite: Option<u32>,
    /// The trigger level before this extremum was accepted.
    pub level_before: i32,
}

/// Tracks local extrema of the signal and derives the trigger level and the noise floor from them.
///
/// A direction reversal makes the previous sample a candidate extremum. A candidate is accepted
/// only when it lasted long enough and passed the noise floor set by the opposite extremum.
///
/// Positions are `None` until the first extremum of the kind is accepted, `None` orders
/// before any position.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PeakTracker {
    primed: u8,
    value: i32,
    increasing: bool,
    max: Option<u32>,
    prev_max: Option<u32>,
    max_value: i32,
    min: Option<u32>,
    prev_min: Option<u32>,
    min_value: i32,
    noise_floor: i32,
    trigger_level: i32,
}

impl Extremum {
    /// Returns the direction of the crossing that follows this extremum.
    #[inline]
    pub fn is_followed_by_rising(self) -> bool {
        self == Extremum::Minimum
    }
}

impl PeakTracker {
    pub(super) fn new(config: &EncoderConfig) -> Self {
        let threshold = config.threshold_amplitude();
        // In semiwave mode the first accepted extremum must start the first semiwave.
        let noise_floor = match config.edge {
            EdgeMode::Both(Polarity::Positive) => i32::MIN,
            EdgeMode::Both(Polarity::Negative) => i32::MAX,
            _ => 0
        };
        PeakTracker {
            primed: 0,
            value: 0,
            increasing: false,
            max: None,
            prev_max: None,
            max_value: threshold,
            min: None,
            prev_min: None,
            min_value: -threshold,
            noise_floor,
            trigger_level: 0,
        }
    }
    /// Returns the last sample value.
    pub fn value(&self) -> i32 {
        self.value
    }
    /// Returns the current trigger level.
    pub fn trigger_level(&self) -> i32 {
        self.trigger_level
    }
    /// Returns the current noise floor.
    pub fn noise_floor(&self) -> i32 {
        self.noise_floor
    }
    /// Returns the value of the last accepted maximum.
    pub fn max_value(&self) -> i32 {
        self.max_value
    }
    /// Returns the value of the last accepted minimum.
    pub fn min_value(&self) -> i32 {
        self.min_value
    }
    /// Returns the position of the last accepted maximum.
    pub fn max_position(&self) -> Option<u32> {
        self.max
    }
    /// Returns the position of the last accepted minimum.
    pub fn min_position(&self) -> Option<u32> {
        self.min
    }
    /// Returns the kind of the most recent extremum by position.
    pub fn last_kind(&self) -> Option<Extremum> {
        if self.min > self.max {
            Some(Extremum::Minimum)
        }
        else if self.max > self.min {
            Some(Extremum::Maximum)
        }
        else {
            None
        }
    }
    /// Consumes one of the first two samples after a reset.
    ///
    /// The first sample sets the level, the second one the initial direction.
    /// Returns `false` once the tracker is primed, leaving the sample unconsumed.
    pub(super) fn prime(&mut self, sample: i32) -> bool {
        match self.primed {
            0 => self.value = sample,
            1 => {
                self.increasing = sample > self.value;
                self.value = sample;
            }
            _ => return false
        }
        self.primed += 1;
        true
    }
    /// Updates the tracker with the next `sample` at `position`.
    ///
    /// If `catch_up` is `true` extrema are accepted regardless of their duration.
    ///
    /// Returns the accepted extremum if it alternates with the previous one.
    pub(super) fn update(
            &mut self,
            sample: i32,
            position: u32,
            catch_up: bool,
            config: &EncoderConfig
        ) -> Option<Accepted>
    {
        let prev_value = self.value;
        self.value = sample;
        let was_increasing = self.increasing;
        if sample > prev_value {
            self.increasing = true;
        }
        else if sample < prev_value {
            self.increasing = false;
        }
        if self.increasing == was_increasing {
            return None;
        }

        let sensitivity = i32::from(config.sensitivity);
        if self.increasing {
            let lasted = position.wrapping_sub(self.max.unwrap_or(0)) > config.min_duration;
            if (lasted || catch_up)
                && self.noise_floor > prev_value
                && (self.max > self.min || self.min_value > prev_value)
            {
                let accepted = if self.max >= self.min {
                    let opposite = self.max;
                    self.prev_min = self.min;
                    self.min = Some(position);
                    Some(Accepted { kind: Extremum::Minimum, position, opposite,
                                    level_before: self.trigger_level })
                }
                else {
                    None
                };
                self.min_value = prev_value;
                if self.max.is_some() {
                    self.trigger_level = prev_value / 2 + self.max_value / 2;
                    self.noise_floor = self.min_value / 200 * (100 + sensitivity)
                                     + self.max_value / 200 * (100 - sensitivity);
                }
                else {
                    self.trigger_level = 0;
                    self.noise_floor = config.threshold_amplitude();
                }
                return accepted;
            }
        }
        else {
            let lasted = position.wrapping_sub(self.min.unwrap_or(0)) > config.min_duration;
            if (lasted || catch_up)
                && prev_value > self.noise_floor
                && (self.min > self.max || prev_value > self.max_value)
            {
                let accepted = if self.min >= self.max {
                    let opposite = self.min;
                    self.prev_max = self.max;
                    self.max = Some(position);
                    Some(Accepted { kind: Extremum::Maximum, position, opposite,
                                    level_before: self.trigger_level })
                }
                else {
                    None
                };
                self.max_value = prev_value;
                if self.min.is_some() {
                    self.trigger_level = prev_value / 2 + self.min_value / 2;
                    self.noise_floor = self.min_value / 200 * (100 - sensitivity)
                                     + self.max_value / 200 * (100 + sensitivity);
                }
                else {
                    self.trigger_level = 0;
                    self.noise_floor = -config.threshold_amplitude();
                }
                return accepted;
            }
        }
        None
    }
    /// Forgets the position of the last accepted extremum of the given `kind`,
    /// restoring the one accepted before it.
    pub(super) fn rewind(&mut self, kind: Extremum) {
        match kind {
            Extremum::Minimum => self.min = self.prev_min,
            Extremum::Maximum => self.max = self.prev_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(tracker: &mut PeakTracker, config: &EncoderConfig, samples: &[i32]) -> Vec<Accepted> {
        let mut position = 0;
        let mut res = Vec::new();
        for &sample in samples {
            if tracker.prime(sample) {
                continue;
            }
            if let Some(accepted) = tracker.update(sample, position, true, config) {
                res.push(accepted);
            }
            position += 1;
        }
        res
    }

    #[test]
    fn peak_tracker_primes() {
        let config = EncoderConfig::default();
        let mut tracker = PeakTracker::new(&config);
        assert!(tracker.prime(10));
        assert!(tracker.prime(5));
        assert!(!tracker.prime(7));
        assert_eq!(5, tracker.value());
        assert_eq!(None, tracker.last_kind());
    }

    #[test]
    fn peak_tracker_accepts_alternating_extrema() {
        let config = EncoderConfig::default().with_initial_threshold(0).with_sensitivity(50);
        let mut tracker = PeakTracker::new(&config);
        let v = 1 << 20;
        let accepted = track(&mut tracker, &config, &[v, v, -v, -v, v, v, -v, -v]);
        assert_eq!(2, accepted.len());
        assert_eq!(Accepted { kind: Extremum::Minimum, position: 2, opposite: None, level_before: 0 },
                   accepted[0]);
        assert_eq!(Accepted { kind: Extremum::Maximum, position: 4, opposite: Some(2), level_before: 0 },
                   accepted[1]);
        assert_eq!(Some(Extremum::Maximum), tracker.last_kind());
        assert_eq!(v, tracker.max_value());
        assert_eq!(-v, tracker.min_value());
        assert_eq!(0, tracker.trigger_level());
        assert_eq!(v / 200 * 150 - v / 200 * 50, tracker.noise_floor());
        assert!(tracker.trigger_level() >= tracker.min_value());
        assert!(tracker.trigger_level() <= tracker.max_value());
    }

    #[test]
    fn peak_tracker_rejects_noise() {
        let config = EncoderConfig::default().with_initial_threshold(20);
        let mut tracker = PeakTracker::new(&config);
        // below the initial threshold nothing is accepted
        let small = 1 << 20;
        let accepted = track(&mut tracker, &config, &[small, small, -small, small, -small, small]);
        assert!(accepted.is_empty());
        assert_eq!(None, tracker.last_kind());
        assert_eq!(20 << 24, tracker.max_value());
    }

    #[test]
    fn peak_tracker_refreshes_deeper_extremum() {
        let config = EncoderConfig::default().with_initial_threshold(1).with_sensitivity(100);
        let mut tracker = PeakTracker::new(&config);
        let v = 1 << 26;
        // the bump at -v/2 stays below the threshold so the deeper minimum follows the first one
        let accepted = track(&mut tracker, &config, &[v, v, -v, -v / 2, -2 * v, v]);
        assert_eq!(1, accepted.len());
        assert_eq!(None, tracker.max_position());
        assert_eq!(Some(1), tracker.min_position());
        assert_eq!(-2 * v, tracker.min_value());
    }

    #[test]
    fn peak_tracker_semiwave_starts_with_maximum() {
        let config = EncoderConfig::default().with_initial_threshold(0)
                                             .with_edge(EdgeMode::Both(Polarity::Positive));
        let mut tracker = PeakTracker::new(&config);
        let v = 1 << 20;
        let accepted = track(&mut tracker, &config, &[0, 0, -v, 0, v, 0, -v, 0]);
        assert_eq!(Extremum::Maximum, accepted[0].kind);
        assert_eq!(Extremum::Minimum, accepted[1].kind);
    }
}
