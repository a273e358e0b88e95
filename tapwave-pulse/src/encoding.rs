/*
    Copyright (C) 2020-2024  Rafal Michalski

    This file is part of TAPWAVE, a Rust library for converting tape signals.

    For the full copyright notice, see the lib.rs file.
*/
//! PCM signal to pulse length encoding.
//!
//! The [PulseEncoder] scans the signal for local extrema with a [PeakTracker]. Every accepted
//! extremum sets the trigger level halfway towards the opposite one and arms the [TriggerEngine]
//! which measures pulses between the signal crossings of that level.
//!
//! An extremum accepted before the signal crossed the level set by the previous pair of extrema
//! makes an [Anomaly]: the missed crossing is placed halfway between the two extrema and held by
//! the [AnomalyCorrector] until the next samples either confirm or disprove it.
use core::num::NonZeroU32;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};
#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use tapwave_core::signal::EdgeMode;

mod anomaly;
mod peak;
mod trigger;

pub use anomaly::*;
pub use peak::{Extremum, PeakTracker};
pub use trigger::*;

/// The largest accepted sensitivity.
pub const MAX_SENSITIVITY: u8 = 100;
/// The largest accepted initial threshold.
pub const MAX_INITIAL_THRESHOLD: u8 = 127;

/// The [PulseEncoder] configuration.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EncoderConfig {
    /// The minimum number of samples between opposite extrema.
    pub min_duration: u32,
    /// How far from the trigger level towards the opposite extremum the signal must
    /// go for an extremum to be accepted, in percent, up to [MAX_SENSITIVITY].
    pub sensitivity: u8,
    /// The amplitude the first extremum must exceed, in units of `1 << 24`,
    /// up to [MAX_INITIAL_THRESHOLD].
    pub initial_threshold: u8,
    /// Which edges end pulses.
    pub edge: EdgeMode,
}

/// Encodes PCM samples as pulse lengths measured in samples.
///
/// The first two samples after creation or [PulseEncoder::flush] only initialize the tracker,
/// so the pulses emitted plus the value returned by [PulseEncoder::flush] always sum up to
/// the number of samples consumed less two.
///
/// The first pulse is measured from the start of the stream.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PulseEncoder {
    config: EncoderConfig,
    position: u32,
    tracker: PeakTracker,
    trigger: TriggerEngine,
    anomalies: AnomalyCorrector,
}

/// An iterator of pulses encoded from a slice of samples.
///
/// Created by [PulseEncoder::pulses].
#[derive(Debug)]
pub struct Pulses<'a> {
    encoder: &'a mut PulseEncoder,
    samples: &'a [i32],
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            min_duration: 0,
            sensitivity: 12,
            initial_threshold: 20,
            edge: EdgeMode::Rising,
        }
    }
}

impl EncoderConfig {
    pub fn with_min_duration(mut self, min_duration: u32) -> Self {
        self.min_duration = min_duration;
        self
    }
    pub fn with_sensitivity(mut self, sensitivity: u8) -> Self {
        self.sensitivity = sensitivity;
        self
    }
    pub fn with_initial_threshold(mut self, initial_threshold: u8) -> Self {
        self.initial_threshold = initial_threshold;
        self
    }
    pub fn with_edge(mut self, edge: EdgeMode) -> Self {
        self.edge = edge;
        self
    }
    /// Returns the amplitude the first extremum must exceed.
    #[inline]
    pub fn threshold_amplitude(&self) -> i32 {
        i32::from(self.initial_threshold.min(MAX_INITIAL_THRESHOLD)) << 24
    }
    /// Returns the configuration with the sensitivity and the initial threshold limited
    /// to their accepted ranges.
    pub fn clamped(mut self) -> Self {
        if self.sensitivity > MAX_SENSITIVITY {
            warn!("sensitivity {} clamped to {}", self.sensitivity, MAX_SENSITIVITY);
            self.sensitivity = MAX_SENSITIVITY;
        }
        if self.initial_threshold > MAX_INITIAL_THRESHOLD {
            warn!("initial threshold {} clamped to {}", self.initial_threshold, MAX_INITIAL_THRESHOLD);
            self.initial_threshold = MAX_INITIAL_THRESHOLD;
        }
        self
    }
}

impl Default for PulseEncoder {
    fn default() -> Self {
        PulseEncoder::new(EncoderConfig::default())
    }
}

impl PulseEncoder {
    /// Creates a new encoder.
    ///
    /// Out of range values of the `config` are clamped.
    pub fn new(config: EncoderConfig) -> Self {
        let config = config.clamped();
        debug!("encoder: {:?}", config);
        PulseEncoder {
            config,
            position: 0,
            tracker: PeakTracker::new(&config),
            trigger: TriggerEngine::default(),
            anomalies: AnomalyCorrector::default(),
        }
    }
    /// Returns the configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
    /// Returns the number of samples consumed since the tracker was primed.
    pub fn position(&self) -> u32 {
        self.position
    }
    /// Returns the value of the last accepted maximum.
    ///
    /// Before any maximum is accepted this is the initial threshold amplitude.
    pub fn last_peak(&self) -> i32 {
        self.tracker.max_value()
    }
    /// Returns a reference to the peak tracker.
    pub fn tracker(&self) -> &PeakTracker {
        &self.tracker
    }
    /// Returns the state of the trigger.
    pub fn trigger_state(&self) -> TriggerState {
        self.trigger.state()
    }
    /// Returns the position of the last committed trigger.
    pub fn trigger_position(&self) -> u32 {
        self.trigger.trigger_position()
    }
    /// Returns the active anomaly.
    pub fn anomaly(&self) -> Option<&Anomaly> {
        self.anomalies.active()
    }
    /// Returns the superseded anomaly awaiting commitment.
    pub fn superseded_anomaly(&self) -> Option<&Anomaly> {
        self.anomalies.superseded()
    }
    /// Restarts tracking, preserving the configuration.
    pub fn reset(&mut self) {
        *self = PulseEncoder::new(self.config);
    }
    /// Returns the length of the pulse since the last committed trigger and resets the encoder.
    ///
    /// An unresolved anomaly is dropped.
    pub fn flush(&mut self) -> u32 {
        let pulse = self.position.wrapping_sub(self.trigger.trigger_position());
        if let Some(anomaly) = self.anomalies.active() {
            trace!("dropped: {:?}", anomaly);
        }
        self.reset();
        pulse
    }
    /// Consumes `samples` until a pulse is found.
    ///
    /// Returns the number of consumed samples and the pulse length, if found.
    /// Call again with the unconsumed rest of `samples` to find the next pulse.
    /// Without a pulse all `samples` have been consumed.
    pub fn feed(&mut self, samples: &[i32]) -> (usize, Option<NonZeroU32>) {
        let mut consumed = 0;
        loop {
            if let Some(pulse) = self.commit_pending() {
                return (consumed, Some(pulse));
            }
            match samples.get(consumed) {
                Some(&sample) => {
                    consumed += 1;
                    self.process(sample);
                }
                None => return (consumed, None)
            }
        }
    }
    /// Returns an iterator of pulses found in `samples`.
    ///
    /// All the `samples` are consumed when the iterator is exhausted.
    pub fn pulses<'a>(&'a mut self, samples: &'a [i32]) -> Pulses<'a> {
        Pulses { encoder: self, samples }
    }
    /// Commits anomalies and crossings in their order until a pulse is found.
    fn commit_pending(&mut self) -> Option<NonZeroU32> {
        let edge = self.config.edge;
        if let Some(anomaly) = self.anomalies.take_superseded() {
            if let Some(pulse) = self.trigger.commit(anomaly.crossing(), edge) {
                return Some(pulse);
            }
        }
        if self.trigger.state().is_pending() {
            if let Some(anomaly) = self.anomalies.confirm() {
                if let Some(pulse) = self.trigger.commit(anomaly.crossing(), edge) {
                    return Some(pulse);
                }
            }
        }
        let crossing = self.trigger.take_pending()?;
        self.trigger.commit(crossing, edge)
    }

    fn process(&mut self, sample: i32) {
        if self.tracker.prime(sample) {
            return;
        }
        let position = self.position;
        let armed = self.trigger.state().is_untriggered();
        if let Some(accepted) = self.tracker.update(sample, position, !armed, &self.config) {
            if armed {
                let anomaly = Anomaly::between(accepted.position,
                                               accepted.opposite.unwrap_or(0),
                                               accepted.level_before,
                                               accepted.kind == Extremum::Maximum);
                self.anomalies.defer(anomaly);
            }
            self.trigger.arm(accepted.kind);
        }
        if let Some(rising) = self.trigger.awaits_rising() {
            if self.anomalies.disprove(sample, rising) {
                let invalid = if rising { Extremum::Minimum } else { Extremum::Maximum };
                self.tracker.rewind(invalid);
                let rising = self.tracker.last_kind() == Some(Extremum::Minimum);
                self.trigger.cross(Crossing { position, rising });
            }
            else {
                self.trigger.detect(sample, self.tracker.trigger_level(), position);
            }
        }
        self.position = position.wrapping_add(1);
    }
}

impl Iterator for Pulses<'_> {
    type Item = NonZeroU32;

    fn next(&mut self) -> Option<NonZeroU32> {
        let (consumed, pulse) = self.encoder.feed(self.samples);
        self.samples = &self.samples[consumed..];
        pulse
    }
}

impl<'a> Pulses<'a> {
    /// Returns the samples not consumed yet.
    pub fn remaining(&self) -> &'a [i32] {
        self.samples
    }
}
