/*
    Copyright (C) 2020-2024  Rafal Michalski

    This file is part of TAPWAVE, a Rust library for converting tape signals.

    For the full copyright notice, see the lib.rs file.
*/
//! Pulse length to PCM signal synthesis.
use arrayvec::ArrayVec;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};
#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use tapwave_core::error::ConfigError;
use tapwave_core::signal::{EdgeMode, Polarity, Waveform};

mod waveform;

pub use waveform::semiwave_sample;

/// Synthesizes PCM samples from pulse lengths measured in samples.
///
/// With [EdgeMode::Rising] or [EdgeMode::Falling] each pulse is a full signal cycle made of
/// two semiwaves, the first of which gets the odd sample. A pulse 1 sample long is silent.
/// With [EdgeMode::Both] each pulse is a single semiwave.
///
/// Semiwaves alternate their polarity. The first one is positive with [EdgeMode::Rising],
/// negative with [EdgeMode::Falling] or as configured with [EdgeMode::Both].
///
/// A hold loaded with [PulseSynth::hold] is a single semiwave that keeps the polarity when
/// completed, so the next pulse continues at the same polarity.
///
/// Only the progress within the current pulse is kept, so the synthesis may be paused at any
/// sample and resumed with the next call to [PulseSynth::fill].
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PulseSynth {
    volume: i32,
    edge: EdgeMode,
    waveform: Waveform,
    polarity: Polarity,
    semiwaves: ArrayVec<u32, 2>,
    current: usize,
    consumed: u32,
    holding: bool,
}

impl PulseSynth {
    /// Creates a new synthesizer.
    ///
    /// Returns an error if `volume` is not positive.
    pub fn new(volume: i32, edge: EdgeMode, waveform: Waveform) -> Result<Self, ConfigError> {
        if volume <= 0 {
            return Err(ConfigError::NonPositiveVolume(volume));
        }
        debug!("synth: volume: {} edge: {:?} waveform: {:?}", volume, edge, waveform);
        Ok(PulseSynth {
            volume,
            edge,
            waveform,
            polarity: edge.initial_polarity(),
            semiwaves: ArrayVec::new(),
            current: 0,
            consumed: 0,
            holding: false,
        })
    }
    pub fn volume(&self) -> i32 {
        self.volume
    }
    pub fn edge(&self) -> EdgeMode {
        self.edge
    }
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }
    /// Returns the polarity of the next synthesized semiwave.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }
    /// Returns `true` if the current pulse is a hold.
    pub fn is_holding(&self) -> bool {
        self.holding
    }
    /// Returns the number of samples left to synthesize of the current pulse.
    pub fn remaining(&self) -> u32 {
        self.semiwaves.iter().skip(self.current).sum::<u32>() - self.consumed
    }
    /// Returns `true` if the current pulse has been synthesized.
    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }
    /// Loads the next pulse `samples` long, dropping what's left of the current one.
    pub fn set_pulse(&mut self, samples: u32) {
        self.clear();
        if self.edge.is_semiwave() {
            self.semiwaves.push(samples);
        }
        else {
            let samples = if samples == 1 { 0 } else { samples };
            let second = samples / 2;
            self.semiwaves.push(samples - second);
            self.semiwaves.push(second);
        }
    }
    /// Loads a hold `samples` long at the current polarity, dropping what's left of the
    /// current pulse. The polarity is not switched when the hold completes.
    pub fn hold(&mut self, samples: u32) {
        self.clear();
        self.semiwaves.push(samples);
        self.holding = true;
    }
    /// Drops what's left of the current pulse.
    pub fn clear(&mut self) {
        self.semiwaves.clear();
        self.current = 0;
        self.consumed = 0;
        self.holding = false;
    }
    /// Drops what's left of the current pulse and restores the initial polarity.
    pub fn reset(&mut self) {
        self.clear();
        self.polarity = self.edge.initial_polarity();
    }
    /// Fills `buffer` with samples of the current pulse.
    ///
    /// Returns the number of samples written. `0` is returned only if `buffer` is empty
    /// or the current pulse has been synthesized.
    pub fn fill(&mut self, buffer: &mut [i32]) -> usize {
        let mut done = 0;
        while let Some(&len) = self.semiwaves.get(self.current) {
            let count = ((len - self.consumed) as usize).min(buffer.len() - done);
            let target = &mut buffer[done..done + count];
            for (elapsed, sample) in (self.consumed..).zip(target.iter_mut()) {
                *sample = self.polarity.apply(
                    semiwave_sample(self.waveform, elapsed, len, self.volume));
            }
            done += count;
            self.consumed += count as u32;
            if self.consumed != len {
                break;
            }
            if len != 0 && !self.holding {
                self.polarity = !self.polarity;
            }
            self.current += 1;
            self.consumed = 0;
        }
        done
    }
}
