/*
    Copyright (C) 2020-2024  Rafal Michalski

    This file is part of TAPWAVE, a Rust library for converting tape signals.

    For the full copyright notice, see the lib.rs file.
*/
//! Tape signal conversion in tape clock units.
//!
//! [TapeEncoder] and [TapeDecoder] pair the pulse engines with the [OverflowCodec] of the
//! configured [ClockModel], so the pulses are measured in the machine's tape clock cycles
//! instead of samples.
use core::iter::Chain;
use core::mem;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};
#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use tapwave_core::clock::{ClockModel, ClockScale};
use tapwave_core::error::ConfigError;
use tapwave_core::signal::{EdgeMode, Waveform};

use crate::decoding::PulseSynth;
use crate::encoding::{EncoderConfig, PulseEncoder};
use crate::overflow::{OverflowCodec, OverflowDecoder, OverflowUnits};

/// The default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// The clock configuration of a [TapeEncoder].
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TapeConfig {
    pub clock: ClockModel,
    /// The sample rate of the signal in Hz.
    pub sample_rate: u32,
}

/// Encodes PCM samples as pulse lengths in tape clock units.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TapeEncoder {
    encoder: PulseEncoder,
    codec: OverflowCodec,
    pending: OverflowUnits,
}

/// An iterator of tape clock units encoded from a slice of samples.
///
/// Created by [TapeEncoder::units].
#[derive(Debug)]
pub struct Units<'a> {
    encoder: &'a mut TapeEncoder,
    samples: &'a [i32],
}

/// The configuration of a [TapeDecoder].
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecoderConfig {
    pub clock: ClockModel,
    /// The sample rate of the synthesized signal in Hz.
    pub sample_rate: u32,
    /// The peak amplitude of the synthesized signal, must be positive.
    pub volume: i32,
    pub edge: EdgeMode,
    pub waveform: Waveform,
}

/// Synthesizes PCM samples from pulse lengths in tape clock units.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TapeDecoder {
    synth: PulseSynth,
    overflow: OverflowDecoder,
}

impl Default for TapeConfig {
    fn default() -> Self {
        TapeConfig { clock: ClockModel::default(), sample_rate: DEFAULT_SAMPLE_RATE }
    }
}

impl TapeConfig {
    pub fn with_clock(mut self, clock: ClockModel) -> Self {
        self.clock = clock;
        self
    }
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
    /// Returns the scale of the configured clock.
    pub fn scale(&self) -> Result<ClockScale, ConfigError> {
        self.clock.scale(self.sample_rate)
    }
}

impl TapeEncoder {
    /// Creates a new encoder.
    ///
    /// Returns an error if the sample rate is zero.
    pub fn new(config: EncoderConfig, tape: TapeConfig) -> Result<Self, ConfigError> {
        let codec = OverflowCodec::new(tape.scale()?);
        Ok(TapeEncoder {
            encoder: PulseEncoder::new(config),
            codec,
            pending: OverflowUnits::default()
        })
    }
    /// Returns a reference to the pulse encoder.
    pub fn encoder(&self) -> &PulseEncoder {
        &self.encoder
    }
    /// Returns a reference to the overflow codec.
    pub fn codec(&self) -> &OverflowCodec {
        &self.codec
    }
    /// Returns the clock configuration.
    pub fn tape_config(&self) -> TapeConfig {
        let scale = self.codec.scale();
        TapeConfig { clock: scale.model(), sample_rate: scale.sample_rate() }
    }
    /// Returns the number of samples consumed since the tracker was primed.
    pub fn position(&self) -> u32 {
        self.encoder.position()
    }
    /// Returns the value of the last accepted maximum.
    pub fn last_peak(&self) -> i32 {
        self.encoder.last_peak()
    }
    /// Changes the clock model from the selector codes found in the tape archive headers.
    ///
    /// Pulses found from now on are converted with the new clock. On error the current
    /// clock is kept.
    pub fn set_machine(&mut self, machine: u8, video: u8) -> Result<(), ConfigError> {
        let clock = ClockModel::try_from_codes(machine, video)?;
        let scale = clock.scale(self.codec.scale().sample_rate())?;
        debug!("encoder clock: {}", clock);
        self.codec = OverflowCodec::new(scale);
        Ok(())
    }
    /// Restarts tracking and drops units not yet taken, preserving the configuration.
    pub fn reset(&mut self) {
        self.encoder.reset();
        self.pending = OverflowUnits::default();
    }
    /// Consumes `samples` until a pulse is found.
    ///
    /// Returns the number of consumed samples and the next unit, if found. The units of a
    /// pulse longer than an overflow unit are returned by the successive calls before any
    /// more samples are consumed.
    pub fn feed(&mut self, samples: &[i32]) -> (usize, Option<u32>) {
        if let Some(unit) = self.pending.next() {
            return (0, Some(unit));
        }
        let (consumed, pulse) = self.encoder.feed(samples);
        let unit = pulse.and_then(|pulse| {
            self.pending = self.codec.encode(pulse.get());
            self.pending.next()
        });
        (consumed, unit)
    }
    /// Returns an iterator of tape clock units found in `samples`.
    ///
    /// All the `samples` are consumed when the iterator is exhausted.
    pub fn units<'a>(&'a mut self, samples: &'a [i32]) -> Units<'a> {
        Units { encoder: self, samples }
    }
    /// Returns the units not taken yet followed by the units of the pulse since the last
    /// committed trigger and resets the encoder.
    pub fn flush(&mut self) -> Chain<OverflowUnits, OverflowUnits> {
        let pending = mem::take(&mut self.pending);
        pending.chain(self.codec.encode(self.encoder.flush()))
    }
}

impl Iterator for Units<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let (consumed, unit) = self.encoder.feed(self.samples);
        self.samples = &self.samples[consumed..];
        unit
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            clock: ClockModel::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            volume: 254 << 23,
            edge: EdgeMode::default(),
            waveform: Waveform::default(),
        }
    }
}

impl DecoderConfig {
    pub fn with_clock(mut self, clock: ClockModel) -> Self {
        self.clock = clock;
        self
    }
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
    pub fn with_volume(mut self, volume: i32) -> Self {
        self.volume = volume;
        self
    }
    pub fn with_edge(mut self, edge: EdgeMode) -> Self {
        self.edge = edge;
        self
    }
    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }
}

impl TapeDecoder {
    /// Creates a new decoder.
    ///
    /// Returns an error if the sample rate is zero or the volume is not positive.
    pub fn new(config: DecoderConfig) -> Result<Self, ConfigError> {
        let scale = config.clock.scale(config.sample_rate)?;
        let synth = PulseSynth::new(config.volume, config.edge, config.waveform)?;
        Ok(TapeDecoder { synth, overflow: OverflowCodec::new(scale).decoder() })
    }
    /// Returns a reference to the pulse synthesizer.
    pub fn synth(&self) -> &PulseSynth {
        &self.synth
    }
    /// Returns the clock scale.
    pub fn scale(&self) -> &ClockScale {
        self.overflow.scale()
    }
    /// Returns the configuration.
    pub fn config(&self) -> DecoderConfig {
        let scale = self.overflow.scale();
        DecoderConfig {
            clock: scale.model(),
            sample_rate: scale.sample_rate(),
            volume: self.synth.volume(),
            edge: self.synth.edge(),
            waveform: self.synth.waveform(),
        }
    }
    /// Changes the clock model from the selector codes found in the tape archive headers.
    ///
    /// Overflow units received so far are dropped. On error the current clock is kept.
    pub fn set_machine(&mut self, machine: u8, video: u8) -> Result<(), ConfigError> {
        let clock = ClockModel::try_from_codes(machine, video)?;
        let scale = clock.scale(self.overflow.scale().sample_rate())?;
        debug!("decoder clock: {}", clock);
        self.overflow = OverflowCodec::new(scale).decoder();
        Ok(())
    }
    /// Loads the next pulse, dropping what's left of the current one.
    ///
    /// An overflow unit loads a hold of [ClockScale::overflow_samples] at the current
    /// polarity. The unit that ends the overflow chain loads the remainder of the pulse,
    /// which continues at the polarity held.
    pub fn set_pulse(&mut self, units: u32) {
        let held = self.overflow.held();
        match self.overflow.push(units) {
            Some(samples) => self.synth.set_pulse(samples.saturating_sub(held)),
            None => self.synth.hold(self.overflow.scale().overflow_samples())
        }
    }
    /// Fills `buffer` with samples of the current pulse.
    ///
    /// Returns the number of samples written. Once the current pulse has been synthesized
    /// `0` is returned until the next pulse is loaded.
    pub fn fill(&mut self, buffer: &mut [i32]) -> usize {
        self.synth.fill(buffer)
    }
    /// Drops the current pulse with the overflow units received so far and restores
    /// the initial polarity.
    pub fn reset(&mut self) {
        self.synth.reset();
        self.overflow.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapwave_core::clock::{Machine, VideoStandard, OVERFLOW_VALUE};
    use tapwave_core::signal::Polarity;

    #[test]
    fn tape_config_works() {
        let config = TapeConfig::default();
        assert_eq!(44100, config.sample_rate);
        assert_eq!(ClockModel::default(), config.clock);
        assert_eq!(Err(ConfigError::ZeroSampleRate),
                   TapeEncoder::new(EncoderConfig::default(), config.with_sample_rate(0)));
        let vic = ClockModel::new(Machine::Vic20, VideoStandard::Ntsc);
        let encoder = TapeEncoder::new(EncoderConfig::default(),
                                       config.with_clock(vic).with_sample_rate(48000)).unwrap();
        assert_eq!(TapeConfig { clock: vic, sample_rate: 48000 }, encoder.tape_config());
    }

    #[test]
    fn tape_encoder_set_machine_works() {
        let mut encoder = TapeEncoder::new(EncoderConfig::default(), TapeConfig::default()).unwrap();
        assert_eq!(Err(ConfigError::Machine(tapwave_core::clock::TryFromU8MachineError(3))),
                   encoder.set_machine(3, 0));
        assert_eq!(TapeConfig::default(), encoder.tape_config());
        encoder.set_machine(2, 1).unwrap();
        assert_eq!(ClockModel::new(Machine::C16, VideoStandard::Ntsc), encoder.tape_config().clock);
        assert_eq!(44100, encoder.tape_config().sample_rate);
    }

    #[test]
    fn tape_encoder_silence_works() {
        let mut encoder = TapeEncoder::new(EncoderConfig::default(), TapeConfig::default()).unwrap();
        let silence = vec![0; 1002];
        assert_eq!(0, encoder.units(&silence).count());
        assert_eq!(1000, encoder.position());
        assert_eq!(vec![22341], encoder.flush().collect::<Vec<_>>());
        assert_eq!(0, encoder.flush().count());
    }

    #[test]
    fn tape_encoder_overflows() {
        let mut encoder = TapeEncoder::new(EncoderConfig::default(), TapeConfig::default()).unwrap();
        let threshold = encoder.codec().overflow_samples() as usize;
        let v = 1 << 29;
        let mut signal = vec![0; 2];
        signal.extend(core::iter::repeat(v).take(10));
        signal.extend(core::iter::repeat(-v).take(10));
        signal.extend(core::iter::repeat(v).take(10));
        signal.extend(core::iter::repeat(-v).take(2 * threshold));
        signal.extend(core::iter::repeat(v).take(10));
        let units: Vec<u32> = encoder.units(&signal).collect();
        // first pulse spans from the start to the first rising edge
        assert_eq!(vec![447, OVERFLOW_VALUE, OVERFLOW_VALUE, 223], units);
        assert_eq!(vec![223], encoder.flush().collect::<Vec<_>>());
    }

    #[test]
    fn tape_encoder_flush_keeps_pending_units() {
        let mut encoder = TapeEncoder::new(EncoderConfig::default(), TapeConfig::default()).unwrap();
        let threshold = encoder.codec().overflow_samples() as usize;
        let v = 1 << 29;
        let mut signal = vec![0; 2];
        signal.extend(core::iter::repeat(v).take(10));
        signal.extend(core::iter::repeat(-v).take(10));
        signal.extend(core::iter::repeat(v).take(threshold - 10));
        signal.extend(core::iter::repeat(-v).take(10));
        signal.extend(core::iter::repeat(v).take(3));
        let (consumed, unit) = encoder.feed(&signal);
        assert_eq!(Some(447), unit);
        let (_, unit) = encoder.feed(&signal[consumed..]);
        assert_eq!(Some(OVERFLOW_VALUE), unit);
        assert_eq!(vec![0, 67], encoder.flush().collect::<Vec<_>>());
    }

    #[test]
    fn tape_decoder_holds_overflows() {
        for &edge in &[EdgeMode::Rising,
                       EdgeMode::Falling,
                       EdgeMode::Both(Polarity::Positive),
                       EdgeMode::Both(Polarity::Negative)]
        {
            let config = DecoderConfig::default().with_volume(1000).with_edge(edge);
            let mut decoder = TapeDecoder::new(config).unwrap();
            let threshold = decoder.scale().overflow_samples();
            let mut buf = vec![0; 100_000];
            // leave the initial polarity behind with a complete pulse
            decoder.set_pulse(2234);
            while decoder.fill(&mut buf) != 0 {}
            let polarity = decoder.synth().polarity();
            for _ in 0..2 {
                decoder.set_pulse(OVERFLOW_VALUE);
                let mut written = 0;
                loop {
                    let len = decoder.fill(&mut buf);
                    if len == 0 {
                        break;
                    }
                    assert!(buf[..len].iter().all(|&s| s == polarity.apply(1000)), "{:?}", edge);
                    written += len as u32;
                }
                assert_eq!(threshold, written);
                assert_eq!(polarity, decoder.synth().polarity());
            }
            assert_eq!(2 * threshold, decoder.overflow.held());
            decoder.set_pulse(2234);
            assert_eq!(0, decoder.overflow.held());
            assert_eq!(100, decoder.synth().remaining());
            assert_eq!(100, decoder.fill(&mut buf));
            assert_eq!(polarity.apply(1000), buf[0]);
            if edge.is_semiwave() {
                assert!(buf[..100].iter().all(|&s| s == polarity.apply(1000)));
                assert_eq!(!polarity, decoder.synth().polarity());
            }
            else {
                assert!(buf[..50].iter().all(|&s| s == polarity.apply(1000)));
                assert!(buf[50..100].iter().all(|&s| s == (!polarity).apply(1000)));
                assert_eq!(polarity, decoder.synth().polarity());
            }
        }
    }

    #[test]
    fn tape_decoder_works() {
        assert_eq!(Err(ConfigError::NonPositiveVolume(0)),
                   TapeDecoder::new(DecoderConfig::default().with_volume(0)));
        assert_eq!(Err(ConfigError::ZeroSampleRate),
                   TapeDecoder::new(DecoderConfig::default().with_sample_rate(0)));
        let config = DecoderConfig::default().with_volume(1000);
        let mut decoder = TapeDecoder::new(config).unwrap();
        assert_eq!(config, decoder.config());
        let mut buf = [0; 256];
        decoder.set_pulse(2234);
        assert_eq!(100, decoder.fill(&mut buf));
        assert_eq!(0, decoder.fill(&mut buf));
        assert!(buf[..50].iter().all(|&s| s == 1000));
        assert!(buf[50..100].iter().all(|&s| s == -1000));
        decoder.set_pulse(OVERFLOW_VALUE);
        assert_eq!(decoder.scale().overflow_samples(), decoder.synth().remaining());
        decoder.set_pulse(0);
        assert!(decoder.synth().is_done());
        decoder.set_pulse(OVERFLOW_VALUE);
        decoder.reset();
        assert!(decoder.synth().is_done());
        assert_eq!(0, decoder.fill(&mut buf));
        assert_eq!(Err(ConfigError::VideoStandard(tapwave_core::clock::TryFromU8VideoStandardError(2))),
                   decoder.set_machine(0, 2));
        decoder.set_machine(1, 0).unwrap();
        assert_eq!(1_108_405, decoder.scale().model().clock_hz());
        assert_eq!(config.with_clock(ClockModel::new(Machine::Vic20, VideoStandard::Pal)),
                   decoder.config());
    }
}
