/*
    Copyright (C) 2020-2024  Rafal Michalski

    This file is part of TAPWAVE, a Rust library for converting tape signals.

    For the full copyright notice, see the lib.rs file.
*/
use core::f64::consts::PI;

use tapwave_core::signal::Waveform;

/// Returns the positive amplitude of the sample at `elapsed` of a semiwave `len` samples long.
///
/// `elapsed` must be less than `len`.
pub fn semiwave_sample(waveform: Waveform, elapsed: u32, len: u32, volume: i32) -> i32 {
    match waveform {
        Waveform::Square => volume,
        Waveform::Triangle => {
            let ramp = if elapsed < len / 2 { elapsed + 1 } else { len - 1 - elapsed };
            (i64::from(ramp) * i64::from(volume) * 2 / i64::from(len)) as i32
        }
        Waveform::Sine => {
            let angle = PI * f64::from(elapsed + 1) / f64::from(len);
            (f64::from(volume) * angle.sin()) as i32
        }
    }
}
