/*
    Copyright (C) 2020-2024  Rafal Michalski

    TAPWAVE is free software: you can redistribute it and/or modify it under
    the terms of the GNU Lesser General Public License (LGPL) as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    TAPWAVE is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Lesser General Public License for more details.

    You should have received a copy of the GNU Lesser General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.

    Author contact information: see Cargo.toml file, section [package.authors].
*/
/*! **TAPE** signal to pulse encoding and pulse to signal synthesis.

# Pulses

A tape signal recorded by 8-bit home computers is a sequence of square-ish waves.
The archived form of such a signal is a sequence of pulse lengths, each measured
between two consecutive trigger edges of the signal.

* [encoding::PulseEncoder] turns PCM samples into pulse lengths measured in samples.
* [decoding::PulseSynth] turns pulse lengths measured in samples back into PCM samples.
* [overflow::OverflowCodec] splits pulse lengths into units of the machine's tape clock,
  using escape units for pulses too long to fit a single unit.
* [tape::TapeEncoder] and [tape::TapeDecoder] combine the above, working directly
  with tape clock units.

```
use tapwave_core::signal::Waveform;
use tapwave_pulse::tape::*;
use tapwave_pulse::encoding::EncoderConfig;

let mut decoder = TapeDecoder::new(DecoderConfig::default()
                                   .with_waveform(Waveform::Square)
                                   .with_volume(1 << 29))?;
let mut encoder = TapeEncoder::new(EncoderConfig::default(), TapeConfig::default())?;

let mut signal = Vec::new();
let mut buf = [0i32; 64];
for &units in [400u32, 400, 800, 400].iter() {
    decoder.set_pulse(units);
    loop {
        let len = decoder.fill(&mut buf);
        if len == 0 { break }
        signal.extend_from_slice(&buf[..len]);
    }
}
let mut units: Vec<u32> = encoder.units(&signal).collect();
units.extend(encoder.flush());
assert_eq!(4, units.len());
# Ok::<(), tapwave_core::error::ConfigError>(())
```
*/
pub mod decoding;
pub mod encoding;
pub mod overflow;
pub mod tape;
