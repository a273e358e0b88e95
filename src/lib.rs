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
/*! # TAPWAVE

A library for converting cassette tape signals of 8-bit home computers, as mono PCM samples,
to pulse lengths in the machine's tape clock cycles and back.

* [encoding] finds pulses in the signal with an adaptive trigger.
* [decoding] synthesizes square, triangle or sine waves from pulses.
* [overflow] splits pulses too long for a single tape unit.
* [tape] combines the above with the [clock] model of the machine.

Enable the `snapshot` feature (on by default) to serialize the complete state of encoders
and decoders with [serde](https://crates.io/crates/serde).
*/
pub use tapwave_core::{clock, error, signal};
pub use tapwave_pulse::{decoding, encoding, overflow, tape};
