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
//! The core components of the TAPWAVE library.
//!
//! Provides the tape clock model of the supported 8-bit machines, the signal
//! polarity and waveform selectors and the configuration error type shared by
//! the encoders and decoders.
pub mod clock;
pub mod error;
pub mod signal;
