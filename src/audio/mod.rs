// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Audio device discovery and configuration application.

pub mod apply;
pub mod device;
pub mod pactl;

pub use apply::{ApplyError, ApplyPhase, ConfigWriter, GlobalAudioConfig, SavedClock};
pub use device::{AudioDevice, DeviceRole, SampleFormat, DEFAULT_SAMPLE_RATES, QUANTUM_CHOICES};
