// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Audio device model shared by the loader and the configuration panel.

use serde::{Deserialize, Serialize};

/// Sample rates offered when the server reports none for a device.
pub const DEFAULT_SAMPLE_RATES: [u32; 5] = [44100, 48000, 88200, 96000, 192000];

/// Quantum (buffer size) choices in frames.
pub const QUANTUM_CHOICES: [u32; 6] = [32, 64, 128, 256, 512, 1024];

/// Whether a device plays or captures audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceRole {
    Output,
    Input,
}

impl DeviceRole {
    /// The pactl object this role lists.
    pub fn pactl_object(&self) -> &'static str {
        match self {
            DeviceRole::Output => "sinks",
            DeviceRole::Input => "sources",
        }
    }

    /// The record boundary marker in `pactl list` output.
    pub fn block_marker(&self) -> &'static str {
        match self {
            DeviceRole::Output => "Sink #",
            DeviceRole::Input => "Source #",
        }
    }
}

/// Sample format of an audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    /// 16-bit signed integer.
    S16,
    /// 24-bit signed integer.
    S24,
    /// 32-bit signed integer.
    S32,
    /// 32-bit float.
    F32,
}

impl SampleFormat {
    /// All formats, used as the fallback capability set.
    pub fn all() -> &'static [SampleFormat] {
        &[
            SampleFormat::S16,
            SampleFormat::S24,
            SampleFormat::S32,
            SampleFormat::F32,
        ]
    }

    /// Parse the format token of a pactl sample specification
    /// (e.g. `s16le`, `float32le`).
    pub fn from_pactl(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        if s.starts_with("s16") {
            Some(SampleFormat::S16)
        } else if s.starts_with("s24") {
            Some(SampleFormat::S24)
        } else if s.starts_with("s32") {
            Some(SampleFormat::S32)
        } else if s.starts_with("f32") || s.starts_with("float32") {
            Some(SampleFormat::F32)
        } else {
            None
        }
    }

    /// PipeWire config spelling (`default.clock.format`, wireplumber rules).
    pub fn as_pipewire(&self) -> &'static str {
        match self {
            SampleFormat::S16 => "S16LE",
            SampleFormat::S24 => "S24LE",
            SampleFormat::S32 => "S32LE",
            SampleFormat::F32 => "F32LE",
        }
    }

    /// Human-readable label for combo boxes.
    pub fn display_name(&self) -> &'static str {
        match self {
            SampleFormat::S16 => "16-bit integer",
            SampleFormat::S24 => "24-bit integer",
            SampleFormat::S32 => "32-bit integer",
            SampleFormat::F32 => "32-bit float",
        }
    }
}

/// One audio sink or source discovered from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioDevice {
    /// Opaque handle the audio service knows this device by.
    pub identifier: String,
    /// Human-readable label.
    pub display_name: String,
    pub role: DeviceRole,
    pub channel_count: u32,
    pub supported_rates: Vec<u32>,
    pub supported_formats: Vec<SampleFormat>,
    pub current_rate: u32,
    pub current_format: SampleFormat,
    /// True if the server reports this device as the current default.
    pub is_default: bool,
}

impl AudioDevice {
    /// A device with every field at its documented fallback.
    pub fn new(identifier: String, role: DeviceRole) -> Self {
        Self {
            display_name: identifier.clone(),
            identifier,
            role,
            channel_count: 2,
            supported_rates: DEFAULT_SAMPLE_RATES.to_vec(),
            supported_formats: SampleFormat::all().to_vec(),
            current_rate: DEFAULT_SAMPLE_RATES[0],
            current_format: SampleFormat::all()[0],
            is_default: false,
        }
    }

    /// Whether the device name marks it as a USB device.
    pub fn is_usb(&self) -> bool {
        let combined = format!("{} {}", self.identifier, self.display_name).to_lowercase();
        combined.contains("usb")
    }

    /// Monitor pseudo-sources are loopback taps of a sink, not real inputs.
    pub fn is_monitor(&self) -> bool {
        self.identifier.ends_with(".monitor")
    }
}

/// Sort a device list for presentation: USB devices first, ties broken by
/// display name ascending.
pub fn sort_for_display(devices: &mut [AudioDevice]) {
    devices.sort_by(|a, b| {
        let rank = |d: &AudioDevice| if d.is_usb() { 0u8 } else { 1u8 };
        rank(a)
            .cmp(&rank(b))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_pactl() {
        assert_eq!(SampleFormat::from_pactl("s16le"), Some(SampleFormat::S16));
        assert_eq!(SampleFormat::from_pactl("S24LE"), Some(SampleFormat::S24));
        assert_eq!(SampleFormat::from_pactl("s32be"), Some(SampleFormat::S32));
        assert_eq!(
            SampleFormat::from_pactl("float32le"),
            Some(SampleFormat::F32)
        );
        assert_eq!(SampleFormat::from_pactl("ulaw"), None);
    }

    #[test]
    fn test_new_device_gets_fallbacks() {
        let dev = AudioDevice::new("alsa.card_0".to_string(), DeviceRole::Output);
        assert_eq!(dev.supported_rates, DEFAULT_SAMPLE_RATES.to_vec());
        assert_eq!(dev.current_rate, 44100);
        assert_eq!(dev.supported_formats.len(), 4);
        assert!(!dev.is_default);
    }

    #[test]
    fn test_monitor_detection() {
        let dev = AudioDevice::new(
            "alsa_output.pci-0000.analog-stereo.monitor".to_string(),
            DeviceRole::Input,
        );
        assert!(dev.is_monitor());

        let dev = AudioDevice::new("alsa_input.usb-mic".to_string(), DeviceRole::Input);
        assert!(!dev.is_monitor());
    }

    #[test]
    fn test_usb_sorts_first() {
        let mut devices = vec![
            AudioDevice {
                display_name: "Built-in Audio".to_string(),
                ..AudioDevice::new("alsa_output.pci-0000".to_string(), DeviceRole::Output)
            },
            AudioDevice {
                display_name: "USB Headset".to_string(),
                ..AudioDevice::new("alsa_output.usb-Logitech".to_string(), DeviceRole::Output)
            },
        ];
        sort_for_display(&mut devices);
        assert_eq!(devices[0].display_name, "USB Headset");
        assert_eq!(devices[1].display_name, "Built-in Audio");
    }

    #[test]
    fn test_sort_ties_break_by_name() {
        let mut devices = vec![
            AudioDevice {
                display_name: "Zeta Audio".to_string(),
                ..AudioDevice::new("alsa_output.z".to_string(), DeviceRole::Output)
            },
            AudioDevice {
                display_name: "Alpha Audio".to_string(),
                ..AudioDevice::new("alsa_output.a".to_string(), DeviceRole::Output)
            },
        ];
        sort_for_display(&mut devices);
        assert_eq!(devices[0].display_name, "Alpha Audio");
    }
}
