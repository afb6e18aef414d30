// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Device discovery via `pactl` and its block-structured text output.
//!
//! `pactl list sinks` prints one record per device, delimited by a
//! `Sink #N` header, with indented `Key: value` lines inside. The parser is
//! a line-oriented scan over that shape; every field that fails to parse
//! falls back to the documented default so a weird pactl never aborts a
//! load. The functions that actually invoke `pactl` live at the bottom and
//! return an empty list when the binary is missing or exits non-zero - the
//! panel shows a "no devices" state for that.

use crate::audio::device::{sort_for_display, AudioDevice, DeviceRole, SampleFormat};
use crate::command;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Parsed `Sample Specification:` line, e.g. `s16le 2ch 44100Hz`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleSpec {
    pub format: Option<SampleFormat>,
    pub channels: Option<u32>,
    pub rate: Option<u32>,
}

fn sample_spec_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\S+)\s+(\d+)ch\s+(\d+)\s*Hz\s*$").expect("static regex")
    })
}

/// Parse the value of a `Sample Specification:` line. Malformed input
/// yields an empty spec, never an error.
pub fn parse_sample_spec(value: &str) -> SampleSpec {
    let Some(caps) = sample_spec_re().captures(value) else {
        return SampleSpec::default();
    };

    SampleSpec {
        format: SampleFormat::from_pactl(&caps[1]),
        channels: caps[2].parse().ok(),
        rate: caps[3].parse().ok(),
    }
}

/// Working fields accumulated while scanning one device block.
#[derive(Debug, Default)]
struct DeviceBlock {
    name: Option<String>,
    description: Option<String>,
    spec: SampleSpec,
}

impl DeviceBlock {
    /// Finalize into a device, applying defaults for anything missing.
    /// Returns `None` for blocks without a name and for monitor inputs.
    fn finish(self, role: DeviceRole, seen: &mut HashSet<String>) -> Option<AudioDevice> {
        let name = self.name?;

        // Identifier uniqueness per role: first block wins.
        if !seen.insert(name.clone()) {
            debug!("Duplicate device identifier '{}', keeping first", name);
            return None;
        }

        let mut device = AudioDevice::new(name, role);
        if role == DeviceRole::Input && device.is_monitor() {
            return None;
        }

        if let Some(desc) = self.description {
            if !desc.is_empty() {
                device.display_name = desc;
            }
        }
        if let Some(channels) = self.spec.channels {
            if channels > 0 {
                device.channel_count = channels;
            }
        }
        if let Some(rate) = self.spec.rate {
            if rate > 0 {
                device.current_rate = rate;
                if !device.supported_rates.contains(&rate) {
                    device.supported_rates.push(rate);
                    device.supported_rates.sort_unstable();
                }
            }
        }
        if let Some(format) = self.spec.format {
            device.current_format = format;
        }

        Some(device)
    }
}

/// Parse full `pactl list sinks` / `pactl list sources` output into devices.
///
/// One device per `Sink #`/`Source #` block; monitor pseudo-sources are
/// dropped from the input role.
pub fn parse_device_list(output: &str, role: DeviceRole) -> Vec<AudioDevice> {
    let marker = role.block_marker();
    let mut devices = Vec::new();
    let mut seen = HashSet::new();
    let mut current: Option<DeviceBlock> = None;

    for line in output.lines() {
        if line.trim_start().starts_with(marker) {
            if let Some(block) = current.take() {
                devices.extend(block.finish(role, &mut seen));
            }
            current = Some(DeviceBlock::default());
            continue;
        }

        let Some(ref mut block) = current else {
            continue;
        };

        let trimmed = line.trim();
        if let Some(value) = trimmed.strip_prefix("Name:") {
            block.name = Some(value.trim().to_string());
        } else if let Some(value) = trimmed.strip_prefix("Description:") {
            block.description = Some(value.trim().to_string());
        } else if let Some(value) = trimmed.strip_prefix("Sample Specification:") {
            block.spec = parse_sample_spec(value);
        }
    }

    if let Some(block) = current {
        devices.extend(block.finish(role, &mut seen));
    }

    devices
}

/// Parse `pactl get-default-sink`/`get-default-source` output: the device
/// name on the first non-empty line.
pub fn parse_default_name(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Load the current device list for one role.
///
/// Returns an empty list when `pactl` is unavailable or fails; the caller
/// renders that as a "no devices" state rather than an error.
pub fn load_devices(role: DeviceRole) -> Vec<AudioDevice> {
    let listing = command::run("pactl", &["list", role.pactl_object()]);
    if !listing.success() {
        warn!(
            "pactl list {} failed: {}",
            role.pactl_object(),
            listing.error_text()
        );
        return Vec::new();
    }

    let mut devices = parse_device_list(&listing.stdout, role);

    let default_cmd = match role {
        DeviceRole::Output => "get-default-sink",
        DeviceRole::Input => "get-default-source",
    };
    let default_out = command::run("pactl", &[default_cmd]);
    if default_out.success() {
        if let Some(default_name) = parse_default_name(&default_out.stdout) {
            for device in &mut devices {
                device.is_default = device.identifier == default_name;
            }
        }
    } else {
        debug!("pactl {} failed: {}", default_cmd, default_out.error_text());
    }

    sort_for_display(&mut devices);
    debug!("Loaded {} {:?} device(s)", devices.len(), role);
    devices
}

/// Make a device the service default for its role. Failure is independent
/// of any configuration file writes; the caller only logs it.
pub fn set_default_device(role: DeviceRole, identifier: &str) -> Result<(), String> {
    let subcommand = match role {
        DeviceRole::Output => "set-default-sink",
        DeviceRole::Input => "set-default-source",
    };

    let out = command::run("pactl", &[subcommand, identifier]);
    if out.success() {
        Ok(())
    } else {
        Err(format!(
            "pactl {} {} failed: {}",
            subcommand,
            identifier,
            out.error_text()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::device::DEFAULT_SAMPLE_RATES;

    const TWO_SINKS: &str = "\
Sink #43
	State: RUNNING
	Name: alsa_output.usb-Logitech_USB_Headset-00.analog-stereo
	Description: USB Headset
	Driver: PipeWire
	Sample Specification: s16le 2ch 48000Hz
	Channel Map: front-left,front-right

Sink #51
	State: SUSPENDED
	Name: alsa_output.pci-0000_00_1f.3.analog-stereo
	Description: Built-in Audio
	Driver: PipeWire
	Sample Specification: s32le 2ch 44100Hz
";

    const SOURCES_WITH_MONITOR: &str = "\
Source #44
	State: IDLE
	Name: alsa_output.pci-0000_00_1f.3.analog-stereo.monitor
	Description: Monitor of Built-in Audio
	Sample Specification: s16le 2ch 48000Hz

Source #45
	State: RUNNING
	Name: alsa_input.usb-Blue_Microphones_Yeti-00.analog-stereo
	Description: Yeti Stereo Microphone
	Sample Specification: s16le 2ch 44100Hz
";

    #[test]
    fn test_parse_sample_spec() {
        let spec = parse_sample_spec(" s16le 2ch 44100Hz");
        assert_eq!(spec.format, Some(SampleFormat::S16));
        assert_eq!(spec.channels, Some(2));
        assert_eq!(spec.rate, Some(44100));
    }

    #[test]
    fn test_parse_sample_spec_malformed() {
        assert_eq!(parse_sample_spec("garbage"), SampleSpec::default());
        assert_eq!(parse_sample_spec(""), SampleSpec::default());
        // Unknown format still yields channels and rate.
        let spec = parse_sample_spec("ulaw 1ch 8000Hz");
        assert_eq!(spec.format, None);
        assert_eq!(spec.channels, Some(1));
        assert_eq!(spec.rate, Some(8000));
    }

    #[test]
    fn test_one_device_per_block() {
        let devices = parse_device_list(TWO_SINKS, DeviceRole::Output);
        assert_eq!(devices.len(), 2);
        assert_eq!(
            devices[0].identifier,
            "alsa_output.usb-Logitech_USB_Headset-00.analog-stereo"
        );
        assert_eq!(devices[0].display_name, "USB Headset");
        assert_eq!(devices[0].current_rate, 48000);
        assert_eq!(devices[0].current_format, SampleFormat::S16);
        assert_eq!(devices[1].current_format, SampleFormat::S32);
        assert_eq!(devices[1].channel_count, 2);
    }

    #[test]
    fn test_monitor_sources_excluded() {
        let devices = parse_device_list(SOURCES_WITH_MONITOR, DeviceRole::Input);
        assert_eq!(devices.len(), 1);
        assert!(devices[0].identifier.contains("Blue_Microphones"));
        assert!(!devices.iter().any(|d| d.identifier.contains(".monitor")));
    }

    #[test]
    fn test_empty_and_malformed_output() {
        assert!(parse_device_list("", DeviceRole::Output).is_empty());
        assert!(parse_device_list("random noise\nmore noise", DeviceRole::Output).is_empty());
        // A block with no Name: line is discarded.
        assert!(parse_device_list("Sink #1\n\tState: RUNNING\n", DeviceRole::Output).is_empty());
    }

    #[test]
    fn test_missing_spec_falls_back() {
        let output = "Sink #7\n\tName: alsa_output.test\n\tDescription: Test Card\n";
        let devices = parse_device_list(output, DeviceRole::Output);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].supported_rates, DEFAULT_SAMPLE_RATES.to_vec());
        assert_eq!(devices[0].current_rate, 44100);
        assert_eq!(devices[0].channel_count, 2);
    }

    #[test]
    fn test_duplicate_identifiers_first_wins() {
        let output = "\
Sink #1
	Name: alsa_output.dup
	Description: First
Sink #2
	Name: alsa_output.dup
	Description: Second
";
        let devices = parse_device_list(output, DeviceRole::Output);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].display_name, "First");
    }

    #[test]
    fn test_parse_default_name() {
        assert_eq!(
            parse_default_name("alsa_output.pci-0000.analog-stereo\n"),
            Some("alsa_output.pci-0000.analog-stereo".to_string())
        );
        assert_eq!(parse_default_name("\n\n"), None);
        assert_eq!(parse_default_name(""), None);
    }

    #[test]
    fn test_usb_first_default_highlighted() {
        // Scenario from the panel: USB Headset sorts first but Built-in
        // Audio carries the default flag.
        let mut devices = parse_device_list(TWO_SINKS, DeviceRole::Output);
        let default_name = "alsa_output.pci-0000_00_1f.3.analog-stereo";
        for d in &mut devices {
            d.is_default = d.identifier == default_name;
        }
        sort_for_display(&mut devices);

        assert_eq!(devices[0].display_name, "USB Headset");
        assert!(!devices[0].is_default);
        assert_eq!(devices[1].display_name, "Built-in Audio");
        assert!(devices[1].is_default);
    }
}
