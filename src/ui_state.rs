// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Audio panel state and its view projection.
//!
//! The GTK window holds one [`AudioPanelState`], renders it through
//! [`AudioPanelState::render`] into plain choice lists with selected
//! indices, and feeds user actions back as [`PanelCommand`] values through
//! [`dispatch`]. Everything here except `Refresh` and `Apply` is pure, so
//! the selection logic is testable without a running audio server.

use crate::audio::apply::{ApplyError, ApplyPhase, ConfigWriter, GlobalAudioConfig};
use crate::audio::device::{AudioDevice, DeviceRole, SampleFormat, DEFAULT_SAMPLE_RATES, QUANTUM_CHOICES};
use crate::audio::pactl;

/// Everything the audio panel window needs to render itself.
#[derive(Debug, Clone, Default)]
pub struct AudioPanelState {
    /// Outputs and inputs together, each list pre-sorted for display.
    pub devices: Vec<AudioDevice>,
    pub config: GlobalAudioConfig,
    pub phase: ApplyPhase,
}

/// One combo box: display labels plus the highlighted row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceList {
    pub labels: Vec<String>,
    pub selected: usize,
}

/// The rendered panel: five choice lists, nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPanelView {
    pub rate_choices: ChoiceList,
    pub quantum_choices: ChoiceList,
    pub format_choices: ChoiceList,
    pub output_choices: ChoiceList,
    pub input_choices: ChoiceList,
}

/// User actions the panel window can dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    /// Re-query the server for devices and defaults.
    Refresh,
    SelectRate(usize),
    SelectQuantum(usize),
    SelectFormat(usize),
    SelectOutput(usize),
    SelectInput(usize),
    /// Write config files, set defaults and restart the audio services.
    Apply,
}

impl AudioPanelState {
    /// Fresh state seeded from the values saved by a previous apply, if
    /// the config file is still on disk.
    pub fn new(writer: &ConfigWriter) -> Self {
        let mut config = GlobalAudioConfig::default();
        let saved = writer.read_saved_clock();
        if let Some(rate) = saved.rate {
            config.sample_rate = rate;
        }
        if let Some(quantum) = saved.quantum {
            config.quantum = quantum;
        }

        Self {
            devices: Vec::new(),
            config,
            phase: ApplyPhase::Idle,
        }
    }

    /// Replace the device lists. Chosen defaults that no longer resolve to
    /// a device are dropped so `Apply` never targets a vanished device.
    pub fn set_devices(&mut self, devices: Vec<AudioDevice>) {
        self.devices = devices;

        let gone = |chosen: &Option<String>, role: DeviceRole| {
            chosen.as_ref().is_some_and(|id| {
                !self
                    .devices
                    .iter()
                    .any(|d| d.role == role && d.identifier == *id)
            })
        };
        if gone(&self.config.default_output, DeviceRole::Output) {
            self.config.default_output = None;
        }
        if gone(&self.config.default_input, DeviceRole::Input) {
            self.config.default_input = None;
        }
    }

    pub fn outputs(&self) -> Vec<&AudioDevice> {
        self.devices
            .iter()
            .filter(|d| d.role == DeviceRole::Output)
            .collect()
    }

    pub fn inputs(&self) -> Vec<&AudioDevice> {
        self.devices
            .iter()
            .filter(|d| d.role == DeviceRole::Input)
            .collect()
    }

    /// Project the state into choice lists for the window.
    pub fn render(&self) -> AudioPanelView {
        let rate_choices = ChoiceList {
            labels: DEFAULT_SAMPLE_RATES
                .iter()
                .map(|r| format!("{} Hz", r))
                .collect(),
            selected: DEFAULT_SAMPLE_RATES
                .iter()
                .position(|&r| r == self.config.sample_rate)
                .unwrap_or(0),
        };

        let quantum_choices = ChoiceList {
            labels: QUANTUM_CHOICES.iter().map(|q| q.to_string()).collect(),
            selected: QUANTUM_CHOICES
                .iter()
                .position(|&q| q == self.config.quantum)
                .unwrap_or(0),
        };

        let format_choices = ChoiceList {
            labels: SampleFormat::all()
                .iter()
                .map(|f| f.display_name().to_string())
                .collect(),
            selected: SampleFormat::all()
                .iter()
                .position(|&f| f == self.config.format)
                .unwrap_or(0),
        };

        AudioPanelView {
            rate_choices,
            quantum_choices,
            format_choices,
            output_choices: device_choices(&self.outputs(), &self.config.default_output),
            input_choices: device_choices(&self.inputs(), &self.config.default_input),
        }
    }
}

/// Build one device combo. The highlighted row is the user's explicit
/// choice when there is one, otherwise the device the server reports as
/// default, regardless of where sorting placed it.
fn device_choices(devices: &[&AudioDevice], chosen: &Option<String>) -> ChoiceList {
    let labels = devices.iter().map(|d| d.display_name.clone()).collect();

    let selected = chosen
        .as_ref()
        .and_then(|id| devices.iter().position(|d| d.identifier == *id))
        .or_else(|| devices.iter().position(|d| d.is_default))
        .unwrap_or(0);

    ChoiceList { labels, selected }
}

/// Handle one panel command. Selection commands with an out-of-range index
/// are ignored; only `Apply` can fail.
pub fn dispatch(
    state: &mut AudioPanelState,
    command: PanelCommand,
    writer: &ConfigWriter,
) -> Result<(), ApplyError> {
    match command {
        PanelCommand::Refresh => {
            let mut devices = pactl::load_devices(DeviceRole::Output);
            devices.extend(pactl::load_devices(DeviceRole::Input));
            state.set_devices(devices);
        }
        PanelCommand::SelectRate(i) => {
            if let Some(&rate) = DEFAULT_SAMPLE_RATES.get(i) {
                state.config.sample_rate = rate;
            }
        }
        PanelCommand::SelectQuantum(i) => {
            if let Some(&quantum) = QUANTUM_CHOICES.get(i) {
                state.config.quantum = quantum;
            }
        }
        PanelCommand::SelectFormat(i) => {
            if let Some(&format) = SampleFormat::all().get(i) {
                state.config.format = format;
            }
        }
        PanelCommand::SelectOutput(i) => {
            let id = state.outputs().get(i).map(|d| d.identifier.clone());
            if id.is_some() {
                state.config.default_output = id;
            }
        }
        PanelCommand::SelectInput(i) => {
            let id = state.inputs().get(i).map(|d| d.identifier.clone());
            if id.is_some() {
                state.config.default_input = id;
            }
        }
        PanelCommand::Apply => {
            let AudioPanelState {
                devices,
                config,
                phase,
            } = state;
            return writer.apply(config, devices, &mut |p| *phase = p);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(id: &str, name: &str, is_default: bool) -> AudioDevice {
        AudioDevice {
            display_name: name.to_string(),
            is_default,
            ..AudioDevice::new(id.to_string(), DeviceRole::Output)
        }
    }

    fn input(id: &str, name: &str, is_default: bool) -> AudioDevice {
        AudioDevice {
            display_name: name.to_string(),
            is_default,
            ..AudioDevice::new(id.to_string(), DeviceRole::Input)
        }
    }

    fn panel_state() -> AudioPanelState {
        let mut state = AudioPanelState::default();
        state.set_devices(vec![
            output("alsa_output.usb-Focusrite", "USB Interface", false),
            output("alsa_output.pci-0000", "Built-in Audio", true),
            input("alsa_input.pci-0000", "Built-in Microphone", true),
        ]);
        state
    }

    #[test]
    fn test_default_device_highlighted_regardless_of_position() {
        // The USB device sorts first but the built-in one is default.
        let view = panel_state().render();
        assert_eq!(
            view.output_choices.labels,
            vec!["USB Interface", "Built-in Audio"]
        );
        assert_eq!(view.output_choices.selected, 1);
        assert_eq!(view.input_choices.selected, 0);
    }

    #[test]
    fn test_explicit_choice_wins_over_server_default() {
        let mut state = panel_state();
        dispatch(
            &mut state,
            PanelCommand::SelectOutput(0),
            &ConfigWriter::with_root("/nonexistent"),
        )
        .unwrap();
        assert_eq!(
            state.config.default_output.as_deref(),
            Some("alsa_output.usb-Focusrite")
        );
        assert_eq!(state.render().output_choices.selected, 0);
    }

    #[test]
    fn test_out_of_range_selection_ignored() {
        let mut state = panel_state();
        let writer = ConfigWriter::with_root("/nonexistent");
        dispatch(&mut state, PanelCommand::SelectOutput(99), &writer).unwrap();
        assert_eq!(state.config.default_output, None);
        dispatch(&mut state, PanelCommand::SelectRate(99), &writer).unwrap();
        assert_eq!(state.config.sample_rate, 48000);
    }

    #[test]
    fn test_rate_and_quantum_selection() {
        let mut state = panel_state();
        let writer = ConfigWriter::with_root("/nonexistent");
        dispatch(&mut state, PanelCommand::SelectRate(3), &writer).unwrap();
        dispatch(&mut state, PanelCommand::SelectQuantum(0), &writer).unwrap();
        assert_eq!(state.config.sample_rate, 96000);
        assert_eq!(state.config.quantum, 32);

        let view = state.render();
        assert_eq!(view.rate_choices.selected, 3);
        assert_eq!(view.rate_choices.labels[3], "96000 Hz");
        assert_eq!(view.quantum_choices.selected, 0);
    }

    #[test]
    fn test_vanished_chosen_device_dropped() {
        let mut state = panel_state();
        state.config.default_output = Some("alsa_output.usb-Focusrite".to_string());
        state.set_devices(vec![output("alsa_output.pci-0000", "Built-in Audio", true)]);
        assert_eq!(state.config.default_output, None);
    }

    #[test]
    fn test_render_empty_device_lists() {
        let state = AudioPanelState::default();
        let view = state.render();
        assert!(view.output_choices.labels.is_empty());
        assert_eq!(view.output_choices.selected, 0);
    }

    #[test]
    fn test_new_state_seeds_from_saved_clock() {
        use std::fs;
        let dir = tempfile::TempDir::new().unwrap();
        let writer = ConfigWriter::with_root(dir.path());
        let conf_dir = dir.path().join("pipewire/pipewire.conf.d");
        fs::create_dir_all(&conf_dir).unwrap();
        fs::write(
            conf_dir.join("99-custom.conf"),
            "context.properties = {\n    default.clock.rate          = 96000\n    default.clock.quantum       = 128\n}\n",
        )
        .unwrap();

        let state = AudioPanelState::new(&writer);
        assert_eq!(state.config.sample_rate, 96000);
        assert_eq!(state.config.quantum, 128);
    }
}
