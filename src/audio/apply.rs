// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration writer: persists the chosen audio settings and restarts
//! the audio stack.
//!
//! Three files are regenerated wholesale under the user config dir on every
//! apply - a PipeWire clock/quantum drop-in, a JACK latency drop-in and a
//! WirePlumber per-device rule file. There is no merging with existing
//! content and no rollback: a restart failure after a successful write
//! leaves the new files in place, which is what the next load reads back.

use crate::audio::device::{AudioDevice, SampleFormat};
use crate::command;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Services restarted after a successful write, in order: the audio daemon,
/// the PulseAudio compatibility daemon, the device-policy daemon.
pub const AUDIO_SERVICES: [&str; 3] = ["pipewire", "pipewire-pulse", "wireplumber"];

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("Sample rate and buffer size are required")]
    MissingFields,
    #[error("No user configuration directory")]
    NoConfigDir,
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Service restart failed: {0}")]
    Restart(String),
}

/// Process-wide audio settings the user picked in the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalAudioConfig {
    pub sample_rate: u32,
    /// Buffer size in frames.
    pub quantum: u32,
    pub format: SampleFormat,
    /// Device identifiers to make the service defaults, if the user chose.
    pub default_output: Option<String>,
    pub default_input: Option<String>,
}

impl Default for GlobalAudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            quantum: 256,
            format: SampleFormat::F32,
            default_output: None,
            default_input: None,
        }
    }
}

impl GlobalAudioConfig {
    /// Fails closed when required scalar settings are absent.
    pub fn validate(&self) -> Result<(), ApplyError> {
        if self.sample_rate == 0 || self.quantum == 0 {
            return Err(ApplyError::MissingFields);
        }
        Ok(())
    }
}

/// Progress of one apply action, surfaced to the window as it happens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ApplyPhase {
    #[default]
    Idle,
    Validating,
    Writing,
    Restarting,
    Success,
    Failed(String),
}

/// Clock settings recovered from a previously written drop-in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SavedClock {
    pub rate: Option<u32>,
    pub quantum: Option<u32>,
}

/// Writes the generated configuration files and drives the apply pipeline.
pub struct ConfigWriter {
    config_root: PathBuf,
}

impl ConfigWriter {
    /// Writer rooted at the user's config directory (`~/.config`).
    pub fn new() -> Result<Self, ApplyError> {
        let root = dirs::config_dir().ok_or(ApplyError::NoConfigDir)?;
        Ok(Self::with_root(root))
    }

    /// Writer rooted at an arbitrary directory (used by tests).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            config_root: root.into(),
        }
    }

    pub fn pipewire_conf_path(&self) -> PathBuf {
        self.config_root
            .join("pipewire/pipewire.conf.d/99-custom.conf")
    }

    pub fn jack_conf_path(&self) -> PathBuf {
        self.config_root
            .join("pipewire/jack.conf.d/99-jack-custom.conf")
    }

    pub fn wireplumber_lua_path(&self) -> PathBuf {
        self.config_root
            .join("wireplumber/main.lua.d/99-device-config.lua")
    }

    /// Read rate and quantum back from the PipeWire drop-in, so a freshly
    /// opened panel starts from what was last applied. Missing file or
    /// unparsable lines yield `None` fields.
    pub fn read_saved_clock(&self) -> SavedClock {
        match fs::read_to_string(self.pipewire_conf_path()) {
            Ok(content) => parse_saved_clock(&content),
            Err(_) => SavedClock::default(),
        }
    }

    /// Write all three generated files. Stops at the first failure; files
    /// already written stay on disk.
    pub fn write_all(
        &self,
        config: &GlobalAudioConfig,
        devices: &[AudioDevice],
    ) -> Result<(), ApplyError> {
        self.write_file(&self.pipewire_conf_path(), &render_pipewire_conf(config))?;
        self.write_file(&self.jack_conf_path(), &render_jack_conf(config))?;
        self.write_file(
            &self.wireplumber_lua_path(),
            &render_wireplumber_rules(config, devices),
        )?;
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<(), ApplyError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ApplyError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ApplyError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Wrote {}", path.display());
        Ok(())
    }

    /// Run the full apply pipeline:
    /// `Idle -> Validating -> Writing -> Restarting -> {Success, Failed}`.
    ///
    /// Phase transitions are reported through `on_phase` so the window can
    /// show progress. Default-device selection runs between writing and
    /// restarting; its failure is logged and does not fail the apply.
    pub fn apply(
        &self,
        config: &GlobalAudioConfig,
        devices: &[AudioDevice],
        on_phase: &mut dyn FnMut(ApplyPhase),
    ) -> Result<(), ApplyError> {
        self.apply_with_restarter(config, devices, on_phase, restart_audio_services)
    }

    /// Apply with an injected restart step; `apply` wires in the real
    /// `systemctl` calls.
    pub fn apply_with_restarter(
        &self,
        config: &GlobalAudioConfig,
        devices: &[AudioDevice],
        on_phase: &mut dyn FnMut(ApplyPhase),
        restarter: impl FnOnce() -> Result<(), String>,
    ) -> Result<(), ApplyError> {
        on_phase(ApplyPhase::Validating);
        if let Err(e) = config.validate() {
            // Fails closed: no files touched, back to idle.
            on_phase(ApplyPhase::Idle);
            return Err(e);
        }

        on_phase(ApplyPhase::Writing);
        if let Err(e) = self.write_all(config, devices) {
            on_phase(ApplyPhase::Failed(e.to_string()));
            return Err(e);
        }

        // Independent of file writes and of the restart below.
        apply_default_devices(config);

        on_phase(ApplyPhase::Restarting);
        if let Err(msg) = restarter() {
            // Files stay on disk with the new values.
            on_phase(ApplyPhase::Failed(msg.clone()));
            return Err(ApplyError::Restart(msg));
        }

        on_phase(ApplyPhase::Success);
        Ok(())
    }
}

/// Issue the `pactl set-default-*` calls for any chosen defaults.
fn apply_default_devices(config: &GlobalAudioConfig) {
    use crate::audio::device::DeviceRole;
    use crate::audio::pactl::set_default_device;

    if let Some(ref output) = config.default_output {
        if let Err(e) = set_default_device(DeviceRole::Output, output) {
            warn!("Could not set default output: {}", e);
        }
    }
    if let Some(ref input) = config.default_input {
        if let Err(e) = set_default_device(DeviceRole::Input, input) {
            warn!("Could not set default input: {}", e);
        }
    }
}

/// Restart the audio stack via the user service manager. All services are
/// attempted; the first failure is reported.
pub fn restart_audio_services() -> Result<(), String> {
    let mut first_failure = None;

    for service in AUDIO_SERVICES {
        let out = command::run("systemctl", &["--user", "restart", service]);
        if out.success() {
            info!("Restarted {}", service);
        } else {
            warn!("Could not restart {}: {}", service, out.error_text());
            if first_failure.is_none() {
                first_failure = Some(format!("{}: {}", service, out.error_text()));
            }
        }
    }

    match first_failure {
        None => Ok(()),
        Some(msg) => Err(msg),
    }
}

/// Render the PipeWire clock drop-in.
pub fn render_pipewire_conf(config: &GlobalAudioConfig) -> String {
    format!(
        "\
# miloOS Audio Configuration
context.properties = {{
    default.clock.rate          = {rate}
    default.clock.allowed-rates = [ {rate} ]
    default.clock.quantum       = {quantum}
    default.clock.min-quantum   = {quantum}
    default.clock.max-quantum   = {quantum}
    default.audio.format        = {format}
}}
",
        rate = config.sample_rate,
        quantum = config.quantum,
        format = config.format.as_pipewire(),
    )
}

/// Render the JACK latency drop-in, `<buffer>/<rate>`.
pub fn render_jack_conf(config: &GlobalAudioConfig) -> String {
    format!(
        "\
# miloOS JACK Configuration
jack.properties = {{
    node.latency = {}/{}
}}
",
        config.quantum, config.sample_rate
    )
}

/// Render the WirePlumber rule file: one rule per device, applying the
/// chosen format, rate and period size to that node.
pub fn render_wireplumber_rules(config: &GlobalAudioConfig, devices: &[AudioDevice]) -> String {
    let mut lua = String::from("-- miloOS per-device audio configuration\n");

    for device in devices {
        let pattern = escape_lua_pattern(&device.identifier);
        // write! to String cannot fail.
        let _ = write!(
            lua,
            "\
rule = {{
  matches = {{
    {{
      {{ \"node.name\", \"matches\", \"{pattern}\" }},
    }},
  }},
  apply_properties = {{
    [\"audio.format\"] = \"{format}\",
    [\"audio.rate\"] = {rate},
    [\"api.alsa.period-size\"] = {quantum},
  }},
}}
table.insert(alsa_monitor.rules, rule)
",
            pattern = pattern,
            format = config.format.as_pipewire(),
            rate = config.sample_rate,
            quantum = config.quantum,
        );
    }

    lua
}

/// Escape Lua pattern magic characters in a device name so it matches
/// literally inside a WirePlumber `matches` clause.
pub fn escape_lua_pattern(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(
            c,
            '^' | '$' | '(' | ')' | '%' | '.' | '[' | ']' | '*' | '+' | '-' | '?'
        ) {
            escaped.push('%');
        }
        escaped.push(c);
    }
    escaped
}

/// Parse rate and quantum out of a previously generated PipeWire drop-in.
pub fn parse_saved_clock(content: &str) -> SavedClock {
    let mut saved = SavedClock::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        match key {
            "default.clock.rate" => saved.rate = value.parse().ok(),
            "default.clock.quantum" => saved.quantum = value.parse().ok(),
            _ => {}
        }
    }

    saved
}
