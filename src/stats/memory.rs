// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Memory module detection from `dmidecode -t memory` output.
//!
//! `dmidecode` prints one `Memory Device` section per DIMM slot with
//! indented `Key: value` lines. Empty slots report `No Module Installed`
//! and are skipped. Running it needs root, so the loader walks a chain of
//! escalation strategies and falls back to a generic placeholder built from
//! the total-memory figure when all of them fail.

use crate::command;
use crate::stats::history::format_bytes;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed-path helper script allowed through polkit for the monitor.
const DMIDECODE_HELPER: &str = "/usr/local/bin/sysstats-dmidecode-helper";

/// Values dmidecode uses for fields it could not determine.
const UNKNOWN_VALUES: [&str; 4] = ["Unknown", "Other", "Not Specified", "<OUT OF SPEC>"];

/// One installed memory module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryModule {
    pub size: String,
    pub module_type: Option<String>,
    pub speed: Option<String>,
    pub manufacturer: Option<String>,
}

fn is_known(value: &str) -> bool {
    !value.is_empty() && !UNKNOWN_VALUES.contains(&value)
}

/// Parse `dmidecode -t memory` output into the installed modules.
pub fn parse_memory_modules(output: &str) -> Vec<MemoryModule> {
    let mut modules = Vec::new();
    let mut current: Option<MemoryModule> = None;
    let mut in_device = false;

    for line in output.lines() {
        let trimmed = line.trim();

        // Section boundary: "Memory Device" on its own line after a Handle.
        if trimmed == "Memory Device" {
            if let Some(module) = current.take() {
                modules.push(module);
            }
            in_device = true;
            continue;
        }
        // A new Handle line outside a started device ends the section.
        if trimmed.starts_with("Handle ") {
            if let Some(module) = current.take() {
                modules.push(module);
            }
            in_device = false;
            continue;
        }
        if !in_device {
            continue;
        }

        if let Some(value) = trimmed.strip_prefix("Size:") {
            let size = value.trim();
            if size.contains("No Module Installed") || size == "Not Installed" {
                // Empty slot; skip this device but keep scanning others.
                current = None;
                in_device = false;
            } else {
                current = Some(MemoryModule {
                    size: size.to_string(),
                    module_type: None,
                    speed: None,
                    manufacturer: None,
                });
            }
            continue;
        }

        let Some(ref mut module) = current else {
            continue;
        };

        if let Some(value) = trimmed.strip_prefix("Type:") {
            let value = value.trim();
            if is_known(value) {
                module.module_type = Some(value.to_string());
            }
        } else if let Some(value) = trimmed.strip_prefix("Speed:") {
            // "Configured Memory Speed:" must not match; strip_prefix on the
            // trimmed line already guarantees the bare key.
            let value = value.trim();
            if is_known(value) {
                module.speed = Some(value.to_string());
            }
        } else if let Some(value) = trimmed.strip_prefix("Manufacturer:") {
            let value = value.trim();
            if is_known(value) && value != "NO DIMM" {
                module.manufacturer = Some(value.to_string());
            }
        }
    }

    if let Some(module) = current {
        modules.push(module);
    }

    modules
}

/// Load memory modules, trying escalation strategies in order:
/// polkit helper, passwordless sudo, bare dmidecode.
///
/// With no privileges this returns an empty list; callers use
/// [`placeholder_module`] to render something sensible.
pub fn load_memory_modules() -> Vec<MemoryModule> {
    let attempts: [(&str, Vec<&str>, Duration); 3] = [
        ("pkexec", vec![DMIDECODE_HELPER], Duration::from_secs(30)),
        (
            "sudo",
            vec!["-n", "dmidecode", "-t", "memory"],
            Duration::from_secs(5),
        ),
        (
            "dmidecode",
            vec!["-t", "memory"],
            Duration::from_secs(5),
        ),
    ];

    for (program, args, timeout) in attempts {
        let out = command::run_with_timeout(program, &args, timeout);
        if out.success() {
            let modules = parse_memory_modules(&out.stdout);
            if !modules.is_empty() {
                debug!("Found {} memory module(s) via {}", modules.len(), program);
                return modules;
            }
        } else {
            debug!("{} attempt failed: {}", program, out.error_text());
        }
    }

    warn!("Could not read DMI memory information, no privileges available");
    Vec::new()
}

/// Generic stand-in when DMI data is unavailable: one module carrying the
/// total-memory figure.
pub fn placeholder_module(total_memory_bytes: u64) -> MemoryModule {
    MemoryModule {
        size: format_bytes(total_memory_bytes),
        module_type: None,
        speed: None,
        manufacturer: Some("Run with elevated privileges for details".to_string()),
    }
}
