// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Processor and graphics identification for the monitor's overview page.
//!
//! The CPU model comes from the first `model name` line of `/proc/cpuinfo`;
//! the GPU from the first VGA/Display/3D controller section of plain
//! `lspci` output, with the trailing revision tag stripped.

use crate::command;
use std::fs;
use tracing::debug;

const GPU_SECTIONS: [&str; 3] = [
    "VGA compatible controller",
    "Display controller",
    "3D controller",
];

/// Parse the CPU model out of `/proc/cpuinfo` content. Multi-core machines
/// repeat the line per core; the first one wins.
pub fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .find(|line| line.starts_with("model name"))
        .and_then(|line| line.split(':').nth(1))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse the GPU model out of `lspci` output: the first graphics controller
/// line, e.g. `00:02.0 VGA compatible controller: Intel ... (rev 07)`.
pub fn parse_gpu_model(output: &str) -> Option<String> {
    for line in output.lines() {
        if !GPU_SECTIONS.iter().any(|section| line.contains(section)) {
            continue;
        }
        let Some(model) = line.splitn(3, ':').nth(2) else {
            continue;
        };
        let model = match model.split_once("(rev") {
            Some((before, _)) => before,
            None => model,
        };
        let model = model.trim();
        if !model.is_empty() {
            return Some(model.to_string());
        }
    }
    None
}

/// CPU model for the overview page, or `None` when `/proc/cpuinfo` is
/// unreadable or carries no model line.
pub fn load_cpu_model() -> Option<String> {
    match fs::read_to_string("/proc/cpuinfo") {
        Ok(content) => parse_cpu_model(&content),
        Err(e) => {
            debug!("Could not read /proc/cpuinfo: {}", e);
            None
        }
    }
}

/// GPU model for the overview page, best effort.
pub fn load_gpu_model() -> Option<String> {
    let out = command::run("lspci", &[]);
    if !out.success() {
        debug!("lspci failed: {}", out.error_text());
        return None;
    }
    parse_gpu_model(&out.stdout)
}
