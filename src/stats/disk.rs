// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Physical disk enumeration from `lsblk` columns.

use crate::command;
use tracing::warn;

/// Columns requested from lsblk, in order.
pub const LSBLK_ARGS: [&str; 4] = ["-d", "-n", "-o", "NAME,MODEL,SIZE,ROTA,TYPE"];

/// Storage medium classification derived from ROTA and the device name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskKind {
    Hdd,
    Ssd,
    NvmeSsd,
    Emmc,
}

impl DiskKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            DiskKind::Hdd => "HDD",
            DiskKind::Ssd => "SSD",
            DiskKind::NvmeSsd => "NVMe SSD",
            DiskKind::Emmc => "eMMC",
        }
    }
}

/// One physical disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskInfo {
    pub name: String,
    pub model: String,
    pub size: String,
    pub kind: DiskKind,
    /// Bus the disk hangs off: SATA, NVMe or eMMC.
    pub interface: &'static str,
}

/// Parse `lsblk -d -n -o NAME,MODEL,SIZE,ROTA,TYPE` output.
///
/// The MODEL column may contain spaces, so columns are taken from both
/// ends: NAME from the front, TYPE/ROTA/SIZE from the back, MODEL is what
/// remains in between. Virtual devices (loop, ram, sr) are skipped.
pub fn parse_disk_list(output: &str) -> Vec<DiskInfo> {
    let mut disks = Vec::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }

        let name = parts[0];
        if name.starts_with("loop") || name.starts_with("ram") || name.starts_with("sr") {
            continue;
        }
        if parts[parts.len() - 1] != "disk" {
            continue;
        }

        let rota = parts[parts.len() - 2];
        let size = parts[parts.len() - 3];
        let model = if parts.len() > 4 {
            parts[1..parts.len() - 3].join(" ")
        } else {
            String::new()
        };

        let name_lower = name.to_lowercase();
        let (kind, interface) = if name_lower.contains("nvme") {
            (DiskKind::NvmeSsd, "NVMe")
        } else if name_lower.contains("mmc") {
            (DiskKind::Emmc, "eMMC")
        } else if rota == "1" {
            (DiskKind::Hdd, "SATA")
        } else {
            (DiskKind::Ssd, "SATA")
        };

        disks.push(DiskInfo {
            name: name.to_string(),
            model: if model.is_empty() {
                format!("{} Drive", name.to_uppercase())
            } else {
                model
            },
            size: size.to_string(),
            kind,
            interface,
        });
    }

    disks
}

/// Enumerate physical disks. Returns an empty list when lsblk is missing
/// or fails; the monitor falls back to mounted-partition figures.
pub fn load_disks() -> Vec<DiskInfo> {
    let out = command::run("lsblk", &LSBLK_ARGS);
    if !out.success() {
        warn!("lsblk failed: {}", out.error_text());
        return Vec::new();
    }
    parse_disk_list(&out.stdout)
}
