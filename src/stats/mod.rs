// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! System statistics: bounded counter histories plus the hardware
//! introspection parsers behind the monitor's pages. Live counter
//! collection (CPU/memory/IO deltas) is the metrics backend's job; this
//! module defines the snapshot shape it feeds in.

pub mod disk;
pub mod history;
pub mod memory;
pub mod network;
pub mod system;

pub use disk::{DiskInfo, DiskKind};
pub use history::{format_bytes, History, MetricsSnapshot, StatsMonitor, HISTORY_LEN};
pub use memory::MemoryModule;
pub use network::NetworkCard;
