// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bounded sample history for the time-series graphs.
//!
//! The monitor polls once a second and keeps the last 60 samples per
//! counter; old samples fall off the front.

use std::collections::VecDeque;

/// Samples kept per counter (one minute at the 1 s poll interval).
pub const HISTORY_LEN: usize = 60;

/// Fixed-capacity ring of recent samples, oldest first.
#[derive(Debug, Clone)]
pub struct History {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_LEN)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a sample, dropping the oldest when full.
    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Most recent sample, if any.
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    /// Largest sample currently held; graphs use this for the y-axis scale.
    pub fn max(&self) -> f64 {
        self.samples.iter().copied().fold(0.0, f64::max)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// One poll of the system counters. Collection is done by the monitor's
/// metrics backend; this crate only defines the shape it hands over.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    /// Aggregate CPU usage, 0-100.
    pub cpu_percent: f64,
    /// Memory usage, 0-100.
    pub memory_percent: f64,
    /// Bytes received since the previous snapshot.
    pub net_rx_bytes: f64,
    /// Bytes sent since the previous snapshot.
    pub net_tx_bytes: f64,
    /// Bytes read from disk since the previous snapshot.
    pub disk_read_bytes: f64,
    /// Bytes written to disk since the previous snapshot.
    pub disk_write_bytes: f64,
}

/// The running histories behind the monitor's graphs.
#[derive(Debug, Clone, Default)]
pub struct StatsMonitor {
    pub cpu: History,
    pub memory: History,
    pub net_rx: History,
    pub net_tx: History,
    pub disk_read: History,
    pub disk_write: History,
}

impl StatsMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one snapshot into every history.
    pub fn record(&mut self, snapshot: &MetricsSnapshot) {
        self.cpu.push(snapshot.cpu_percent);
        self.memory.push(snapshot.memory_percent);
        self.net_rx.push(snapshot.net_rx_bytes);
        self.net_tx.push(snapshot.net_tx_bytes);
        self.disk_read.push(snapshot.disk_read_bytes);
        self.disk_write.push(snapshot.disk_write_bytes);
    }
}

/// Format a byte count the way the monitor labels its axes.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_bounded() {
        let mut h = History::with_capacity(3);
        for i in 0..5 {
            h.push(i as f64);
        }
        assert_eq!(h.len(), 3);
        let samples: Vec<f64> = h.iter().collect();
        assert_eq!(samples, vec![2.0, 3.0, 4.0]);
        assert_eq!(h.latest(), Some(4.0));
        assert_eq!(h.max(), 4.0);
    }

    #[test]
    fn test_default_capacity() {
        let mut h = History::new();
        for i in 0..100 {
            h.push(i as f64);
        }
        assert_eq!(h.len(), HISTORY_LEN);
        assert_eq!(h.iter().next(), Some(40.0));
    }

    #[test]
    fn test_monitor_records_all_counters() {
        let mut monitor = StatsMonitor::new();
        monitor.record(&MetricsSnapshot {
            cpu_percent: 12.5,
            memory_percent: 40.0,
            net_rx_bytes: 1024.0,
            net_tx_bytes: 256.0,
            disk_read_bytes: 0.0,
            disk_write_bytes: 4096.0,
        });

        assert_eq!(monitor.cpu.latest(), Some(12.5));
        assert_eq!(monitor.memory.latest(), Some(40.0));
        assert_eq!(monitor.net_rx.latest(), Some(1024.0));
        assert_eq!(monitor.disk_write.latest(), Some(4096.0));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
