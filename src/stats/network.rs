// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Network card identification for the monitor's network page.
//!
//! Three stages, each degrading to the previous one's answer: the active
//! interface from the default route, its driver from `ethtool -i`, and the
//! controller model matched out of `lspci -v` sections.

use crate::command;
use std::time::Duration;
use tracing::debug;

/// Description of the active network card, best effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkCard {
    pub interface: String,
    pub driver: Option<String>,
    pub model: Option<String>,
}

impl NetworkCard {
    /// Label for the network page header.
    pub fn display_name(&self) -> String {
        match (&self.model, &self.driver) {
            (Some(model), _) => format!("{} ({})", model, self.interface),
            (None, Some(driver)) => format!("{} ({})", self.interface, driver),
            (None, None) => self.interface.clone(),
        }
    }
}

/// Parse the interface name out of `ip route show default`:
/// `default via 192.168.1.1 dev wlan0 proto dhcp ...` - the token after
/// `dev`.
pub fn parse_default_interface(output: &str) -> Option<String> {
    let parts: Vec<&str> = output.split_whitespace().collect();
    let dev_index = parts.iter().position(|&p| p == "dev")?;
    parts.get(dev_index + 1).map(|s| s.to_string())
}

/// Parse the `driver:` line of `ethtool -i` output.
pub fn parse_driver(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("driver:"))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Walk `lspci -v` output for a network/ethernet controller section whose
/// `Kernel driver in use:` line names the given driver, and return that
/// controller's model string.
pub fn parse_controller_model(output: &str, driver: &str) -> Option<String> {
    let mut current_model: Option<String> = None;

    for line in output.lines() {
        if line.contains("Network controller") || line.contains("Ethernet controller") {
            // "00:14.3 Network controller: Intel Corporation Wi-Fi 6 AX201"
            current_model = line
                .splitn(3, ':')
                .nth(2)
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty());
        } else if line.contains("Kernel driver in use:") {
            if line.contains(driver) {
                if let Some(model) = current_model {
                    return Some(model);
                }
            }
            current_model = None;
        }
    }

    None
}

/// Identify the active network card. Returns `None` when there is no
/// default route (no active connection).
pub fn load_network_card() -> Option<NetworkCard> {
    let route = command::run("ip", &["route", "show", "default"]);
    if !route.success() {
        debug!("ip route failed: {}", route.error_text());
        return None;
    }
    let interface = parse_default_interface(&route.stdout)?;

    // ethtool may need privileges for some drivers; try the polkit path
    // first, then bare.
    let mut ethtool = command::run_with_timeout(
        "pkexec",
        &["ethtool", "-i", &interface],
        Duration::from_secs(5),
    );
    if !ethtool.success() {
        ethtool = command::run("ethtool", &["-i", &interface]);
    }

    let driver = if ethtool.success() {
        parse_driver(&ethtool.stdout)
    } else {
        debug!("ethtool failed for {}: {}", interface, ethtool.error_text());
        None
    };

    let model = driver.as_deref().and_then(|drv| {
        let lspci = command::run("lspci", &["-v"]);
        if lspci.success() {
            parse_controller_model(&lspci.stdout, drv)
        } else {
            None
        }
    });

    Some(NetworkCard {
        interface,
        driver,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_interface() {
        assert_eq!(
            parse_default_interface("default via 192.168.1.1 dev wlan0 proto dhcp metric 600\n"),
            Some("wlan0".to_string())
        );
        assert_eq!(parse_default_interface(""), None);
        assert_eq!(parse_default_interface("default via 10.0.0.1"), None);
    }

    #[test]
    fn test_parse_driver() {
        let output = "driver: iwlwifi\nversion: 6.5.0\nfirmware-version: 77.0\n";
        assert_eq!(parse_driver(output), Some("iwlwifi".to_string()));
        assert_eq!(parse_driver("version: 1.0\n"), None);
    }

    const LSPCI_OUTPUT: &str = "\
00:02.0 VGA compatible controller: Intel Corporation UHD Graphics 620
	Kernel driver in use: i915

00:14.3 Network controller: Intel Corporation Wi-Fi 6 AX201
	Subsystem: Intel Corporation Wi-Fi 6 AX201
	Kernel driver in use: iwlwifi

01:00.0 Ethernet controller: Realtek Semiconductor RTL8111/8168
	Kernel driver in use: r8169
";

    #[test]
    fn test_parse_controller_model() {
        assert_eq!(
            parse_controller_model(LSPCI_OUTPUT, "iwlwifi"),
            Some("Intel Corporation Wi-Fi 6 AX201".to_string())
        );
        assert_eq!(
            parse_controller_model(LSPCI_OUTPUT, "r8169"),
            Some("Realtek Semiconductor RTL8111/8168".to_string())
        );
        // i915 drives a VGA controller, not a network section.
        assert_eq!(parse_controller_model(LSPCI_OUTPUT, "i915"), None);
        assert_eq!(parse_controller_model(LSPCI_OUTPUT, "nosuch"), None);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let full = NetworkCard {
            interface: "wlan0".to_string(),
            driver: Some("iwlwifi".to_string()),
            model: Some("Intel Wi-Fi 6 AX201".to_string()),
        };
        assert_eq!(full.display_name(), "Intel Wi-Fi 6 AX201 (wlan0)");

        let no_model = NetworkCard {
            interface: "eth0".to_string(),
            driver: Some("r8169".to_string()),
            model: None,
        };
        assert_eq!(no_model.display_name(), "eth0 (r8169)");

        let bare = NetworkCard {
            interface: "eth0".to_string(),
            driver: None,
            model: None,
        };
        assert_eq!(bare.display_name(), "eth0");
    }
}
