// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! System update front-end core: privileged apt invocations plus the
//! upgradable-package count the window shows between them.

use crate::command;
use crate::worker::TaskRunner;
use tracing::info;

/// Action names the updater submits under; the window keys its button
/// state off these.
pub const ACTION_CHECK: &str = "check-updates";
pub const ACTION_INSTALL: &str = "install-updates";

/// Count upgradable packages in `apt list --upgradable` output.
///
/// The first line is the `Listing...` header; blank lines are ignored.
pub fn count_upgradable(output: &str) -> usize {
    let non_empty = output.lines().filter(|l| !l.trim().is_empty()).count();
    non_empty.saturating_sub(1)
}

/// Refresh the package index (`pkexec apt update`), then count what is
/// upgradable. Runs on a worker; the success payload is the count as text.
pub fn check_updates(runner: &TaskRunner) -> bool {
    runner.submit(ACTION_CHECK, || {
        let update = command::run("pkexec", &["apt", "update"]);
        if !update.success() {
            return Err(update.error_text().to_string());
        }

        // The count query itself needs no privileges.
        let list = command::run("apt", &["list", "--upgradable"]);
        if !list.success() {
            return Err(list.error_text().to_string());
        }

        let count = count_upgradable(&list.stdout);
        info!("{} package(s) upgradable", count);
        Ok(count.to_string())
    })
}

/// Install all pending updates (`pkexec apt upgrade -y`) on a worker.
pub fn install_updates(runner: &TaskRunner) -> bool {
    runner.submit(ACTION_INSTALL, || {
        let upgrade = command::run("pkexec", &["apt", "upgrade", "-y"]);
        if upgrade.success() {
            info!("System upgrade finished");
            Ok(String::new())
        } else {
            Err(upgrade.error_text().to_string())
        }
    })
}
