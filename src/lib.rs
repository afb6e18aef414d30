// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! milotools - shared core for the miloOS desktop utilities.
//!
//! The audio configuration panel, system statistics monitor, updater and
//! mastering front end are thin GTK windows over this crate: device
//! discovery, configuration writing, external command execution, hardware
//! introspection parsing and background task plumbing all live here so the
//! windows only render state and dispatch commands.

pub mod audio;
pub mod command;
pub mod config;
pub mod i18n;
pub mod logging;
pub mod mastering;
pub mod stats;
pub mod ui_state;
pub mod updater;
pub mod worker;

pub use command::CommandOutput;
pub use worker::{TaskEvent, TaskOutcome, TaskRunner};
