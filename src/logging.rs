// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Logging setup shared by all tool binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for a tool. Call once at startup, before any window
/// is built. `RUST_LOG` overrides the default crate-level filter.
pub fn init() {
    let filter = EnvFilter::from_default_env()
        .add_directive("milotools=info".parse().expect("static directive"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
