// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the rampup server.
//!
//! Uses `tracing` with `tracing-subscriber` for structured logging to
//! stderr. Log level can be controlled via the `RUST_LOG` environment
//! variable:
//!
//! ```bash
//! # Default: info for rampup, quieter dependencies
//! rampup-server
//!
//! # Debug output for troubleshooting
//! RUST_LOG=rampup=debug rampup-server
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logging subsystem.
pub fn init_logging() {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new("rampup=info,rampup_core=info,octocrab=error,reqwest=error")
        })
        .expect("valid default filter directives");

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
