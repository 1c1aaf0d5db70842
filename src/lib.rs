// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod analytics;
pub mod charts;
pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod expenses;
pub mod models;
pub mod pdf;
pub mod report;
pub mod store;
pub mod taxonomy;
pub mod users;
pub mod utils;

pub use error::{OutlayError, Result};

use std::sync::Once;

/// Log filter, e.g. `OUTLAY_LOG=outlay=debug`.
pub const LOG_ENV: &str = "OUTLAY_LOG";

static INIT_TRACING: Once = Once::new();

/// Installs the stderr tracing subscriber; later calls are no-ops.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("outlay=warn"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    });
}
