// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! # Tracing configuration setup.
//!
//! The engine is instrumented with Rust's `tracing` framework: operation execution, schema
//! building and batch dispatch open spans, and field failures are logged (with the raw error,
//! which never reaches the client) at `warn` level.
//!
//! Calling the `init` function will initialize a global tracing subscriber based on the value of
//! the `TRELLIS_LOG` environment variable, which follows the same conventions as `RUST_LOG`. This
//! will provide console logging.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*, util::TryInitError};

use crate::env_const::TRELLIS_LOG;

/// Initialize the tracing subscriber.
///
/// Installs a compact `tracing_subscriber::fmt` layer writing to stderr, filtered by `TRELLIS_LOG`
/// (`warn` when unset).
pub fn init() -> Result<(), LoggingError> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(TRELLIS_LOG)
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to install the tracing subscriber: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}
