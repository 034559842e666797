// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tracing setup for tests.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer `fmt` subscriber filtered by `RUST_LOG`
/// (default `warn`). Safe to call from every test; only the first call
/// installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(false)
        .try_init();
}
