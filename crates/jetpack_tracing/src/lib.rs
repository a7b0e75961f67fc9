use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Level;

static IS_INIT: AtomicBool = AtomicBool::new(false);

/// Set to anything to turn tracing on.
pub const TRACING_ENV: &str = "JETPACK_TRACING";

/// Installs the subscriber when `JETPACK_TRACING` is set. Safe to call repeatedly.
pub fn enable_tracing_on_demand() {
  if std::env::var_os(TRACING_ENV).is_some() {
    init();
  }
}

/// Installs the subscriber once per process: `RUST_LOG` filtering plus every `jetpack*`
/// target at `TRACE`.
pub fn init() {
  use tracing_subscriber::{fmt, prelude::*, EnvFilter};
  if !IS_INIT.swap(true, Ordering::SeqCst) {
    let registered = tracing_subscriber::registry()
      .with(fmt::layer().with_writer(std::io::stderr))
      .with(EnvFilter::from_default_env())
      .with(tracing_subscriber::filter::Targets::new().with_targets(vec![("jetpack", Level::TRACE)]))
      .try_init();
    if registered.is_err() {
      // Another subscriber owns the process
      IS_INIT.store(false, Ordering::SeqCst);
    }
  }
}
