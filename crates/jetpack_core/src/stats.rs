use std::time::{Duration, Instant};

/// Wall-clock time spent in each phase of one bundle run.
#[derive(Debug, Clone, Default)]
pub struct BundleStats {
  pub module_count: usize,
  pub parse_stage: Duration,
  pub minify: Duration,
  pub codegen: Duration,
  pub compose: Duration,
  pub sourcemap: Duration,
  pub write_io: Duration,
  pub total: Duration,
}

impl BundleStats {
  pub fn report(&self) -> String {
    let rows = [
      ("parse stage", self.parse_stage),
      ("minify", self.minify),
      ("codegen", self.codegen),
      ("module composition", self.compose),
      ("sourcemap finalize", self.sourcemap),
      ("write io", self.write_io),
      ("total", self.total),
    ];
    let mut report = format!("modules: {}\n", self.module_count);
    for (label, elapsed) in rows {
      report.push_str(&format!("{label:<20}{:>10.3} ms\n", as_millis(elapsed)));
    }
    report
  }
}

pub(crate) fn as_millis(duration: Duration) -> f64 {
  duration.as_secs_f64() * 1000.0
}

/// Runs `f` and adds the time it took to `slot`.
pub(crate) fn timed<T>(slot: &mut Duration, label: &str, f: impl FnOnce() -> T) -> T {
  let start = Instant::now();
  let result = f();
  let elapsed = start.elapsed();
  tracing::debug!("{label} finished in {:.3} ms", as_millis(elapsed));
  *slot += elapsed;
  result
}
