use std::path::Path;

use jetpack_core::BundleOptions;
use serde::Deserialize;

mod test_config;
pub use test_config::*;

impl TestConfig {
  /// Options bundling the entry of the fixture at `fixture_dir`.
  pub fn bundle_options(&self, fixture_dir: &Path) -> BundleOptions {
    BundleOptions {
      entry: fixture_dir.join(&self.entry).to_string_lossy().to_string(),
      output: None,
      minify: self.minify,
      sourcemap: self.sourcemap,
      jsx: self.jsx,
      trace_file: true,
      library: self.library,
      base_path: Some(fixture_dir.to_path_buf()),
      threads: 2,
    }
  }
}

/// `text` must show up exactly `count` times in the output.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Occurrence {
  pub text: String,
  pub count: usize,
}
