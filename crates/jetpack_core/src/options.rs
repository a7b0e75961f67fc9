use std::path::{Path, PathBuf};

use jetpack_codegen::CodeGenConfig;
use jetpack_resolver::{find_package_json_dir, MemoryModuleProvider, Resolver, MEMORY_MODULE_TOKEN};
use serde::Deserialize;
use sugar_path::SugarPath;

use crate::DiscoveryOptions;

fn true_by_default() -> bool {
  true
}

fn threads_by_default() -> usize {
  crate::default_threads()
}

/// Options of one bundle run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleOptions {
  pub entry: String,
  /// Defaults to `<entry stem>.bundle.js` in the working directory.
  pub output: Option<PathBuf>,
  pub minify: bool,
  pub sourcemap: bool,
  pub jsx: bool,
  #[serde(default = "true_by_default")]
  pub trace_file: bool,
  pub library: bool,
  /// Files outside of it are never resolved. Found from the entry when absent.
  pub base_path: Option<PathBuf>,
  #[serde(default = "threads_by_default")]
  pub threads: usize,
}

impl Default for BundleOptions {
  fn default() -> Self {
    Self {
      entry: Default::default(),
      output: None,
      minify: false,
      sourcemap: false,
      jsx: false,
      trace_file: true,
      library: false,
      base_path: None,
      threads: crate::default_threads(),
    }
  }
}

impl BundleOptions {
  pub fn new(entry: impl Into<String>) -> Self {
    Self {
      entry: entry.into(),
      ..Default::default()
    }
  }

  pub fn codegen_config(&self) -> CodeGenConfig {
    CodeGenConfig {
      minify: self.minify,
      sourcemap: self.sourcemap,
      ..Default::default()
    }
  }

  pub fn discovery_options(&self) -> DiscoveryOptions {
    DiscoveryOptions {
      jsx: self.jsx,
      trace_file: self.trace_file,
      library: self.library,
      threads: self.threads,
    }
  }

  pub fn output_path(&self) -> PathBuf {
    self.output.clone().unwrap_or_else(|| {
      let stem = Path::new(&self.entry)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "index".to_string());
      PathBuf::from(format!("{stem}.bundle.js"))
    })
  }

  /// The explicit base path, else the nearest directory with a `package.json` above the entry,
  /// else the directory of the entry.
  pub fn resolve_base_path(&self) -> PathBuf {
    if let Some(base_path) = &self.base_path {
      return base_path.absolutize();
    }
    let entry_dir = Path::new(&self.entry)
      .absolutize()
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_else(|| PathBuf::from("/"));
    find_package_json_dir(&entry_dir).unwrap_or(entry_dir)
  }

  /// A resolver for files under the base path, and the entry specifier to start from.
  pub(crate) fn file_resolver(&self) -> (Resolver, String) {
    let resolver = Resolver::with_file_provider(self.resolve_base_path());
    let entry = Path::new(&self.entry).absolutize().to_string_lossy().to_string();
    (resolver, entry)
  }

  /// A resolver serving `source` as the entry, its relative imports are looked up from
  /// the base path, the working directory when none is given.
  pub(crate) fn memory_resolver(&self, source: &str) -> (Resolver, String) {
    let base_path = self
      .base_path
      .as_ref()
      .map(|path| path.absolutize())
      .unwrap_or_else(|| Path::new(".").absolutize());
    let mut resolver = Resolver::new(&base_path);
    resolver.add_provider(MemoryModuleProvider::new(source));
    resolver.add_provider(jetpack_resolver::FileModuleProvider::new(resolver.base_path().to_path_buf()));
    (resolver, MEMORY_MODULE_TOKEN.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserializes_camel_case_with_defaults() {
    let options: BundleOptions =
      serde_json::from_str(r#"{ "entry": "./src/main.js", "traceFile": false, "minify": true }"#)
        .unwrap();
    assert_eq!(options.entry, "./src/main.js");
    assert!(options.minify);
    assert!(!options.trace_file);
    assert!(!options.sourcemap);
    assert!(options.threads >= 1);

    let options: BundleOptions = serde_json::from_str("{}").unwrap();
    assert!(options.trace_file);
  }

  #[test]
  fn output_defaults_to_entry_stem() {
    let options = BundleOptions::new("./src/app.jsx");
    assert_eq!(options.output_path(), PathBuf::from("app.bundle.js"));
  }

  #[test]
  fn base_path_is_nearest_package_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("package.json"), "{}").unwrap();
    std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
    let entry = dir.path().join("src/nested/main.js");

    let options = BundleOptions::new(entry.to_string_lossy());
    assert_eq!(options.resolve_base_path(), dir.path().absolutize());
  }
}
