use jetpack_core::{BundleOptions, BundleOutput, BundleResult, Bundler, ModuleAnalysis};

/// Bundles `options.entry` and writes the output file, with its source map when enabled.
pub fn bundle_module(options: BundleOptions) -> BundleResult<BundleOutput> {
  Bundler::new(options).write()
}

/// Bundles `source` as the entry. Relative imports are resolved from `options.base_path`.
/// Nothing is written.
pub fn bundle_string(source: &str, options: BundleOptions) -> BundleResult<BundleOutput> {
  Bundler::new(options).build_string(source)
}

pub fn analyze_module(options: &BundleOptions) -> BundleResult<ModuleAnalysis> {
  jetpack_core::analyze_module(options)
}

/// Prints a single module, optionally minified, without following its imports.
pub fn parse_and_codegen(path: &str, source: &str, minify: bool, jsx: bool) -> jetpack_error::Result<String> {
  jetpack_core::parse_and_codegen(path, source, minify, jsx)
}
