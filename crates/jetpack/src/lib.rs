mod cli;
pub mod simple_api;
pub use {
  cli::{run, Cli},
  jetpack_core::{
    BundleOptions, BundleOutput, BundleResult, BundleStats, Bundler, ModuleAnalysis,
  },
  jetpack_error::{BuildError, Diagnostic},
};
