use std::sync::Arc;

use once_cell::sync::Lazy;
use swc_core::common::Globals;

mod analyze;
pub use analyze::*;
mod bundler;
pub use bundler::*;
mod global_import_handler;
pub use global_import_handler::*;
mod module_file;
pub use module_file::*;
mod module_resolver;
pub use module_resolver::{DiscoveryOptions, ModuleResolver};
mod modules_table;
pub use modules_table::*;
mod name_generator;
pub use name_generator::*;
mod options;
pub use options::*;
pub mod passes;
mod single_module;
pub use single_module::*;
mod stats;
pub use stats::*;

/// Marks and syntax contexts of every module are allocated from this one interner.
pub(crate) static SWC_GLOBALS: Lazy<Arc<Globals>> = Lazy::new(|| Arc::new(Globals::new()));

pub(crate) fn default_threads() -> usize {
  std::thread::available_parallelism().map_or(1, |n| n.get())
}

// public exports

pub type BundleResult<T> = Result<T, jetpack_error::BuildError>;
