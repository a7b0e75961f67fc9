use std::path::{Path, PathBuf};

use jetpack_error::Error;
use sugar_path::SugarPath;

mod provider;
pub use provider::*;

/// A specifier matched by one of the providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
  /// Canonical key of the module. For files this is the absolute path.
  pub id: String,
  provider_index: usize,
}

/// Tries every registered [ModuleProvider] in registration order.
#[derive(Debug)]
pub struct Resolver {
  base_path: PathBuf,
  providers: Vec<Box<dyn ModuleProvider>>,
}

impl Resolver {
  pub fn new(base_path: impl AsRef<Path>) -> Self {
    Self {
      base_path: canonicalize_or_normalize(base_path.as_ref()),
      providers: vec![],
    }
  }

  /// A resolver serving files under `base_path`.
  pub fn with_file_provider(base_path: impl AsRef<Path>) -> Self {
    let mut resolver = Self::new(base_path);
    let provider = FileModuleProvider::new(resolver.base_path.clone());
    resolver.add_provider(provider);
    resolver
  }

  pub fn add_provider(&mut self, provider: impl ModuleProvider + 'static) {
    self.providers.push(Box::new(provider));
  }

  pub fn base_path(&self) -> &Path {
    &self.base_path
  }

  pub fn resolve(&self, importer: Option<&str>, specifier: &str) -> Option<ResolvedModule> {
    self
      .providers
      .iter()
      .enumerate()
      .find_map(|(provider_index, provider)| {
        provider
          .match_module(importer, specifier)
          .map(|id| ResolvedModule { id, provider_index })
      })
  }

  /// Like [Resolver::resolve], but a miss is reported as an unresolved module.
  pub fn resolve_or_error(
    &self,
    importer: Option<&str>,
    specifier: &str,
  ) -> jetpack_error::Result<ResolvedModule> {
    self.resolve(importer, specifier).ok_or_else(|| {
      tracing::debug!("unresolved: {specifier} from {importer:?}");
      Error::unresolved_module(importer.unwrap_or_default(), specifier)
    })
  }

  pub fn load(&self, resolved: &ResolvedModule) -> jetpack_error::Result<String> {
    match self.providers.get(resolved.provider_index) {
      Some(provider) => provider.load(&resolved.id),
      None => Err(Error::panic(format!(
        "no provider registered for {}",
        resolved.id
      ))),
    }
  }
}

/// Walks up from `start` to the nearest directory containing a `package.json`.
pub fn find_package_json_dir(start: impl AsRef<Path>) -> Option<PathBuf> {
  let start = start.as_ref().absolutize();
  start
    .ancestors()
    .find(|dir| dir.join("package.json").is_file())
    .map(Path::to_path_buf)
}

pub(crate) fn canonicalize_or_normalize(path: &Path) -> PathBuf {
  std::fs::canonicalize(path).unwrap_or_else(|_| path.absolutize())
}

/// Joins `specifier` onto the directory of `importer`, or onto `base_path` for entries and
/// in-memory importers.
pub(crate) fn join_specifier(base_path: &Path, importer: Option<&str>, specifier: &str) -> PathBuf {
  if Path::new(specifier).is_absolute() {
    return Path::new(specifier).normalize();
  }
  let dir = importer
    .map(Path::new)
    .filter(|importer| importer.is_absolute())
    .and_then(Path::parent)
    .unwrap_or(base_path);
  dir.join(specifier).normalize()
}
