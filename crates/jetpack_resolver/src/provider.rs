use std::{
  fmt::Debug,
  path::{Path, PathBuf},
};

use jetpack_error::Error;

use crate::{canonicalize_or_normalize, join_specifier};

/// A source of modules.
///
/// `match_module` turns a specifier into a key, `load` returns the source text of a matched key.
pub trait ModuleProvider: Debug + Send + Sync {
  fn match_module(&self, importer: Option<&str>, specifier: &str) -> Option<String>;

  fn load(&self, id: &str) -> jetpack_error::Result<String>;
}

const TRIED_SUFFIXES: [&str; 3] = [".js", ".jsx", ".mjs"];

/// Serves files living under `base_path`.
#[derive(Debug)]
pub struct FileModuleProvider {
  base_path: PathBuf,
}

impl FileModuleProvider {
  pub fn new(base_path: impl AsRef<Path>) -> Self {
    Self {
      base_path: canonicalize_or_normalize(base_path.as_ref()),
    }
  }

  fn try_candidates(&self, path: &Path) -> Option<PathBuf> {
    if path.is_file() {
      return Some(path.to_path_buf());
    }
    let raw = path.to_string_lossy();
    TRIED_SUFFIXES
      .iter()
      .filter(|suffix| !raw.ends_with(*suffix))
      .map(|suffix| PathBuf::from(format!("{raw}{suffix}")))
      .chain(std::iter::once(path.join("index.js")))
      .find(|candidate| candidate.is_file())
  }
}

impl ModuleProvider for FileModuleProvider {
  fn match_module(&self, importer: Option<&str>, specifier: &str) -> Option<String> {
    let joined = join_specifier(&self.base_path, importer, specifier);
    let found = canonicalize_or_normalize(&self.try_candidates(&joined)?);
    if !found.starts_with(&self.base_path) {
      tracing::warn!(
        "path: {} is not under working dir: {}",
        found.display(),
        self.base_path.display()
      );
      return None;
    }
    Some(found.to_string_lossy().to_string())
  }

  fn load(&self, id: &str) -> jetpack_error::Result<String> {
    std::fs::read_to_string(id).map_err(|e| Error::io_error(e).context(format!("Read file: {id}")))
  }
}

/// The token an in-memory entry is registered under.
pub const MEMORY_MODULE_TOKEN: &str = "memory0";

/// Serves a single in-memory module, used to bundle a source string.
#[derive(Debug)]
pub struct MemoryModuleProvider {
  token: String,
  content: String,
}

impl MemoryModuleProvider {
  pub fn new(content: impl Into<String>) -> Self {
    Self::with_token(MEMORY_MODULE_TOKEN, content)
  }

  pub fn with_token(token: impl Into<String>, content: impl Into<String>) -> Self {
    Self {
      token: token.into(),
      content: content.into(),
    }
  }
}

impl ModuleProvider for MemoryModuleProvider {
  fn match_module(&self, _importer: Option<&str>, specifier: &str) -> Option<String> {
    (specifier == self.token).then(|| self.token.clone())
  }

  fn load(&self, _id: &str) -> jetpack_error::Result<String> {
    Ok(self.content.clone())
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  #[test]
  fn file_provider_tries_suffixes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "").unwrap();
    fs::write(dir.path().join("b.jsx"), "").unwrap();
    fs::create_dir(dir.path().join("c")).unwrap();
    fs::write(dir.path().join("c/index.js"), "").unwrap();

    let provider = FileModuleProvider::new(dir.path());
    let base = canonicalize_or_normalize(dir.path());
    let importer = base.join("main.js").to_string_lossy().to_string();

    let a = provider.match_module(Some(&importer), "./a").unwrap();
    assert_eq!(PathBuf::from(a), base.join("a.js"));
    let b = provider.match_module(Some(&importer), "./b").unwrap();
    assert_eq!(PathBuf::from(b), base.join("b.jsx"));
    let c = provider.match_module(Some(&importer), "./c").unwrap();
    assert_eq!(PathBuf::from(c), base.join("c/index.js"));
    assert!(provider.match_module(Some(&importer), "./d").is_none());
  }

  #[test]
  fn file_provider_stays_under_base_path() {
    let dir = tempfile::tempdir().unwrap();
    let inner = dir.path().join("inner");
    fs::create_dir(&inner).unwrap();
    fs::write(dir.path().join("outside.js"), "").unwrap();

    let provider = FileModuleProvider::new(&inner);
    let importer = canonicalize_or_normalize(&inner)
      .join("main.js")
      .to_string_lossy()
      .to_string();
    assert!(provider
      .match_module(Some(&importer), "../outside")
      .is_none());
  }

  #[test]
  fn memory_provider_matches_its_token_only() {
    let provider = MemoryModuleProvider::new("let a;");
    assert_eq!(provider.match_module(None, "memory0").as_deref(), Some("memory0"));
    assert!(provider.match_module(None, "./memory0").is_none());
    assert_eq!(provider.load("memory0").unwrap(), "let a;");
  }
}
