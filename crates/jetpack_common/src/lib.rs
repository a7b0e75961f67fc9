use std::borrow::Cow;
use std::fmt::Display;

use swc_core::ecma::atoms::Atom;
mod symbol;
pub use symbol::*;
mod loader;
pub use loader::*;
mod line_index;
pub use line_index::*;

/// Dense index of a module inside the modules table, assigned at first discovery.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct ModuleId(u32);

impl ModuleId {
  pub fn new(value: usize) -> Self {
    Self(value as u32)
  }

  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl Display for ModuleId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// For `import { foo as foo2 } from './foo'`.
/// `foo` is `imported` and `foo2` is `imported_as`.
/// `import * as ns` is recorded with `imported` set to `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportedSpecifier {
  pub imported_as: Symbol,
  pub imported: Atom,
}

impl ImportedSpecifier {
  pub fn is_namespace(&self) -> bool {
    &*self.imported == "*"
  }
}

/// `export { foo as foo2 } from './foo'`, `foo` is `imported` and `foo2` is `exported_as`.
/// `export * as ns from './foo'` is recorded with `imported` set to `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReExportedSpecifier {
  pub exported_as: Atom,
  pub imported: Atom,
}

/// Which statement introduced a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
  Import,
  ReExport,
  ReExportAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
  pub specifier: Atom,
  pub kind: DependencyKind,
}

/// Specifiers not starting with `.` or `/` are served by the runtime, not bundled.
pub fn is_external_specifier(specifier: &str) -> bool {
  !(specifier.starts_with('.') || specifier.starts_with('/'))
}

pub type StaticStr = Cow<'static, str>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn external_specifiers() {
    assert!(is_external_specifier("react"));
    assert!(is_external_specifier("@scope/pkg"));
    assert!(!is_external_specifier("./a"));
    assert!(!is_external_specifier("../a"));
    assert!(!is_external_specifier("/abs/a.js"));
  }
}
