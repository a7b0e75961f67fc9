use std::{fmt::Display, path::Path};

use crate::{Error, PathExt, CWD};

/// An error attached to the module it was raised for.
#[derive(Debug)]
pub struct Diagnostic {
  pub path: String,
  pub error: Error,
}

impl Diagnostic {
  pub fn new(path: impl Into<String>, error: Error) -> Self {
    Self {
      path: path.into(),
      error,
    }
  }

  pub fn code(&self) -> &'static str {
    self.error.code()
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "File: {}\nError: {}",
      self.path.may_display_relative(),
      self.error
    )
  }
}

/// A batch of [Diagnostic]s reported together.
///
/// [BuildError] is never empty. You could only construct it from at least one diagnostic.
#[derive(Debug)]
pub struct BuildError(Vec<Diagnostic>);

impl BuildError {
  pub fn new(diagnostic: Diagnostic) -> Self {
    Self(vec![diagnostic])
  }

  /// Returns `None` for an empty batch.
  pub fn from_vec(vec: Vec<Diagnostic>) -> Option<Self> {
    if vec.is_empty() {
      None
    } else {
      Some(Self(vec))
    }
  }

  pub fn push(&mut self, diagnostic: Diagnostic) {
    self.0.push(diagnostic);
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.0
  }

  pub fn into_vec(self) -> Vec<Diagnostic> {
    self.0
  }

  /// Renders every entry with paths shown relative to `cwd`.
  pub fn to_readable_string(&self, cwd: impl AsRef<Path>) -> String {
    let cwd = cwd.as_ref().to_path_buf();
    CWD.set(&cwd, || self.to_string())
  }

  pub fn print_to_stderr(&self, cwd: impl AsRef<Path>) {
    let cwd = cwd.as_ref().to_path_buf();
    CWD.set(&cwd, || {
      for diagnostic in &self.0 {
        eprintln!(
          "{} {}\n{} {}",
          ansi_term::Color::Cyan.paint("File:"),
          diagnostic.path.may_display_relative(),
          ansi_term::Color::Red.bold().paint("Error:"),
          diagnostic.error
        );
      }
    });
  }
}

impl Extend<Diagnostic> for BuildError {
  fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
    self.0.extend(iter)
  }
}

impl From<Diagnostic> for BuildError {
  fn from(diagnostic: Diagnostic) -> Self {
    Self::new(diagnostic)
  }
}

impl Display for BuildError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (idx, diagnostic) in self.0.iter().enumerate() {
      if idx > 0 {
        writeln!(f)?;
      }
      diagnostic.fmt(f)?;
    }
    Ok(())
  }
}

impl std::error::Error for BuildError {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_lists_every_entry() {
    let mut errors = BuildError::new(Diagnostic::new(
      "/p/a.js",
      Error::unresolved_module("/p/a.js", "./b"),
    ));
    errors.push(Diagnostic::new(
      "/p/c.js",
      Error::duplicate_binding("x", 1, 4),
    ));
    assert_eq!(
      errors.to_readable_string("/p"),
      "File: a.js\nError: module can't be resolved: ./b\nFile: c.js\nError: variable 'x' has been defined, location: 1:4"
    );
  }

  #[test]
  fn empty_batch_is_rejected() {
    assert!(BuildError::from_vec(vec![]).is_none());
  }
}
