use std::{borrow::Cow, fmt::Display};

use crate::ErrorKind;

#[derive(Debug)]
pub struct Error {
  contexts: Vec<Cow<'static, str>>,
  pub kind: ErrorKind,
}

impl PartialEq for Error {
  fn eq(&self, other: &Self) -> bool {
    self.kind.to_string().eq(&other.kind.to_string())
  }
}

impl Eq for Error {}

impl Error {
  fn with_kind(kind: ErrorKind) -> Self {
    Self {
      contexts: vec![],
      kind,
    }
  }

  pub fn context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
    self.contexts.push(context.into());
    self
  }

  pub fn code(&self) -> &'static str {
    self.kind.code()
  }

  pub fn unresolved_module(importer: impl Into<String>, specifier: impl Into<String>) -> Self {
    Self::with_kind(ErrorKind::UnresolvedModule {
      importer: importer.into(),
      specifier: specifier.into(),
    })
  }

  pub fn parse_failed(path: impl Into<String>, message: impl Into<String>, line: u32, column: u32) -> Self {
    Self::with_kind(ErrorKind::ParseFailed {
      path: path.into(),
      message: message.into(),
      line,
      column,
    })
  }

  pub fn duplicate_binding(name: impl Into<String>, line: u32, column: u32) -> Self {
    Self::with_kind(ErrorKind::DuplicateBinding {
      name: name.into(),
      line,
      column,
    })
  }

  pub fn duplicate_export(name: impl Into<String>) -> Self {
    Self::with_kind(ErrorKind::DuplicateExport { name: name.into() })
  }

  pub fn missing_export(
    missing_export: impl Into<String>,
    importer: impl Into<String>,
    specifier: impl Into<String>,
  ) -> Self {
    Self::with_kind(ErrorKind::MissingExport {
      importer: importer.into(),
      specifier: specifier.into(),
      missing_export: missing_export.into(),
    })
  }

  pub fn rename_conflict(name: impl Into<String>, new_name: impl Into<String>) -> Self {
    Self::with_kind(ErrorKind::RenameConflict {
      name: name.into(),
      new_name: new_name.into(),
    })
  }

  pub fn symbol_not_found(name: impl Into<String>) -> Self {
    Self::with_kind(ErrorKind::SymbolNotFound { name: name.into() })
  }

  pub fn io_error(e: std::io::Error) -> Self {
    Self::with_kind(ErrorKind::IoError(e))
  }

  pub fn panic(msg: impl Display) -> Self {
    anyhow::format_err!("{}", msg).into()
  }
}

impl From<anyhow::Error> for Error {
  fn from(value: anyhow::Error) -> Self {
    Self::with_kind(ErrorKind::Panic { source: value })
  }
}

impl From<std::io::Error> for Error {
  fn from(value: std::io::Error) -> Self {
    Self::io_error(value)
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match &self.kind {
      ErrorKind::Panic { source, .. } => Some(source.as_ref()),
      ErrorKind::IoError(e) => Some(e),
      _ => None,
    }
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for ctx in self.contexts.iter().rev() {
      writeln!(f, "{}: {}", ansi_term::Color::Yellow.paint("context"), ctx)?;
    }

    self.kind.fmt(f)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages() {
    assert_eq!(
      Error::unresolved_module("/src/a.js", "./missing").to_string(),
      "module can't be resolved: ./missing"
    );
    assert_eq!(
      Error::duplicate_binding("a", 3, 6).to_string(),
      "variable 'a' has been defined, location: 3:6"
    );
    assert_eq!(
      Error::missing_export("name", "/src/b.js", "./a").to_string(),
      "can not find export variable 'name' from ./a"
    );
    assert_eq!(
      Error::rename_conflict("a", "b").to_string(),
      "rename symbol failed: a -> b"
    );
  }

  #[test]
  fn codes() {
    assert_eq!(
      Error::missing_export("x", "a", "b").code(),
      crate::error_code::MISSING_EXPORT
    );
    assert_eq!(Error::panic("boom").code(), crate::error_code::PANIC);
  }
}
