use std::fmt::Display;

pub mod error_code;

#[derive(Debug)]
pub enum ErrorKind {
  /// No provider could turn the specifier into a module.
  UnresolvedModule {
    importer: String,
    specifier: String,
  },
  ParseFailed {
    path: String,
    message: String,
    line: u32,
    column: u32,
  },
  /// Two declarations collide in one scope. `line` is 1-based, `column` 0-based.
  DuplicateBinding {
    name: String,
    line: u32,
    column: u32,
  },
  DuplicateExport {
    name: String,
  },
  MissingExport {
    importer: String,
    specifier: String,
    missing_export: String,
  },
  /// A rename would shadow or capture an unrelated binding.
  RenameConflict {
    name: String,
    new_name: String,
  },
  SymbolNotFound {
    name: String,
  },

  /// An unrecoverable error, including panics caught at a worker boundary.
  Panic {
    source: anyhow::Error,
  },

  IoError(std::io::Error),
}

impl Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ErrorKind::UnresolvedModule { specifier, .. } => {
        write!(f, "module can't be resolved: {specifier}")
      }
      ErrorKind::ParseFailed {
        message,
        line,
        column,
        ..
      } => write!(f, "{message} ({line}:{column})"),
      ErrorKind::DuplicateBinding { name, line, column } => write!(
        f,
        "variable '{name}' has been defined, location: {line}:{column}"
      ),
      ErrorKind::DuplicateExport { name } => write!(f, "duplicate export '{name}'"),
      ErrorKind::MissingExport {
        missing_export,
        specifier,
        ..
      } => write!(
        f,
        "can not find export variable '{missing_export}' from {specifier}"
      ),
      ErrorKind::RenameConflict { name, new_name } => {
        write!(f, "rename symbol failed: {name} -> {new_name}")
      }
      ErrorKind::SymbolNotFound { name } => write!(f, "symbol not found failed: {name}"),
      ErrorKind::Panic { source } => source.fmt(f),
      ErrorKind::IoError(e) => e.fmt(f),
    }
  }
}

impl ErrorKind {
  pub fn code(&self) -> &'static str {
    match self {
      ErrorKind::UnresolvedModule { .. } => error_code::UNRESOLVED_MODULE,
      ErrorKind::ParseFailed { .. } => error_code::PARSE_ERROR,
      ErrorKind::DuplicateBinding { .. } => error_code::DUPLICATE_BINDING,
      ErrorKind::DuplicateExport { .. } => error_code::DUPLICATE_EXPORT,
      ErrorKind::MissingExport { .. } => error_code::MISSING_EXPORT,
      ErrorKind::RenameConflict { .. } => error_code::RENAME_CONFLICT,
      ErrorKind::SymbolNotFound { .. } => error_code::SYMBOL_NOT_FOUND,
      ErrorKind::Panic { .. } => error_code::PANIC,
      ErrorKind::IoError(_) => error_code::IO_ERROR,
    }
  }
}
