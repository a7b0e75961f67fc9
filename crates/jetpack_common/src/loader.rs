use std::{path::Path, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Loader {
  #[default]
  Js,
  Jsx,
}

impl Loader {
  /// Picks the loader by file extension. `force_jsx` enables JSX for every file.
  pub fn from_path(path: &str, force_jsx: bool) -> Self {
    if force_jsx {
      return Self::Jsx;
    }
    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
      Some("jsx") => Self::Jsx,
      _ => Self::Js,
    }
  }

  pub fn is_jsx(self) -> bool {
    matches!(self, Self::Jsx)
  }
}

impl FromStr for Loader {
  type Err = jetpack_error::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "js" | "mjs" => Ok(Self::Js),
      "jsx" => Ok(Self::Jsx),
      _ => Err(jetpack_error::Error::panic(format!(
        "Unknown loader value \"{}\"",
        s
      ))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn loader_by_extension() {
    assert_eq!(Loader::from_path("/a/b.jsx", false), Loader::Jsx);
    assert_eq!(Loader::from_path("/a/b.js", false), Loader::Js);
    assert_eq!(Loader::from_path("/a/b.js", true), Loader::Jsx);
    assert!("ts".parse::<Loader>().is_err());
  }
}
