use std::{
  borrow::Cow,
  path::{Path, PathBuf},
};

use sugar_path::SugarPath;

scoped_tls::scoped_thread_local!(
  /// Working directory used to shorten paths in diagnostics.
  pub static CWD: PathBuf
);

pub fn format_quoted_strings(list: &[impl AsRef<str>]) -> String {
  let mut quoted_list = list
    .iter()
    .map(|item| format!("\"{}\"", item.as_ref()))
    .collect::<Vec<_>>();
  match quoted_list.pop() {
    None => String::new(),
    Some(last_item) if quoted_list.is_empty() => last_item,
    Some(last_item) => format!("{} and {}", quoted_list.join(", "), last_item),
  }
}

pub trait PathExt {
  fn may_display_relative(&self) -> Cow<str>;
}

impl PathExt for Path {
  fn may_display_relative(&self) -> Cow<str> {
    let path = if CWD.is_set() && self.is_absolute() {
      CWD.with(|cwd| self.relative(cwd))
    } else {
      return self.to_string_lossy();
    };
    Cow::Owned(path.display().to_string())
  }
}

impl PathExt for str {
  fn may_display_relative(&self) -> Cow<str> {
    match Path::new(self).may_display_relative() {
      Cow::Borrowed(_) => Cow::Borrowed(self),
      Cow::Owned(s) => Cow::Owned(s),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quoted_strings() {
    assert_eq!(format_quoted_strings(&["a"]), "\"a\"");
    assert_eq!(format_quoted_strings(&["a", "b", "c"]), "\"a\", \"b\" and \"c\"");
  }

  #[test]
  fn relative_display() {
    let cwd = PathBuf::from("/project");
    let shown = CWD.set(&cwd, || {
      Path::new("/project/src/a.js")
        .may_display_relative()
        .into_owned()
    });
    assert_eq!(shown, "src/a.js");
    assert_eq!(Path::new("src/a.js").may_display_relative(), "src/a.js");
  }
}
