/// A position in an original source. `line` is 0-based, `column` counts UTF-16 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OriginalLocation {
  pub file_id: u32,
  pub line: u32,
  pub column: u32,
}

/// A generated position tied to an original one.
///
/// `dist_line` is 1-based, `dist_column` is 0-based. Both are fragment-local until the
/// [crate::ModuleCompositor] rebases them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingItem {
  pub name: String,
  pub origin: OriginalLocation,
  pub dist_line: u32,
  pub dist_column: u32,
}

/// Generated text of one module together with its mapping items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGenFragment {
  pub content: String,
  /// 1-based line of the cursor after the last write.
  pub line: u32,
  /// Column of the cursor after the last write, in UTF-16 units.
  pub column: u32,
  pub mapping_items: Vec<MappingItem>,
}

impl Default for CodeGenFragment {
  fn default() -> Self {
    Self {
      content: String::new(),
      line: 1,
      column: 0,
      mapping_items: vec![],
    }
  }
}

impl CodeGenFragment {
  pub fn push_str(&mut self, text: &str) {
    for ch in text.chars() {
      if ch == '\n' {
        self.line += 1;
        self.column = 0;
      } else {
        self.column += ch.len_utf16() as u32;
      }
    }
    self.content.push_str(text);
  }

  pub fn is_empty(&self) -> bool {
    self.content.is_empty()
  }
}

/// Records mapping items at the current cursor of a [CodeGenFragment].
///
/// A disabled collector drops everything, which is what plain printing wants.
#[derive(Debug, Default)]
pub struct MappingCollector {
  enabled: bool,
  items: Vec<MappingItem>,
}

impl MappingCollector {
  pub fn new(enabled: bool) -> Self {
    Self {
      enabled,
      items: vec![],
    }
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  pub fn add_mapping(&mut self, fragment: &CodeGenFragment, name: &str, origin: OriginalLocation) {
    if !self.enabled {
      return;
    }
    self.items.push(MappingItem {
      name: name.to_string(),
      origin,
      dist_line: fragment.line,
      dist_column: fragment.column,
    });
  }

  /// Moves the collected items into `fragment`.
  pub fn finish(self, fragment: &mut CodeGenFragment) {
    fragment.mapping_items = self.items;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cursor_follows_written_text() {
    let mut fragment = CodeGenFragment::default();
    fragment.push_str("let a = '😀';");
    assert_eq!((fragment.line, fragment.column), (1, 13));
    fragment.push_str("\nfoo");
    assert_eq!((fragment.line, fragment.column), (2, 3));
  }

  #[test]
  fn mapping_items_use_the_cursor() {
    let mut fragment = CodeGenFragment::default();
    let mut collector = MappingCollector::new(true);
    fragment.push_str("\n  ");
    let origin = OriginalLocation {
      file_id: 0,
      line: 3,
      column: 4,
    };
    collector.add_mapping(&fragment, "a", origin);
    fragment.push_str("a");
    collector.finish(&mut fragment);
    assert_eq!(
      fragment.mapping_items,
      vec![MappingItem {
        name: "a".into(),
        origin,
        dist_line: 2,
        dist_column: 2,
      }]
    );
  }
}
