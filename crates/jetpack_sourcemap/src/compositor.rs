use crate::{CodeGenFragment, MappingItem, SourceMapGenerator};

/// Concatenates module fragments into the final output.
///
/// Mapping items of each fragment are rebased by the output cursor before the append and
/// handed to the [SourceMapGenerator], if any.
#[derive(Debug)]
pub struct ModuleCompositor {
  result: String,
  /// 1-based line of the output cursor.
  line: u32,
  column: u32,
  sourcemap: Option<SourceMapGenerator>,
}

impl ModuleCompositor {
  pub fn new(sourcemap: Option<SourceMapGenerator>) -> Self {
    Self {
      result: String::new(),
      line: 1,
      column: 0,
      sourcemap,
    }
  }

  pub fn cursor(&self) -> (u32, u32) {
    (self.line, self.column)
  }

  pub fn append(&mut self, fragment: CodeGenFragment) -> &mut Self {
    let CodeGenFragment {
      content,
      line,
      column,
      mapping_items,
    } = fragment;

    if let Some(sourcemap) = self.sourcemap.as_mut() {
      let (base_line, base_column) = (self.line, self.column);
      sourcemap.add_items(mapping_items.into_iter().map(|mut item: MappingItem| {
        if item.dist_line == 1 {
          item.dist_column += base_column;
        }
        item.dist_line += base_line - 1;
        item
      }));
    }

    if line > 1 {
      self.column = column;
    } else {
      self.column += column;
    }
    self.line += line - 1;
    self.result.push_str(&content);
    self
  }

  /// Appends text that carries no mappings.
  pub fn append_str(&mut self, content: &str) -> &mut Self {
    let mut fragment = CodeGenFragment::default();
    fragment.push_str(content);
    self.append(fragment)
  }

  pub fn finish(self) -> (String, Option<SourceMapGenerator>) {
    (self.result, self.sourcemap)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{MappingCollector, OriginalLocation};

  fn fragment_with_mapping(prefix: &str, name: &str, suffix: &str) -> CodeGenFragment {
    let mut fragment = CodeGenFragment::default();
    let mut collector = MappingCollector::new(true);
    fragment.push_str(prefix);
    collector.add_mapping(&fragment, name, OriginalLocation::default());
    fragment.push_str(name);
    fragment.push_str(suffix);
    collector.finish(&mut fragment);
    fragment
  }

  #[test]
  fn rebases_first_line_columns_and_all_lines() {
    let mut compositor = ModuleCompositor::new(Some(SourceMapGenerator::new("out.js")));
    compositor.append_str("ab\ncd");
    compositor.append(fragment_with_mapping("x", "a", ";\n"));
    compositor.append(fragment_with_mapping("\n  ", "b", ";"));
    let (result, sourcemap) = compositor.finish();
    assert_eq!(result, "ab\ncdxa;\n\n  b;");

    let sourcemap = sourcemap.unwrap();
    let items = sourcemap.items();
    assert_eq!((items[0].dist_line, items[0].dist_column), (2, 3));
    assert_eq!((items[1].dist_line, items[1].dist_column), (4, 2));
  }

  #[test]
  fn cursor_after_single_line_fragments() {
    let mut compositor = ModuleCompositor::new(None);
    compositor.append_str("abc");
    compositor.append_str("de");
    assert_eq!(compositor.cursor(), (1, 5));
    compositor.append_str("\nx\ny");
    assert_eq!(compositor.cursor(), (3, 1));
  }
}
