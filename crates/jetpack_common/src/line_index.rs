/// Maps byte offsets of a source text to `(line, column)` pairs.
///
/// Lines are 0-based. Columns count UTF-16 code units, which is what source maps use.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
  line_starts: Vec<usize>,
}

impl LineIndex {
  pub fn new(source: &str) -> Self {
    let mut line_starts = vec![0];
    line_starts.extend(
      source
        .bytes()
        .enumerate()
        .filter(|(_, b)| *b == b'\n')
        .map(|(idx, _)| idx + 1),
    );
    Self { line_starts }
  }

  pub fn line_count(&self) -> usize {
    self.line_starts.len()
  }

  pub fn position(&self, source: &str, offset: usize) -> (u32, u32) {
    let offset = offset.min(source.len());
    let line = match self.line_starts.binary_search(&offset) {
      Ok(line) => line,
      Err(next_line) => next_line - 1,
    };
    let line_start = self.line_starts[line];
    let column = source
      .get(line_start..offset)
      .map(|prefix| prefix.encode_utf16().count())
      .unwrap_or(offset - line_start);
    (line as u32, column as u32)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn positions() {
    let source = "ab\ncd\n\nef";
    let index = LineIndex::new(source);
    assert_eq!(index.line_count(), 4);
    assert_eq!(index.position(source, 0), (0, 0));
    assert_eq!(index.position(source, 1), (0, 1));
    assert_eq!(index.position(source, 3), (1, 0));
    assert_eq!(index.position(source, 7), (3, 0));
    assert_eq!(index.position(source, 8), (3, 1));
  }

  #[test]
  fn utf16_columns() {
    let source = "'😀';x";
    let index = LineIndex::new(source);
    // the emoji is four bytes and two UTF-16 units
    assert_eq!(index.position(source, 7), (0, 5));
  }
}
