use serde::{Deserialize, Serialize};

use crate::{vlq::generate_vlq_str, MappingItem};

/// A Source Map v3 document. Fields serialize in the order they are declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapJson {
  pub version: u8,
  pub file: String,
  #[serde(default)]
  pub source_root: String,
  pub sources: Vec<String>,
  #[serde(default)]
  pub sources_content: Vec<String>,
  #[serde(default)]
  pub names: Vec<String>,
  pub mappings: String,
}

impl SourceMapJson {
  pub fn to_json_string(&self) -> jetpack_error::Result<String> {
    serde_json::to_string_pretty(self).map_err(|e| jetpack_error::anyhow::Error::from(e).into())
  }
}

/// Accumulates rebased mapping items and encodes them into a [SourceMapJson].
#[derive(Debug, Default)]
pub struct SourceMapGenerator {
  file: String,
  sources: Vec<String>,
  sources_content: Vec<String>,
  items: Vec<MappingItem>,
}

#[derive(Default)]
struct EncodeState {
  /// 1-based generated line the encoder is on.
  line_counter: u32,
  after_col: i64,
  file_index: i64,
  before_line: i64,
  before_col: i64,
  has_item_on_line: bool,
}

impl SourceMapGenerator {
  pub fn new(file: impl Into<String>) -> Self {
    Self {
      file: file.into(),
      ..Default::default()
    }
  }

  /// Registers a source and returns its index. Sources must be added in file id order.
  pub fn add_source(&mut self, path: impl Into<String>, content: impl Into<String>) -> u32 {
    self.sources.push(path.into());
    self.sources_content.push(content.into());
    (self.sources.len() - 1) as u32
  }

  /// Items must arrive in generated order.
  pub fn add_items(&mut self, items: impl IntoIterator<Item = MappingItem>) {
    self.items.extend(items);
  }

  pub fn items(&self) -> &[MappingItem] {
    &self.items
  }

  pub fn encode_mappings(&self) -> String {
    let mut out = String::with_capacity(self.items.len() * 6);
    let mut state = EncodeState {
      line_counter: 1,
      ..Default::default()
    };

    for item in &self.items {
      if item.origin.file_id as usize >= self.sources.len() {
        tracing::debug!("skip mapping of {} without source", item.name);
        continue;
      }
      while state.line_counter < item.dist_line {
        out.push(';');
        state.line_counter += 1;
        state.after_col = 0;
        state.has_item_on_line = false;
      }
      if state.has_item_on_line {
        out.push(',');
      }

      let after_col = item.dist_column as i64;
      let file_index = item.origin.file_id as i64;
      let before_line = item.origin.line as i64;
      let before_col = item.origin.column as i64;
      generate_vlq_str(
        &mut out,
        after_col - state.after_col,
        file_index - state.file_index,
        before_line - state.before_line,
        before_col - state.before_col,
        None,
      );
      state.after_col = after_col;
      state.file_index = file_index;
      state.before_line = before_line;
      state.before_col = before_col;
      state.has_item_on_line = true;
    }

    out
  }

  pub fn finalize(self) -> SourceMapJson {
    let mappings = self.encode_mappings();
    SourceMapJson {
      version: 3,
      file: self.file,
      source_root: String::new(),
      sources: self.sources,
      sources_content: self.sources_content,
      names: vec![],
      mappings,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::OriginalLocation;

  fn item(dist_line: u32, dist_column: u32, file_id: u32, line: u32, column: u32) -> MappingItem {
    MappingItem {
      name: "x".into(),
      origin: OriginalLocation {
        file_id,
        line,
        column,
      },
      dist_line,
      dist_column,
    }
  }

  #[test]
  fn encodes_relative_segments() {
    let mut generator = SourceMapGenerator::new("out.js");
    generator.add_source("/a.js", "");
    generator.add_source("/b.js", "");
    generator.add_items([
      item(1, 0, 0, 0, 0),
      item(1, 4, 0, 0, 4),
      item(3, 2, 1, 1, 2),
    ]);
    assert_eq!(generator.encode_mappings(), "AAAA,IAAI;;EACF");
  }

  #[test]
  fn json_field_order() {
    let mut generator = SourceMapGenerator::new("out.js");
    generator.add_source("/a.js", "let a");
    let json = generator.finalize().to_json_string().unwrap();
    let keys = ["\"version\"", "\"file\"", "\"sourceRoot\"", "\"sources\"", "\"sourcesContent\"", "\"names\"", "\"mappings\""];
    let positions = keys.map(|key| json.find(key).unwrap());
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
  }
}
