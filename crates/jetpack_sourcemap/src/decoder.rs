use jetpack_error::format_err;

use crate::{vlq::vlq_to_int, SourceMapJson};

/// One decoded segment in absolute coordinates.
///
/// `generated_line` is 1-based to match [crate::MappingItem], the rest are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedMapping {
  pub generated_line: u32,
  pub generated_column: u32,
  pub source_index: u32,
  pub original_line: u32,
  pub original_column: u32,
  pub name_index: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct DecodedSourceMap {
  pub file: String,
  pub sources: Vec<String>,
  pub sources_content: Vec<String>,
  pub mappings: Vec<DecodedMapping>,
}

impl DecodedSourceMap {
  /// Segments sharing the given generated line.
  pub fn mappings_on_line(&self, generated_line: u32) -> impl Iterator<Item = &DecodedMapping> {
    self
      .mappings
      .iter()
      .filter(move |m| m.generated_line == generated_line)
  }
}

pub struct SourceMapDecoder;

impl SourceMapDecoder {
  pub fn decode_json(json: &str) -> jetpack_error::Result<DecodedSourceMap> {
    let map: SourceMapJson =
      serde_json::from_str(json).map_err(jetpack_error::anyhow::Error::from)?;
    Self::decode(map)
  }

  pub fn decode(map: SourceMapJson) -> jetpack_error::Result<DecodedSourceMap> {
    if map.version != 3 {
      return Err(format_err!("unsupported source map version {}", map.version).into());
    }
    let mappings = Self::decode_mappings(&map.mappings)?;
    Ok(DecodedSourceMap {
      file: map.file,
      sources: map.sources,
      sources_content: map.sources_content,
      mappings,
    })
  }

  pub fn decode_mappings(mappings: &str) -> jetpack_error::Result<Vec<DecodedMapping>> {
    let mut result = vec![];
    let mut source_index = 0i64;
    let mut original_line = 0i64;
    let mut original_column = 0i64;
    let mut name_index = 0i64;

    for (line_idx, line) in mappings.split(';').enumerate() {
      let mut generated_column = 0i64;
      for segment in line.split(',').filter(|s| !s.is_empty()) {
        let fields = decode_segment(segment)
          .ok_or_else(|| format_err!("malformed mapping segment \"{segment}\""))?;
        generated_column += fields[0];
        let mut decoded = DecodedMapping {
          generated_line: line_idx as u32 + 1,
          generated_column: generated_column as u32,
          source_index: 0,
          original_line: 0,
          original_column: 0,
          name_index: None,
        };
        match fields.len() {
          1 => {}
          4 | 5 => {
            source_index += fields[1];
            original_line += fields[2];
            original_column += fields[3];
            decoded.source_index = source_index as u32;
            decoded.original_line = original_line as u32;
            decoded.original_column = original_column as u32;
            if let Some(delta) = fields.get(4) {
              name_index += delta;
              decoded.name_index = Some(name_index as u32);
            }
          }
          len => {
            return Err(format_err!("mapping segment \"{segment}\" has {len} fields").into());
          }
        }
        result.push(decoded);
      }
    }

    Ok(result)
  }
}

fn decode_segment(segment: &str) -> Option<Vec<i64>> {
  let mut fields = Vec::with_capacity(5);
  let mut rest = segment;
  while !rest.is_empty() {
    let (value, consumed) = vlq_to_int(rest)?;
    fields.push(value);
    rest = &rest[consumed..];
  }
  Some(fields)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{MappingItem, OriginalLocation, SourceMapGenerator};

  #[test]
  fn decodes_generator_output() {
    let mut generator = SourceMapGenerator::new("out.js");
    generator.add_source("/a.js", "");
    generator.add_source("/b.js", "");
    let items = [(1, 0, 0, 0, 0), (1, 9, 0, 2, 4), (2, 2, 1, 0, 7), (5, 1, 0, 1, 1)]
      .map(|(dist_line, dist_column, file_id, line, column)| MappingItem {
        name: String::new(),
        origin: OriginalLocation {
          file_id,
          line,
          column,
        },
        dist_line,
        dist_column,
      });
    generator.add_items(items.clone());
    let json = generator.finalize().to_json_string().unwrap();

    let decoded = SourceMapDecoder::decode_json(&json).unwrap();
    assert_eq!(decoded.sources, vec!["/a.js", "/b.js"]);
    let got = decoded
      .mappings
      .iter()
      .map(|m| {
        (
          m.generated_line,
          m.generated_column,
          m.source_index,
          m.original_line,
          m.original_column,
        )
      })
      .collect::<Vec<_>>();
    assert_eq!(
      got,
      items
        .iter()
        .map(|i| (i.dist_line, i.dist_column, i.origin.file_id, i.origin.line, i.origin.column))
        .collect::<Vec<_>>()
    );
  }

  #[test]
  fn rejects_malformed_segments() {
    assert!(SourceMapDecoder::decode_mappings("AA*A").is_err());
    assert!(SourceMapDecoder::decode_mappings("AA").is_err());
  }
}
