//! Base64 VLQ as used by Source Map v3.

const BASE64_ALPHABET: &[u8; 64] =
  b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE_MASK: u128 = 0b11111;
const VLQ_CONTINUATION_BIT: u128 = 0b100000;
/// Magnitude of `i64::MIN` plus the sign bit.
const VLQ_MAX_BITS: u32 = 65;

fn base64_value(ch: u8) -> Option<u128> {
  let value = match ch {
    b'A'..=b'Z' => ch - b'A',
    b'a'..=b'z' => ch - b'a' + 26,
    b'0'..=b'9' => ch - b'0' + 52,
    b'+' => 62,
    b'/' => 63,
    _ => return None,
  };
  Some(value as u128)
}

/// Appends the VLQ encoding of `value` to `out`. Every `i64` is encodable.
pub fn write_vlq(out: &mut String, value: i64) {
  // sign lives in the least significant bit
  let mut rest = (u128::from(value.unsigned_abs()) << 1) | u128::from(value < 0);
  loop {
    let mut digit = rest & VLQ_BASE_MASK;
    rest >>= VLQ_BASE_SHIFT;
    if rest > 0 {
      digit |= VLQ_CONTINUATION_BIT;
    }
    out.push(BASE64_ALPHABET[digit as usize] as char);
    if rest == 0 {
      break;
    }
  }
}

pub fn int_to_vlq(value: i64) -> String {
  let mut out = String::with_capacity(2);
  write_vlq(&mut out, value);
  out
}

/// Decodes one VLQ value from the start of `input`.
///
/// Returns the value and the number of bytes consumed, `None` on malformed input or a value
/// outside of `i64`.
pub fn vlq_to_int(input: &str) -> Option<(i64, usize)> {
  let mut result: u128 = 0;
  let mut shift = 0;
  for (idx, ch) in input.bytes().enumerate() {
    let digit = base64_value(ch)?;
    if shift >= VLQ_MAX_BITS {
      return None;
    }
    result |= (digit & VLQ_BASE_MASK) << shift;
    if digit & VLQ_CONTINUATION_BIT == 0 {
      let magnitude = (result >> 1) as i128;
      let value = if result & 1 == 1 { -magnitude } else { magnitude };
      return Some((i64::try_from(value).ok()?, idx + 1));
    }
    shift += VLQ_BASE_SHIFT;
  }
  None
}

/// Encodes one mapping segment. The name index is only written when present.
pub fn generate_vlq_str(
  out: &mut String,
  generated_column: i64,
  source_index: i64,
  original_line: i64,
  original_column: i64,
  name_index: Option<i64>,
) {
  write_vlq(out, generated_column);
  write_vlq(out, source_index);
  write_vlq(out, original_line);
  write_vlq(out, original_column);
  if let Some(name_index) = name_index {
    write_vlq(out, name_index);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_values() {
    assert_eq!(int_to_vlq(0), "A");
    assert_eq!(int_to_vlq(1), "C");
    assert_eq!(int_to_vlq(-1), "D");
    assert_eq!(int_to_vlq(15), "e");
    assert_eq!(int_to_vlq(16), "gB");
    assert_eq!(int_to_vlq(-16), "hB");
    assert_eq!(int_to_vlq(1000), "w+B");
  }

  #[test]
  fn decode_known_values() {
    assert_eq!(vlq_to_int("gB"), Some((16, 2)));
    assert_eq!(vlq_to_int("D"), Some((-1, 1)));
    assert_eq!(vlq_to_int("w+BA"), Some((1000, 3)));
    assert_eq!(vlq_to_int("g"), None);
    assert_eq!(vlq_to_int("*"), None);
  }

  #[test]
  fn decode_inverts_encode() {
    for value in [
      i64::MIN,
      i64::MIN + 1,
      -100_000,
      -1025,
      -33,
      -32,
      -1,
      0,
      1,
      31,
      32,
      1024,
      123_456,
      i32::MAX as i64,
      i64::MAX,
    ] {
      let encoded = int_to_vlq(value);
      assert_eq!(vlq_to_int(&encoded), Some((value, encoded.len())), "{value}");
    }
  }

  #[test]
  fn extremes() {
    // 2^64 | sign: the sign digit, eleven zero digits, then 0b10000
    assert_eq!(int_to_vlq(i64::MIN), "hgggggggggggQ");
    // +2^63 is not an `i64`
    assert_eq!(vlq_to_int("ggggggggggggQ"), None);
    // more than 65 bits
    assert_eq!(vlq_to_int("gggggggggggggggB"), None);
  }

  #[test]
  fn segment() {
    let mut out = String::new();
    generate_vlq_str(&mut out, 0, 0, 0, 9, None);
    assert_eq!(out, "AAAS");
    out.clear();
    generate_vlq_str(&mut out, 4, 0, 1, -2, Some(3));
    assert_eq!(out, "IACFG");
  }
}
