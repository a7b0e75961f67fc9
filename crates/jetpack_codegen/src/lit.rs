use swc_core::ecma::ast::{self, Ident, Lit};

use crate::CodeGen;

impl<'a> CodeGen<'a> {
  pub(crate) fn emit_ident(&mut self, ident: &Ident) {
    self.write_mapped(&ident.sym, ident.span);
  }

  /// An identifier in expression position.
  pub(crate) fn emit_reference(&mut self, ident: &Ident) {
    if self.config.prints_void_zero(ident) {
      self.write_mapped("void 0", ident.span);
    } else {
      self.emit_ident(ident);
    }
  }

  pub(crate) fn emit_lit(&mut self, lit: &Lit) {
    match lit {
      Lit::Str(str) => self.emit_str(str),
      Lit::Bool(bool) if self.minify() => {
        self.write_mapped(if bool.value { "!0" } else { "!1" }, bool.span)
      }
      Lit::Bool(bool) => self.write_mapped(if bool.value { "true" } else { "false" }, bool.span),
      Lit::Null(null) => self.write_mapped("null", null.span),
      Lit::Num(num) => match &num.raw {
        Some(raw) => self.write_mapped(raw, num.span),
        None => self.write_mapped(&format_number(num.value), num.span),
      },
      Lit::BigInt(big_int) => match &big_int.raw {
        Some(raw) => self.write_mapped(raw, big_int.span),
        None => self.write_mapped(&format!("{}n", big_int.value), big_int.span),
      },
      Lit::Regex(regex) => {
        self.write_mapped(&format!("/{}/{}", regex.exp, regex.flags), regex.span)
      }
      Lit::JSXText(text) => self.write_mapped(&quote_str(&text.value), text.span),
    }
  }

  /// Strings keep the quotes they were written with.
  pub(crate) fn emit_str(&mut self, str: &ast::Str) {
    match &str.raw {
      Some(raw) => self.write_mapped(raw, str.span),
      None => self.write_mapped(&quote_str(&str.value), str.span),
    }
  }

  pub(crate) fn emit_prop_name(&mut self, name: &ast::PropName) {
    match name {
      ast::PropName::Ident(ident) => self.write_mapped(&ident.sym, ident.span),
      ast::PropName::Str(str) => self.emit_str(str),
      ast::PropName::Num(num) => self.emit_lit(&Lit::Num(num.clone())),
      ast::PropName::BigInt(big_int) => self.emit_lit(&Lit::BigInt(big_int.clone())),
      ast::PropName::Computed(computed) => {
        self.write("[");
        self.emit_expr(&computed.expr);
        self.write("]");
      }
    }
  }

  pub(crate) fn emit_private_name(&mut self, name: &ast::PrivateName) {
    self.write_mapped(&format!("#{}", name.name), name.span);
  }

  pub(crate) fn emit_tpl(&mut self, tpl: &ast::Tpl) {
    self.write("`");
    for (idx, quasi) in tpl.quasis.iter().enumerate() {
      self.fragment.push_str(&quasi.raw);
      if let Some(expr) = tpl.exprs.get(idx) {
        self.fragment.push_str("${");
        self.emit_expr(expr);
        self.fragment.push_str("}");
      }
    }
    self.fragment.push_str("`");
  }
}

pub(crate) fn quote_str(value: &str) -> String {
  let mut quoted = String::with_capacity(value.len() + 2);
  quoted.push('\'');
  for ch in value.chars() {
    match ch {
      '\\' => quoted.push_str("\\\\"),
      '\'' => quoted.push_str("\\'"),
      '\n' => quoted.push_str("\\n"),
      '\r' => quoted.push_str("\\r"),
      '\t' => quoted.push_str("\\t"),
      '\u{2028}' => quoted.push_str("\\u2028"),
      '\u{2029}' => quoted.push_str("\\u2029"),
      ch if (ch as u32) < 0x20 => quoted.push_str(&format!("\\x{:02x}", ch as u32)),
      ch => quoted.push(ch),
    }
  }
  quoted.push('\'');
  quoted
}

pub(crate) fn format_number(value: f64) -> String {
  if value.is_nan() {
    "NaN".to_string()
  } else if value.is_infinite() {
    if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
  } else {
    format!("{value}")
  }
}
