use jetpack_common::LineIndex;
use jetpack_sourcemap::{CodeGenFragment, MappingCollector, OriginalLocation};
use serde::Deserialize;
use swc_core::{
  common::{Span, SyntaxContext},
  ecma::ast,
};

mod expr;
mod lit;
mod module_decl;
pub mod precedence;
mod stmt;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeGenConfig {
  pub minify: bool,
  pub sourcemap: bool,
  pub indent: String,
  pub line_end: String,
  pub start_indent_level: u32,
  /// Context of references that resolve to no binding. When unset, every `undefined` is taken
  /// as the global one.
  #[serde(skip)]
  pub unresolved_ctxt: Option<SyntaxContext>,
}

impl Default for CodeGenConfig {
  fn default() -> Self {
    Self {
      minify: false,
      sourcemap: false,
      indent: "  ".to_string(),
      line_end: "\n".to_string(),
      start_indent_level: 0,
      unresolved_ctxt: None,
    }
  }
}

impl CodeGenConfig {
  /// The global `undefined` is printed as `void 0` when minifying.
  pub fn prints_void_zero(&self, ident: &ast::Ident) -> bool {
    self.minify
      && &*ident.sym == "undefined"
      && self.unresolved_ctxt.map_or(true, |ctxt| ident.ctxt == ctxt)
  }
}

/// The original text an AST was parsed from, used to resolve mapping origins.
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
  pub file_id: u32,
  pub source: &'a str,
  pub line_index: &'a LineIndex,
}

/// Prints ES modules.
///
/// Parentheses are derived from operator precedence, so synthesized trees print correctly.
pub struct CodeGen<'a> {
  config: &'a CodeGenConfig,
  source: Option<SourceContext<'a>>,
  fragment: CodeGenFragment,
  collector: MappingCollector,
  indent_level: u32,
}

impl<'a> CodeGen<'a> {
  pub fn new(config: &'a CodeGenConfig, source: Option<SourceContext<'a>>) -> Self {
    Self {
      config,
      collector: MappingCollector::new(config.sourcemap && source.is_some()),
      source,
      fragment: CodeGenFragment::default(),
      indent_level: config.start_indent_level,
    }
  }

  pub fn emit_module(&mut self, module: &ast::Module) {
    for item in &module.body {
      self.emit_module_item(item);
    }
  }

  pub fn emit_module_item(&mut self, item: &ast::ModuleItem) {
    self.write_indent();
    match item {
      ast::ModuleItem::ModuleDecl(decl) => self.emit_module_decl(decl),
      ast::ModuleItem::Stmt(stmt) => self.emit_stmt(stmt),
    }
    self.write_line_end();
  }

  pub fn finish(mut self) -> CodeGenFragment {
    self.collector.finish(&mut self.fragment);
    self.fragment
  }

  fn minify(&self) -> bool {
    self.config.minify
  }

  fn write(&mut self, text: &str) {
    let Some(first) = text.chars().next() else {
      return;
    };
    if let Some(last) = self.fragment.content.chars().next_back() {
      if tokens_would_merge(last, first) {
        self.fragment.push_str(" ");
      }
    }
    self.fragment.push_str(text);
  }

  /// Writes `text` and maps its first character to the start of `span`.
  fn write_mapped(&mut self, text: &str, span: Span) {
    if text.is_empty() {
      return;
    }
    if let Some(last) = self.fragment.content.chars().next_back() {
      if tokens_would_merge(last, text.chars().next().unwrap_or(' ')) {
        self.fragment.push_str(" ");
      }
    }
    if let Some(origin) = self.origin_of(span) {
      self.collector.add_mapping(&self.fragment, text, origin);
    }
    self.fragment.push_str(text);
  }

  fn origin_of(&self, span: Span) -> Option<OriginalLocation> {
    if !self.collector.is_enabled() || span.is_dummy() {
      return None;
    }
    let source = self.source?;
    let offset = jetpack_compiler::byte_offset(span.lo);
    let (line, column) = source.line_index.position(source.source, offset);
    Some(OriginalLocation {
      file_id: source.file_id,
      line,
      column,
    })
  }

  /// Writes `text` unless minifying.
  fn write_space(&mut self, text: &str) {
    if !self.minify() {
      self.fragment.push_str(text);
    }
  }

  fn write_line_end(&mut self) {
    if !self.minify() {
      self.fragment.push_str(&self.config.line_end);
    }
  }

  fn write_indent(&mut self) {
    if self.minify() {
      return;
    }
    for _ in 0..self.indent_level {
      self.fragment.push_str(&self.config.indent);
    }
  }

  /// `, ` between items of a list.
  fn write_comma(&mut self) {
    self.write(",");
    self.write_space(" ");
  }
}

/// Prints `module` into a fresh fragment.
pub fn print_module(
  module: &ast::Module,
  config: &CodeGenConfig,
  source: Option<SourceContext>,
) -> CodeGenFragment {
  let mut codegen = CodeGen::new(config, source);
  codegen.emit_module(module);
  codegen.finish()
}

fn is_identifier_char(ch: char) -> bool {
  ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' || ch == '\\' || !ch.is_ascii()
}

/// Adjacent tokens that would lex as a single one need a space in between.
fn tokens_would_merge(last: char, next: char) -> bool {
  (is_identifier_char(last) && is_identifier_char(next))
    || (last == '+' && next == '+')
    || (last == '-' && next == '-')
    || (last == '/' && next == '/')
}
