use swc_core::{
  common::{SyntaxContext, DUMMY_SP},
  ecma::{ast, atoms::Atom},
};

pub trait ModuleExportNameExt {
  /// `export { a as "some name" }` is legal, so the name may come from a string literal.
  fn name(&self) -> &Atom;

  fn as_ident(&self) -> Option<&ast::Ident>;
}

impl ModuleExportNameExt for ast::ModuleExportName {
  fn name(&self) -> &Atom {
    match self {
      ast::ModuleExportName::Ident(ident) => &ident.sym,
      ast::ModuleExportName::Str(str) => &str.value,
    }
  }

  fn as_ident(&self) -> Option<&ast::Ident> {
    match self {
      ast::ModuleExportName::Ident(ident) => Some(ident),
      ast::ModuleExportName::Str(_) => None,
    }
  }
}

pub trait ImportNamedSpecifierExt {
  fn imported_name(&self) -> &Atom;

  fn imported_as_ident(&self) -> &ast::Ident;
}

impl ImportNamedSpecifierExt for ast::ImportNamedSpecifier {
  fn imported_name(&self) -> &Atom {
    match &self.imported {
      Some(imported) => imported.name(),
      None => &self.local.sym,
    }
  }

  fn imported_as_ident(&self) -> &ast::Ident {
    &self.local
  }
}

pub trait ExportNamedSpecifierExt {
  fn local_name(&self) -> &Atom;
  fn exported_as_name(&self) -> &Atom;
}

impl ExportNamedSpecifierExt for ast::ExportNamedSpecifier {
  fn local_name(&self) -> &Atom {
    self.orig.name()
  }

  fn exported_as_name(&self) -> &Atom {
    match &self.exported {
      Some(exported) => exported.name(),
      None => self.orig.name(),
    }
  }
}

pub trait ImportDeclExt {
  fn source(&self) -> &Atom;
}

impl ImportDeclExt for ast::ImportDecl {
  fn source(&self) -> &Atom {
    &self.src.value
  }
}

/// An identifier without position, carrying the given syntax context.
pub fn ident(name: impl Into<Atom>, ctxt: SyntaxContext) -> ast::Ident {
  ast::Ident::new(name.into(), DUMMY_SP, ctxt)
}

pub fn ident_expr(name: impl Into<Atom>) -> Box<ast::Expr> {
  Box::new(ast::Expr::Ident(ident(name, SyntaxContext::empty())))
}

pub fn str_lit(value: impl Into<Atom>) -> ast::Str {
  ast::Str {
    span: DUMMY_SP,
    value: value.into(),
    raw: None,
  }
}

/// Whether `name` can be written as an identifier, either as a binding or a property key.
pub fn is_valid_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(c) if c == '$' || c == '_' || c.is_alphabetic() => {}
    _ => return false,
  }
  chars.all(|c| c == '$' || c == '_' || c.is_alphanumeric())
}
