use swc_core::ecma::ast::{self, ModuleDecl, ModuleExportName};

use crate::CodeGen;

impl<'a> CodeGen<'a> {
  pub(crate) fn emit_module_decl(&mut self, decl: &ModuleDecl) {
    match decl {
      ModuleDecl::Import(import) => self.emit_import(import),
      ModuleDecl::ExportDecl(export) => {
        self.write("export ");
        self.emit_decl(&export.decl);
      }
      ModuleDecl::ExportNamed(export) => self.emit_export_named(export),
      ModuleDecl::ExportDefaultDecl(export) => {
        self.write("export default ");
        match &export.decl {
          ast::DefaultDecl::Class(class) => self.emit_class(class.ident.as_ref(), &class.class),
          ast::DefaultDecl::Fn(func) => self.emit_function(func.ident.as_ref(), &func.function),
          ast::DefaultDecl::TsInterfaceDecl(_) => {}
        }
      }
      ModuleDecl::ExportDefaultExpr(export) => {
        self.write("export default ");
        self.emit_expr_in_statement_position(&export.expr);
        self.write(";");
      }
      ModuleDecl::ExportAll(export) => {
        self.write("export *");
        self.write_from(&export.src);
      }
      other => tracing::debug!("skip unsupported module declaration: {:?}", other),
    }
  }

  fn emit_import(&mut self, import: &ast::ImportDecl) {
    self.write("import");
    self.write_space(" ");
    if import.specifiers.is_empty() {
      self.emit_str(&import.src);
      self.write(";");
      return;
    }
    let mut named = vec![];
    let mut wrote_any = false;
    for specifier in &import.specifiers {
      match specifier {
        ast::ImportSpecifier::Default(default) => {
          self.emit_ident(&default.local);
          wrote_any = true;
        }
        ast::ImportSpecifier::Namespace(namespace) => {
          if wrote_any {
            self.write_comma();
          }
          self.write("* as ");
          self.emit_ident(&namespace.local);
          wrote_any = true;
        }
        ast::ImportSpecifier::Named(specifier) => named.push(specifier),
      }
    }
    if !named.is_empty() {
      if wrote_any {
        self.write_comma();
      }
      self.write("{");
      self.write_space(" ");
      for (idx, specifier) in named.into_iter().enumerate() {
        if idx > 0 {
          self.write_comma();
        }
        if let Some(imported) = &specifier.imported {
          self.emit_module_export_name(imported);
          self.write(" as ");
        }
        self.emit_ident(&specifier.local);
      }
      self.write_space(" ");
      self.write("}");
    }
    self.write_from(&import.src);
  }

  fn emit_export_named(&mut self, export: &ast::NamedExport) {
    self.write("export");
    self.write_space(" ");
    if let [ast::ExportSpecifier::Namespace(namespace)] = export.specifiers.as_slice() {
      self.write("* as ");
      self.emit_module_export_name(&namespace.name);
    } else {
      self.write("{");
      self.write_space(" ");
      for (idx, specifier) in export.specifiers.iter().enumerate() {
        if idx > 0 {
          self.write_comma();
        }
        match specifier {
          ast::ExportSpecifier::Named(specifier) => {
            self.emit_module_export_name(&specifier.orig);
            if let Some(exported) = &specifier.exported {
              self.write(" as ");
              self.emit_module_export_name(exported);
            }
          }
          ast::ExportSpecifier::Default(default) => self.emit_ident(&default.exported),
          ast::ExportSpecifier::Namespace(namespace) => {
            self.write("* as ");
            self.emit_module_export_name(&namespace.name);
          }
        }
      }
      self.write_space(" ");
      self.write("}");
    }
    match &export.src {
      Some(src) => self.write_from(src),
      None => self.write(";"),
    }
  }

  fn emit_module_export_name(&mut self, name: &ModuleExportName) {
    match name {
      ModuleExportName::Ident(ident) => self.emit_ident(ident),
      ModuleExportName::Str(str) => self.emit_str(str),
    }
  }

  /// ` from 'src';`
  fn write_from(&mut self, src: &ast::Str) {
    self.write_space(" ");
    self.write("from");
    self.write_space(" ");
    self.emit_str(src);
    self.write(";");
  }
}
