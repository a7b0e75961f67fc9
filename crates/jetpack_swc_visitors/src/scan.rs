use ast::{ExportSpecifier, Expr, ModuleDecl, ModuleItem, Stmt};
use hashlink::{LinkedHashMap, LinkedHashSet};
use jetpack_common::{ImportedSpecifier, ReExportedSpecifier, Symbol};
use jetpack_swc_utils::{ExportNamedSpecifierExt, ImportNamedSpecifierExt, ModuleExportNameExt};
use rustc_hash::FxHashSet;
use swc_core::{
  common::{SyntaxContext, DUMMY_SP},
  ecma::{ast, atoms::Atom, utils::find_pat_ids},
};

/// Called while scanning, in source order, for every statement that pulls in another module.
/// This is how the graph grows while a module is still being processed.
pub trait ScanHooks {
  fn on_import_declaration(&mut self, _decl: &ast::ImportDecl) -> jetpack_error::Result<()> {
    Ok(())
  }

  fn on_export_named_with_source(&mut self, _decl: &ast::NamedExport) -> jetpack_error::Result<()> {
    Ok(())
  }

  fn on_export_all_with_source(&mut self, _decl: &ast::ExportAll) -> jetpack_error::Result<()> {
    Ok(())
  }
}

pub struct NoopScanHooks;

impl ScanHooks for NoopScanHooks {}

#[derive(Debug, Default)]
pub struct ScanResult {
  /// Every specifier referenced by an import or an export-with-source, in source order.
  pub dependencies: LinkedHashSet<Atom>,
  pub imports: LinkedHashMap<Atom, Vec<ImportedSpecifier>>,
  // Representations of special cases
  // `export default 'hello'` : "default" => ("default", top_level_ctxt), a facade binding
  // introduced by the scanner.
  pub local_exports: LinkedHashMap<Atom, Symbol>,
  // `export * as foo from './src'` is recorded with `imported: "*"`.
  pub re_exports: LinkedHashMap<Atom, Vec<ReExportedSpecifier>>,
  pub re_export_all: LinkedHashSet<Atom>,
  pub default_facade: Option<Symbol>,
}

impl ScanResult {
  pub fn is_import_binding(&self, symbol: &Symbol) -> bool {
    self
      .imports
      .values()
      .flatten()
      .any(|spec| &spec.imported_as == symbol)
  }

  pub fn find_import_binding(&self, symbol: &Symbol) -> Option<(&Atom, &ImportedSpecifier)> {
    self.imports.iter().find_map(|(source, specs)| {
      specs
        .iter()
        .find(|spec| &spec.imported_as == symbol)
        .map(|spec| (source, spec))
    })
  }
}

/// Collects the import/export records of a module.
///
/// Notices
/// 1. Though the pass is named scan, default exports are rewritten here so that every
///    module exports `default` through a real binding:
///    - `export default expr` becomes `var default = expr`.
///    - `export default function () {}` becomes `function default() {}`.
///    - `export default function foo() {}` becomes `function foo() {}` followed by `var default = foo`.
///
///    `default` can't be written by users, so the facade never collides with user code.
///    It is renamed to a valid name before code generation.
pub fn scan(
  ast: &mut ast::Module,
  top_level_ctxt: SyntaxContext,
  hooks: &mut dyn ScanHooks,
) -> jetpack_error::Result<ScanResult> {
  let mut scanner = Scanner::new(top_level_ctxt);
  let body = std::mem::take(&mut ast.body);
  let mut rewritten = Vec::with_capacity(body.len());

  for item in body {
    match item {
      ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => {
        hooks.on_import_declaration(&decl)?;
        scanner.scan_import(&decl);
        rewritten.push(ModuleItem::ModuleDecl(ModuleDecl::Import(decl)));
      }
      ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(decl)) => {
        if decl.src.is_some() {
          hooks.on_export_named_with_source(&decl)?;
        }
        scanner.scan_export_named(&decl)?;
        rewritten.push(ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(decl)));
      }
      ModuleItem::ModuleDecl(ModuleDecl::ExportAll(decl)) => {
        hooks.on_export_all_with_source(&decl)?;
        scanner.add_dependency(decl.src.value.clone());
        scanner.result.re_export_all.insert(decl.src.value.clone());
        rewritten.push(ModuleItem::ModuleDecl(ModuleDecl::ExportAll(decl)));
      }
      ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(decl)) => {
        scanner.scan_export_decl(&decl.decl)?;
        rewritten.push(ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(decl)));
      }
      ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(decl)) => {
        let facade = scanner.add_default_facade()?;
        rewritten.push(var_stmt(facade, decl.expr, decl.span));
      }
      ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(decl)) => {
        scanner.rewrite_default_decl(decl, &mut rewritten)?;
      }
      other => rewritten.push(other),
    }
  }

  ast.body = rewritten;
  Ok(scanner.result)
}

struct Scanner {
  result: ScanResult,
  // Record exported names to check if there are duplicated exports
  exported_names: FxHashSet<Atom>,
  top_level_ctxt: SyntaxContext,
}

impl Scanner {
  fn new(top_level_ctxt: SyntaxContext) -> Self {
    Self {
      result: Default::default(),
      exported_names: Default::default(),
      top_level_ctxt,
    }
  }

  fn facade_default_ident(&self) -> ast::Ident {
    ast::Ident::new("default".into(), DUMMY_SP, self.top_level_ctxt)
  }

  fn add_dependency(&mut self, specifier: Atom) {
    self.result.dependencies.insert(specifier);
  }

  fn check_is_already_exported(&mut self, exported_name: &Atom) -> jetpack_error::Result<()> {
    if self.exported_names.insert(exported_name.clone()) {
      Ok(())
    } else {
      Err(jetpack_error::Error::duplicate_export(exported_name.to_string()))
    }
  }

  fn add_local_export(&mut self, exported_as: Atom, local: Symbol) -> jetpack_error::Result<()> {
    self.check_is_already_exported(&exported_as)?;
    self.result.local_exports.insert(exported_as, local);
    Ok(())
  }

  fn add_default_facade(&mut self) -> jetpack_error::Result<ast::Ident> {
    let facade = self.facade_default_ident();
    let symbol = Symbol::from(&facade);
    self.add_local_export("default".into(), symbol.clone())?;
    self.result.default_facade = Some(symbol);
    Ok(facade)
  }

  fn add_re_export(&mut self, source: &Atom, spec: ReExportedSpecifier) -> jetpack_error::Result<()> {
    self.check_is_already_exported(&spec.exported_as)?;
    self
      .result
      .re_exports
      .entry(source.clone())
      .or_insert_with(Default::default)
      .push(spec);
    Ok(())
  }

  fn scan_import(&mut self, decl: &ast::ImportDecl) {
    let source = decl.src.value.clone();
    self.add_dependency(source.clone());
    let specs = self.result.imports.entry(source).or_insert_with(Default::default);
    decl.specifiers.iter().for_each(|specifier| {
      let (imported, imported_as) = match specifier {
        ast::ImportSpecifier::Named(s) => (s.imported_name().clone(), s.imported_as_ident()),
        ast::ImportSpecifier::Default(s) => ("default".into(), &s.local),
        ast::ImportSpecifier::Namespace(s) => ("*".into(), &s.local),
      };
      specs.push(ImportedSpecifier {
        imported_as: imported_as.into(),
        imported,
      });
    });
  }

  fn scan_export_named(&mut self, decl: &ast::NamedExport) -> jetpack_error::Result<()> {
    match &decl.src {
      Some(source) => {
        let source = source.value.clone();
        self.add_dependency(source.clone());
        for specifier in &decl.specifiers {
          match specifier {
            ExportSpecifier::Named(s) => self.add_re_export(
              &source,
              ReExportedSpecifier {
                exported_as: s.exported_as_name().clone(),
                imported: s.local_name().clone(),
              },
            )?,
            // export * as name from './other'
            ExportSpecifier::Namespace(s) => self.add_re_export(
              &source,
              ReExportedSpecifier {
                exported_as: s.name.name().clone(),
                imported: "*".into(),
              },
            )?,
            // `export v from 'mod'` is a proposal the parser doesn't accept without a flag.
            ExportSpecifier::Default(s) => self.add_re_export(
              &source,
              ReExportedSpecifier {
                exported_as: s.exported.sym.clone(),
                imported: "default".into(),
              },
            )?,
          }
        }
      }
      None => {
        for specifier in &decl.specifiers {
          // export { name }
          if let ExportSpecifier::Named(s) = specifier {
            if let Some(local) = s.orig.as_ident() {
              self.add_local_export(s.exported_as_name().clone(), local.into())?;
            }
          }
        }
      }
    }
    Ok(())
  }

  fn scan_export_decl(&mut self, decl: &ast::Decl) -> jetpack_error::Result<()> {
    match decl {
      ast::Decl::Class(decl) => self.add_local_export(decl.ident.sym.clone(), (&decl.ident).into()),
      ast::Decl::Fn(decl) => self.add_local_export(decl.ident.sym.clone(), (&decl.ident).into()),
      ast::Decl::Var(decl) => {
        let declared: Vec<ast::Ident> = find_pat_ids(&decl.decls);
        declared
          .iter()
          .try_for_each(|ident| self.add_local_export(ident.sym.clone(), ident.into()))
      }
      _ => Ok(()),
    }
  }

  fn rewrite_default_decl(
    &mut self,
    decl: ast::ExportDefaultDecl,
    rewritten: &mut Vec<ModuleItem>,
  ) -> jetpack_error::Result<()> {
    let span = decl.span;
    let (named, stmt) = match decl.decl {
      ast::DefaultDecl::Fn(ast::FnExpr { ident, function }) => match ident {
        Some(ident) => (
          Some(ident.clone()),
          ast::Decl::Fn(ast::FnDecl {
            ident,
            declare: false,
            function,
          }),
        ),
        None => (
          None,
          ast::Decl::Fn(ast::FnDecl {
            ident: self.add_default_facade()?,
            declare: false,
            function,
          }),
        ),
      },
      ast::DefaultDecl::Class(ast::ClassExpr { ident, class }) => match ident {
        Some(ident) => (
          Some(ident.clone()),
          ast::Decl::Class(ast::ClassDecl {
            ident,
            declare: false,
            class,
          }),
        ),
        None => (
          None,
          ast::Decl::Class(ast::ClassDecl {
            ident: self.add_default_facade()?,
            declare: false,
            class,
          }),
        ),
      },
      ast::DefaultDecl::TsInterfaceDecl(_) => return Ok(()),
    };

    rewritten.push(ModuleItem::Stmt(Stmt::Decl(stmt)));
    if let Some(name) = named {
      let facade = self.add_default_facade()?;
      rewritten.push(var_stmt(facade, Box::new(Expr::Ident(name)), span));
    }
    Ok(())
  }
}

fn var_stmt(name: ast::Ident, init: Box<Expr>, span: swc_core::common::Span) -> ModuleItem {
  ModuleItem::Stmt(Stmt::Decl(ast::Decl::Var(Box::new(ast::VarDecl {
    span,
    kind: ast::VarDeclKind::Var,
    declare: false,
    decls: vec![ast::VarDeclarator {
      span,
      name: ast::Pat::Ident(name.into()),
      init: Some(init),
      definite: false,
    }],
    ..Default::default()
  }))))
}

#[cfg(test)]
mod tests {
  use jetpack_common::Loader;
  use swc_core::common::{Mark, GLOBALS};

  use super::*;

  fn scan_source(source: &str) -> jetpack_error::Result<(ast::Module, ScanResult)> {
    GLOBALS.set(&Default::default(), || {
      let mut module = jetpack_compiler::parse("/a.js", source, Loader::Js)?;
      let top_level_ctxt = SyntaxContext::empty().apply_mark(Mark::new());
      let result = scan(&mut module, top_level_ctxt, &mut NoopScanHooks)?;
      Ok((module, result))
    })
  }

  #[test]
  fn records_imports_and_exports() {
    let (_, result) = scan_source(
      r#"
      import a, { b as c } from './x';
      import * as ns from './y';
      export const d = 1, { e } = {};
      export { d as f };
      export { g as h, * as i } from './z';
      export * from './w';
      "#,
    )
    .unwrap();
    let deps: Vec<_> = result.dependencies.iter().map(|d| d.to_string()).collect();
    assert_eq!(deps, vec!["./x", "./y", "./z", "./w"]);
    let x = &result.imports[&Atom::from("./x")];
    assert_eq!(&*x[0].imported, "default");
    assert_eq!(&*x[1].imported, "b");
    assert_eq!(&**x[1].imported_as.name(), "c");
    assert!(result.imports[&Atom::from("./y")][0].is_namespace());
    let exported: Vec<_> = result.local_exports.keys().map(|k| k.to_string()).collect();
    assert_eq!(exported, vec!["d", "e", "f"]);
    assert_eq!(&*result.re_exports[&Atom::from("./z")][1].imported, "*");
    assert!(result.re_export_all.contains(&Atom::from("./w")));
  }

  #[test]
  fn default_export_expression_becomes_facade_var() {
    let (module, result) = scan_source("export default 1 + 2;").unwrap();
    assert_eq!(&**result.local_exports[&Atom::from("default")].name(), "default");
    assert!(matches!(
      module.body[0],
      ModuleItem::Stmt(Stmt::Decl(ast::Decl::Var(_)))
    ));
  }

  #[test]
  fn named_default_function_keeps_its_name() {
    let (module, result) = scan_source("export default function foo() {}").unwrap();
    assert_eq!(module.body.len(), 2);
    assert!(matches!(
      &module.body[0],
      ModuleItem::Stmt(Stmt::Decl(ast::Decl::Fn(f))) if &*f.ident.sym == "foo"
    ));
    assert_eq!(result.default_facade, Some(result.local_exports[&Atom::from("default")].clone()));
  }

  #[test]
  fn duplicate_export_is_an_error() {
    let err = scan_source("export const a = 1; export { a };").unwrap_err();
    assert_eq!(err.code(), jetpack_error::error_code::DUPLICATE_EXPORT);
  }
}
