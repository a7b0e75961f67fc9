use jetpack_swc_utils::{ident, is_valid_identifier, str_lit};
use swc_core::{
  common::{SyntaxContext, DUMMY_SP},
  ecma::{ast, atoms::Atom},
};

fn module_export_name(name: Atom) -> ast::ModuleExportName {
  if is_valid_identifier(&name) {
    ast::ModuleExportName::Ident(ident(name, SyntaxContext::empty()))
  } else {
    ast::ModuleExportName::Str(str_lit(name))
  }
}

/// `export { local as exported, ... };`, sorted by exported name.
pub fn build_exports_stmt(mut exports: Vec<(Atom, Atom)>) -> ast::ModuleItem {
  use ast::{ExportNamedSpecifier, ExportSpecifier, ModuleDecl, NamedExport};
  exports.sort_by(|a, b| a.0.cmp(&b.0));

  ast::ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(NamedExport {
    span: DUMMY_SP,
    specifiers: exports
      .into_iter()
      .map(|(exported, local)| {
        let exported = (exported != local).then(|| module_export_name(exported));
        ExportSpecifier::Named(ExportNamedSpecifier {
          span: DUMMY_SP,
          orig: ast::ModuleExportName::Ident(ident(local, SyntaxContext::empty())),
          exported,
          is_type_only: false,
        })
      })
      .collect::<Vec<_>>(),
    src: None,
    type_only: false,
    with: None,
  }))
}

/// `var name = { __proto__: null, get a() { return a$1; }, ... };`
///
/// Getters keep reads live without a runtime module object.
pub fn build_namespace_object_stmt(var_name: Atom, mut exports: Vec<(Atom, Atom)>) -> ast::ModuleItem {
  use ast::*;
  exports.sort_by(|a, b| a.0.cmp(&b.0));
  let props = [PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
    key: PropName::Ident(IdentName::new("__proto__".into(), DUMMY_SP)),
    value: Box::new(Expr::Lit(Lit::Null(Null { span: DUMMY_SP }))),
  })))]
  .into_iter()
  .chain(exports.into_iter().map(|(exported_name, local)| {
    PropOrSpread::Prop(Box::new(Prop::Getter(GetterProp {
      span: DUMMY_SP,
      key: if is_valid_identifier(&exported_name) {
        PropName::Ident(IdentName::new(exported_name, DUMMY_SP))
      } else {
        PropName::Str(str_lit(exported_name))
      },
      type_ann: None,
      body: Some(BlockStmt {
        stmts: vec![Stmt::Return(ReturnStmt {
          span: DUMMY_SP,
          arg: Some(Box::new(Expr::Ident(ident(local, SyntaxContext::empty())))),
        })],
        ..Default::default()
      }),
    })))
  }))
  .collect::<Vec<_>>();

  ModuleItem::Stmt(Stmt::Decl(Decl::Var(Box::new(VarDecl {
    span: DUMMY_SP,
    kind: VarDeclKind::Var,
    declare: false,
    decls: vec![VarDeclarator {
      span: DUMMY_SP,
      definite: false,
      name: Pat::Ident(ident(var_name, SyntaxContext::empty()).into()),
      init: Some(Box::new(Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props,
      }))),
    }],
    ..Default::default()
  }))))
}

/// `import * as alias from 'source';`
pub fn build_namespace_import(source: Atom, alias: Atom) -> ast::ModuleItem {
  build_import(
    source,
    vec![ast::ImportSpecifier::Namespace(ast::ImportStarAsSpecifier {
      span: DUMMY_SP,
      local: ident(alias, SyntaxContext::empty()),
    })],
  )
}

/// `import default_alias, { name as alias, ... } from 'source';`
///
/// Without any specifier this is a side effect import, `import 'source';`.
pub fn build_named_import(source: Atom, default: Option<Atom>, named: Vec<(Atom, Atom)>) -> ast::ModuleItem {
  let mut specifiers = vec![];
  if let Some(default) = default {
    specifiers.push(ast::ImportSpecifier::Default(ast::ImportDefaultSpecifier {
      span: DUMMY_SP,
      local: ident(default, SyntaxContext::empty()),
    }));
  }
  specifiers.extend(named.into_iter().map(|(imported, alias)| {
    let imported = (imported != alias).then(|| module_export_name(imported));
    ast::ImportSpecifier::Named(ast::ImportNamedSpecifier {
      span: DUMMY_SP,
      local: ident(alias, SyntaxContext::empty()),
      imported,
      is_type_only: false,
    })
  }));
  build_import(source, specifiers)
}

/// `export * from 'source';`
pub fn build_export_all(source: Atom) -> ast::ModuleItem {
  ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportAll(ast::ExportAll {
    span: DUMMY_SP,
    src: Box::new(str_lit(source)),
    type_only: false,
    with: None,
  }))
}

fn build_import(source: Atom, specifiers: Vec<ast::ImportSpecifier>) -> ast::ModuleItem {
  ast::ModuleItem::ModuleDecl(ast::ModuleDecl::Import(ast::ImportDecl {
    span: DUMMY_SP,
    specifiers,
    src: Box::new(str_lit(source)),
    type_only: false,
    with: None,
    phase: Default::default(),
  }))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exports_are_sorted_and_shortened() {
    let item = build_exports_stmt(vec![("b".into(), "b$1".into()), ("a".into(), "a".into())]);
    let ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportNamed(export)) = item else {
      unreachable!()
    };
    let ast::ExportSpecifier::Named(first) = &export.specifiers[0] else {
      unreachable!()
    };
    assert!(first.exported.is_none());
    let ast::ExportSpecifier::Named(second) = &export.specifiers[1] else {
      unreachable!()
    };
    assert!(second.exported.is_some());
  }

  #[test]
  fn namespace_object_has_null_prototype() {
    let item = build_namespace_object_stmt("ns".into(), vec![("x".into(), "x$1".into())]);
    let ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Var(var))) = item else {
      unreachable!()
    };
    let Some(ast::Expr::Object(object)) = var.decls[0].init.as_deref() else {
      unreachable!()
    };
    assert_eq!(object.props.len(), 2);
  }

  #[test]
  fn import_without_specifiers() {
    let item = build_named_import("polyfill".into(), None, vec![]);
    let ast::ModuleItem::ModuleDecl(ast::ModuleDecl::Import(import)) = item else {
      unreachable!()
    };
    assert!(import.specifiers.is_empty());
  }
}
