use swc_core::ecma::ast::{self, ModuleDecl, ModuleItem, Stmt};

/// Strips module syntax once every binding has its final name.
///
/// - `export const a = 1` becomes `const a = 1`.
/// - `export { a }`, `export ... from` and `export * from` are dropped, they were folded into the export table.
/// - Imports are dropped. Local imports are links to already renamed bindings, external imports are
///   emitted once for the whole bundle.
///
/// Default exports were already rewritten by the scanner.
pub fn lower_module_decls(module: &mut ast::Module) {
  let body = std::mem::take(&mut module.body);
  module.body = body
    .into_iter()
    .filter_map(|item| match item {
      ModuleItem::ModuleDecl(decl) => match decl {
        ModuleDecl::ExportDecl(export) => Some(ModuleItem::Stmt(Stmt::Decl(export.decl))),
        ModuleDecl::ExportDefaultExpr(export) => {
          Some(ModuleItem::Stmt(Stmt::Expr(ast::ExprStmt {
            span: export.span,
            expr: export.expr,
          })))
        }
        ModuleDecl::Import(_)
        | ModuleDecl::ExportNamed(_)
        | ModuleDecl::ExportAll(_)
        | ModuleDecl::ExportDefaultDecl(_) => None,
        other => {
          tracing::debug!("drop unsupported module declaration: {:?}", other);
          None
        }
      },
      stmt => Some(stmt),
    })
    .collect();
}

#[cfg(test)]
mod tests {
  use jetpack_common::Loader;

  use super::*;

  #[test]
  fn keeps_declarations_drops_links() {
    let mut module = jetpack_compiler::parse(
      "/a.js",
      "import { b } from './b';\nexport const a = b;\nexport { a as c };\nexport * from './d';\nfoo();",
      Loader::Js,
    )
    .unwrap();
    lower_module_decls(&mut module);
    assert_eq!(module.body.len(), 2);
    assert!(matches!(
      module.body[0],
      ModuleItem::Stmt(Stmt::Decl(ast::Decl::Var(_)))
    ));
    assert!(matches!(module.body[1], ModuleItem::Stmt(Stmt::Expr(_))));
  }
}
