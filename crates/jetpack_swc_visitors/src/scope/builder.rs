use jetpack_common::LineIndex;
use swc_core::{
  common::SyntaxContext,
  ecma::{
    ast::{self, Id},
    atoms::Atom,
    visit::{noop_visit_type, Visit, VisitWith},
  },
};

use super::{BindingKind, ScopeId, ScopeKind, ScopeTree, VariableId};

/// Builds the scope tree of a module that has been through the resolver.
///
/// Fails with a duplicate binding error on the first illegal redeclaration.
pub fn build_scope_tree(
  module: &ast::Module,
  unresolved_ctxt: SyntaxContext,
  source: &str,
) -> jetpack_error::Result<ScopeTree> {
  let mut builder = ScopeBuilder {
    tree: ScopeTree::new(),
    current: ScopeId(0),
    references: vec![],
    unresolved: vec![],
    duplicate: None,
    unresolved_ctxt,
  };
  module.visit_with(&mut builder);

  if let Some((existing, name)) = builder.duplicate {
    let pos = builder.tree.variable(existing).declared_at;
    let (line, column) =
      LineIndex::new(source).position(source, pos.0.saturating_sub(1) as usize);
    return Err(jetpack_error::Error::duplicate_binding(
      name.to_string(),
      line + 1,
      column,
    ));
  }

  // References are resolved after every declaration is known, functions and `var`s are hoisted.
  let mut tree = builder.tree;
  builder
    .references
    .iter()
    .for_each(|(id, scope)| tree.add_reference(id, *scope));
  builder
    .unresolved
    .into_iter()
    .for_each(|(name, scope)| tree.add_unresolved_reference(name, scope));
  Ok(tree)
}

struct ScopeBuilder {
  tree: ScopeTree,
  current: ScopeId,
  references: Vec<(Id, ScopeId)>,
  unresolved: Vec<(Atom, ScopeId)>,
  duplicate: Option<(VariableId, Atom)>,
  unresolved_ctxt: SyntaxContext,
}

impl ScopeBuilder {
  fn with_scope(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self)) {
    let parent = self.current;
    self.current = self.tree.add_scope(kind, parent);
    f(self);
    self.current = parent;
  }

  /// The scope `var` declarations and non-lexical functions land in.
  fn var_scope(&self) -> ScopeId {
    let mut scope = self.current;
    loop {
      let s = self.tree.scope(scope);
      match (s.kind, s.parent) {
        (ScopeKind::Function | ScopeKind::Module, _) | (_, None) => return scope,
        (_, Some(parent)) => scope = parent,
      }
    }
  }

  fn declare_ident(&mut self, ident: &ast::Ident, kind: BindingKind) {
    let (scope, lexical) = match kind {
      BindingKind::Var => (self.var_scope(), false),
      BindingKind::Function => {
        let lexical = matches!(
          self.tree.scope(self.current).kind,
          ScopeKind::Module | ScopeKind::Block | ScopeKind::Catch
        );
        (self.current, lexical)
      }
      BindingKind::Param | BindingKind::CatchParam => (self.current, false),
      BindingKind::Let | BindingKind::Const | BindingKind::Class | BindingKind::Import => {
        (self.current, true)
      }
    };
    if let Err(existing) = self.tree.declare(scope, ident.to_id(), kind, lexical, ident.span.lo) {
      if self.duplicate.is_none() {
        self.duplicate = Some((existing, ident.sym.clone()));
      }
    }
  }

  fn declare_pat(&mut self, pat: &ast::Pat, kind: BindingKind) {
    match pat {
      ast::Pat::Ident(binding) => self.declare_ident(&binding.id, kind),
      ast::Pat::Array(array) => array
        .elems
        .iter()
        .flatten()
        .for_each(|elem| self.declare_pat(elem, kind)),
      ast::Pat::Rest(rest) => self.declare_pat(&rest.arg, kind),
      ast::Pat::Object(object) => {
        for prop in &object.props {
          match prop {
            ast::ObjectPatProp::KeyValue(kv) => {
              kv.key.visit_with(self);
              self.declare_pat(&kv.value, kind);
            }
            ast::ObjectPatProp::Assign(assign) => {
              self.declare_ident(&assign.key.id, kind);
              assign.value.visit_with(self);
            }
            ast::ObjectPatProp::Rest(rest) => self.declare_pat(&rest.arg, kind),
          }
        }
      }
      ast::Pat::Assign(assign) => {
        self.declare_pat(&assign.left, kind);
        assign.right.visit_with(self);
      }
      // `for (a.b of c)`, not a declaration
      ast::Pat::Expr(expr) => expr.visit_with(self),
      ast::Pat::Invalid(_) => {}
    }
  }

  fn visit_function_body(&mut self, function: &ast::Function) {
    self.with_scope(ScopeKind::Function, |this| {
      function.decorators.visit_with(this);
      function
        .params
        .iter()
        .for_each(|param| this.declare_pat(&param.pat, BindingKind::Param));
      if let Some(body) = &function.body {
        body.stmts.visit_with(this);
      }
    });
  }
}

impl Visit for ScopeBuilder {
  noop_visit_type!();

  fn visit_ident(&mut self, ident: &ast::Ident) {
    if ident.ctxt == self.unresolved_ctxt {
      self.unresolved.push((ident.sym.clone(), self.current));
    } else {
      self.references.push((ident.to_id(), self.current));
    }
  }

  fn visit_import_decl(&mut self, decl: &ast::ImportDecl) {
    decl.specifiers.iter().for_each(|spec| {
      let local = match spec {
        ast::ImportSpecifier::Named(s) => &s.local,
        ast::ImportSpecifier::Default(s) => &s.local,
        ast::ImportSpecifier::Namespace(s) => &s.local,
      };
      self.declare_ident(local, BindingKind::Import);
    });
  }

  fn visit_named_export(&mut self, decl: &ast::NamedExport) {
    // `export { a } from './b'` doesn't reference a local binding
    if decl.src.is_some() {
      return;
    }
    decl.specifiers.iter().for_each(|spec| {
      if let ast::ExportSpecifier::Named(named) = spec {
        if let ast::ModuleExportName::Ident(orig) = &named.orig {
          self.visit_ident(orig);
        }
      }
    });
  }

  fn visit_export_all(&mut self, _: &ast::ExportAll) {}

  fn visit_var_decl(&mut self, decl: &ast::VarDecl) {
    let kind = match decl.kind {
      ast::VarDeclKind::Var => BindingKind::Var,
      ast::VarDeclKind::Let => BindingKind::Let,
      ast::VarDeclKind::Const => BindingKind::Const,
    };
    decl.decls.iter().for_each(|declarator| {
      self.declare_pat(&declarator.name, kind);
      declarator.init.visit_with(self);
    });
  }

  fn visit_fn_decl(&mut self, decl: &ast::FnDecl) {
    self.declare_ident(&decl.ident, BindingKind::Function);
    self.visit_function_body(&decl.function);
  }

  fn visit_fn_expr(&mut self, expr: &ast::FnExpr) {
    match &expr.ident {
      Some(ident) => self.with_scope(ScopeKind::Named, |this| {
        this.declare_ident(ident, BindingKind::Function);
        this.visit_function_body(&expr.function);
      }),
      None => self.visit_function_body(&expr.function),
    }
  }

  fn visit_function(&mut self, function: &ast::Function) {
    // Methods, getters and setters
    self.visit_function_body(function);
  }

  fn visit_arrow_expr(&mut self, arrow: &ast::ArrowExpr) {
    self.with_scope(ScopeKind::Function, |this| {
      arrow
        .params
        .iter()
        .for_each(|param| this.declare_pat(param, BindingKind::Param));
      match &*arrow.body {
        ast::BlockStmtOrExpr::BlockStmt(block) => block.stmts.visit_with(this),
        ast::BlockStmtOrExpr::Expr(expr) => expr.visit_with(this),
      }
    });
  }

  fn visit_setter_prop(&mut self, prop: &ast::SetterProp) {
    prop.key.visit_with(self);
    self.with_scope(ScopeKind::Function, |this| {
      this.declare_pat(&prop.param, BindingKind::Param);
      if let Some(body) = &prop.body {
        body.stmts.visit_with(this);
      }
    });
  }

  fn visit_constructor(&mut self, constructor: &ast::Constructor) {
    constructor.key.visit_with(self);
    self.with_scope(ScopeKind::Function, |this| {
      constructor.params.iter().for_each(|param| match param {
        ast::ParamOrTsParamProp::Param(param) => this.declare_pat(&param.pat, BindingKind::Param),
        ast::ParamOrTsParamProp::TsParamProp(_) => {}
      });
      if let Some(body) = &constructor.body {
        body.stmts.visit_with(this);
      }
    });
  }

  fn visit_class_decl(&mut self, decl: &ast::ClassDecl) {
    self.declare_ident(&decl.ident, BindingKind::Class);
    decl.class.visit_with(self);
  }

  fn visit_class_expr(&mut self, expr: &ast::ClassExpr) {
    match &expr.ident {
      Some(ident) => self.with_scope(ScopeKind::Named, |this| {
        this.declare_ident(ident, BindingKind::Class);
        expr.class.visit_with(this);
      }),
      None => expr.class.visit_with(self),
    }
  }

  fn visit_block_stmt(&mut self, block: &ast::BlockStmt) {
    self.with_scope(ScopeKind::Block, |this| block.stmts.visit_with(this));
  }

  fn visit_for_stmt(&mut self, stmt: &ast::ForStmt) {
    self.with_scope(ScopeKind::Block, |this| {
      stmt.init.visit_with(this);
      stmt.test.visit_with(this);
      stmt.update.visit_with(this);
      stmt.body.visit_with(this);
    });
  }

  fn visit_for_in_stmt(&mut self, stmt: &ast::ForInStmt) {
    self.with_scope(ScopeKind::Block, |this| {
      stmt.left.visit_with(this);
      stmt.right.visit_with(this);
      stmt.body.visit_with(this);
    });
  }

  fn visit_for_of_stmt(&mut self, stmt: &ast::ForOfStmt) {
    self.with_scope(ScopeKind::Block, |this| {
      stmt.left.visit_with(this);
      stmt.right.visit_with(this);
      stmt.body.visit_with(this);
    });
  }

  fn visit_switch_stmt(&mut self, stmt: &ast::SwitchStmt) {
    stmt.discriminant.visit_with(self);
    self.with_scope(ScopeKind::Block, |this| stmt.cases.visit_with(this));
  }

  fn visit_catch_clause(&mut self, clause: &ast::CatchClause) {
    self.with_scope(ScopeKind::Catch, |this| {
      if let Some(param) = &clause.param {
        this.declare_pat(param, BindingKind::CatchParam);
      }
      clause.body.stmts.visit_with(this);
    });
  }

  fn visit_labeled_stmt(&mut self, stmt: &ast::LabeledStmt) {
    stmt.body.visit_with(self);
  }

  fn visit_break_stmt(&mut self, _: &ast::BreakStmt) {}

  fn visit_continue_stmt(&mut self, _: &ast::ContinueStmt) {}
}

#[cfg(test)]
mod tests {
  use jetpack_common::Loader;
  use swc_core::common::{Mark, GLOBALS};

  use super::*;

  fn build(source: &str) -> jetpack_error::Result<ScopeTree> {
    GLOBALS.set(&Default::default(), || {
      let mut module = jetpack_compiler::parse("/a.js", source, Loader::Js)?;
      let unresolved_mark = Mark::new();
      crate::resolve(&mut module, unresolved_mark, Mark::new());
      build_scope_tree(
        &module,
        SyntaxContext::empty().apply_mark(unresolved_mark),
        source,
      )
    })
  }

  #[test]
  fn redeclared_let_is_a_duplicate_binding() {
    let err = build("let a = 1;\nfunction f() {}\nlet a = 2;").unwrap_err();
    assert_eq!(err.code(), jetpack_error::error_code::DUPLICATE_BINDING);
    assert_eq!(
      err.to_string(),
      "variable 'a' has been defined, location: 1:4"
    );
  }

  #[test]
  fn redeclared_var_is_fine() {
    assert!(build("var a = 1; var a = 2;").is_ok());
    assert!(build("function f(a) { var a; }").is_ok());
  }

  #[test]
  fn param_and_let_collide() {
    assert!(build("function f(a) { let a; }").is_err());
  }

  #[test]
  fn hoisted_function_is_not_unresolved() {
    let tree = build("f(); function f() { return g; }").unwrap();
    assert!(!tree.unresolved_names().contains(&Atom::from("f")));
    assert!(tree.unresolved_names().contains(&Atom::from("g")));
  }

  #[test]
  fn labels_and_property_names_are_not_references() {
    let tree = build("outer: for (;;) { break outer; } a.b; ({ c: 1 });").unwrap();
    let unresolved = tree.unresolved_names();
    assert!(unresolved.contains(&Atom::from("a")));
    assert!(!unresolved.contains(&Atom::from("outer")));
    assert!(!unresolved.contains(&Atom::from("b")));
    assert!(!unresolved.contains(&Atom::from("c")));
  }

  #[test]
  fn named_function_expression_has_its_own_scope() {
    let tree = build("const f = function g() { return g; };").unwrap();
    let (_, g) = tree.variables().find(|(_, v)| &*v.name == "g").unwrap();
    assert_eq!(tree.scope(g.scope).kind, ScopeKind::Named);
    assert_eq!(g.references.len(), 1);
  }
}
