use rustc_hash::FxHashMap;
use swc_core::{
  common::{util::take::Take, Span, DUMMY_SP},
  ecma::{
    ast::{self, Id, Ident, IdentName, PropName},
    atoms::Atom,
    visit::{noop_visit_mut_type, VisitMut, VisitMutWith},
  },
};

/// Applies the final names of a module to its AST.
///
/// Identifiers keep their span and context, only the symbol changes.
pub fn renamer(rename_map: &FxHashMap<Id, Atom>) -> impl VisitMut + '_ {
  Renamer { rename_map }
}

struct Renamer<'a> {
  rename_map: &'a FxHashMap<Id, Atom>,
}

impl<'a> Renamer<'a> {
  /// Turn `obj = ({ a })` to `obj = ({ a: a })`
  /// After expanding, if the property `a` is renamed to `b`,
  /// the output would be `{ a: b }`. The expr `obj.a` is still valid.
  fn expand_shorthand(&self, prop: &mut ast::Prop) -> bool {
    match prop {
      ast::Prop::Shorthand(ident) if self.rename_map.contains_key(&ident.to_id()) => {
        let key = IdentName::new(ident.sym.clone(), ident.span);
        *prop = ast::Prop::KeyValue(ast::KeyValueProp {
          key: PropName::Ident(key),
          value: Box::new(ast::Expr::Ident(ident.take())),
        });
        true
      }
      _ => false,
    }
  }

  fn undo_expand_shorthand(&self, prop: &mut ast::Prop, shorthanded: bool) {
    if !shorthanded {
      return;
    }
    if let ast::Prop::KeyValue(ast::KeyValueProp {
      key: PropName::Ident(key),
      value,
    }) = prop
    {
      if let ast::Expr::Ident(value) = value.as_mut() {
        if key.sym == value.sym {
          *prop = ast::Prop::Shorthand(value.take())
        }
      }
    }
  }

  /// If the property `foo` is renamed `foo2`, we need to keep the semantics of ObjectPatProp.
  /// turn `const { foo } = { foo }`
  /// into `const { foo: foo2 } = { foo }`
  /// instead `const { foo2 } = { foo }`
  fn keep_semantics_of_object_pat_prop(&self, node: &mut ast::ObjectPatProp) -> Option<Span> {
    let ast::ObjectPatProp::Assign(prop) = node else {
      return None;
    };
    if !self.rename_map.contains_key(&prop.key.id.to_id()) {
      return None;
    }
    let prop_span = prop.span;
    let key = PropName::Ident(IdentName::new(prop.key.id.sym.clone(), prop.key.id.span));
    let binding = ast::Pat::Ident(ast::BindingIdent {
      id: prop.key.id.take(),
      type_ann: prop.key.type_ann.take(),
    });
    let value = match prop.value.take() {
      // handle case `const { foo = 1 } = { foo }`
      Some(default) => ast::Pat::Assign(ast::AssignPat {
        span: DUMMY_SP,
        left: Box::new(binding),
        right: default,
      }),
      None => binding,
    };
    *node = ast::ObjectPatProp::KeyValue(ast::KeyValuePatProp {
      key,
      value: Box::new(value),
    });
    Some(prop_span)
  }

  fn undo_keep_semantics_of_object_pat_prop(&self, node: &mut ast::ObjectPatProp, changed: Option<Span>) {
    let Some(assign_prop_span) = changed else {
      return;
    };
    if let ast::ObjectPatProp::KeyValue(ast::KeyValuePatProp {
      key: PropName::Ident(key),
      value,
    }) = node
    {
      match value.as_mut() {
        ast::Pat::Ident(binding) if key.sym == binding.id.sym => {
          *node = ast::ObjectPatProp::Assign(ast::AssignPatProp {
            span: assign_prop_span,
            key: binding.id.take().into(),
            value: None,
          })
        }
        ast::Pat::Assign(ast::AssignPat { left, right, .. }) => {
          if let ast::Pat::Ident(binding) = left.as_mut() {
            if key.sym == binding.id.sym {
              *node = ast::ObjectPatProp::Assign(ast::AssignPatProp {
                span: assign_prop_span,
                key: binding.id.take().into(),
                value: Some(right.take()),
              })
            }
          }
        }
        _ => {}
      }
    }
  }
}

impl<'a> VisitMut for Renamer<'a> {
  noop_visit_mut_type!();

  fn visit_mut_ident(&mut self, ident: &mut Ident) {
    if let Some(name) = self.rename_map.get(&ident.to_id()) {
      ident.sym = name.clone();
    }
  }

  fn visit_mut_prop(&mut self, prop: &mut ast::Prop) {
    let shorthanded = self.expand_shorthand(prop);
    prop.visit_mut_children_with(self);
    self.undo_expand_shorthand(prop, shorthanded);
  }

  fn visit_mut_object_pat_prop(&mut self, node: &mut ast::ObjectPatProp) {
    let changed = self.keep_semantics_of_object_pat_prop(node);
    node.visit_mut_children_with(self);
    self.undo_keep_semantics_of_object_pat_prop(node, changed);
  }

  // `import { a }` keeps importing `a` when the local binding is renamed.
  fn visit_mut_import_named_specifier(&mut self, node: &mut ast::ImportNamedSpecifier) {
    if node.imported.is_none() && self.rename_map.contains_key(&node.local.to_id()) {
      node.imported = Some(ast::ModuleExportName::Ident(Ident::new_no_ctxt(
        node.local.sym.clone(),
        DUMMY_SP,
      )));
    }
    node.local.visit_mut_with(self);
  }

  // `export { a }` keeps exporting `a` when the local binding is renamed.
  fn visit_mut_export_named_specifier(&mut self, node: &mut ast::ExportNamedSpecifier) {
    if let ast::ModuleExportName::Ident(orig) = &node.orig {
      if node.exported.is_none() && self.rename_map.contains_key(&orig.to_id()) {
        node.exported = Some(ast::ModuleExportName::Ident(Ident::new_no_ctxt(
          orig.sym.clone(),
          DUMMY_SP,
        )));
      }
    }
    node.orig.visit_mut_with(self);
  }

  // Labels are never bindings.
  fn visit_mut_labeled_stmt(&mut self, node: &mut ast::LabeledStmt) {
    node.body.visit_mut_with(self);
  }

  fn visit_mut_break_stmt(&mut self, _: &mut ast::BreakStmt) {}

  fn visit_mut_continue_stmt(&mut self, _: &mut ast::ContinueStmt) {}
}

#[cfg(test)]
mod tests {
  use jetpack_common::Loader;
  use swc_core::common::{Mark, SyntaxContext, GLOBALS};

  use super::*;
  use crate::build_scope_tree;

  /// Renames root variables with `(old, new)` pairs and returns the rewritten module.
  fn rename(source: &str, pairs: &[(&str, &str)]) -> ast::Module {
    GLOBALS.set(&Default::default(), || {
      let mut module = jetpack_compiler::parse("/a.js", source, Loader::Js).unwrap();
      let unresolved_mark = Mark::new();
      crate::resolve(&mut module, unresolved_mark, Mark::new());
      let mut tree = build_scope_tree(
        &module,
        SyntaxContext::empty().apply_mark(unresolved_mark),
        source,
      )
      .unwrap();
      let root = tree.root();
      let renames = pairs
        .iter()
        .map(|(old, new)| (tree.scope(root).get(&Atom::from(*old)).unwrap(), Atom::from(*new)))
        .collect();
      tree.batch_rename(root, renames).unwrap();
      let map = tree.rename_map();
      module.visit_mut_with(&mut renamer(&map));
      module
    })
  }

  fn first_var_init(module: &ast::Module, idx: usize) -> &ast::Expr {
    match &module.body[idx] {
      ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Var(var))) => {
        var.decls[0].init.as_deref().unwrap()
      }
      _ => unreachable!(),
    }
  }

  #[test]
  fn expands_renamed_shorthand() {
    let module = rename("const a = 1; const o = { a };", &[("a", "b")]);
    let ast::Expr::Object(object) = first_var_init(&module, 1) else {
      unreachable!()
    };
    match &object.props[0] {
      ast::PropOrSpread::Prop(prop) => match prop.as_ref() {
        ast::Prop::KeyValue(kv) => {
          assert!(matches!(&kv.key, PropName::Ident(key) if &*key.sym == "a"));
          assert!(matches!(kv.value.as_ref(), ast::Expr::Ident(value) if &*value.sym == "b"));
        }
        _ => unreachable!(),
      },
      _ => unreachable!(),
    }
  }

  #[test]
  fn keeps_object_pattern_key() {
    let module = rename("const { a = 1 } = {}; a;", &[("a", "c")]);
    let ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Var(var))) = &module.body[0] else {
      unreachable!()
    };
    let ast::Pat::Object(pat) = &var.decls[0].name else {
      unreachable!()
    };
    assert!(matches!(&pat.props[0], ast::ObjectPatProp::KeyValue(kv)
      if matches!(&kv.key, PropName::Ident(key) if &*key.sym == "a")));
  }

  #[test]
  fn module_specifiers_keep_public_names() {
    let module = rename(
      "import { a } from 'x'; const b = a; export { b };",
      &[("a", "q"), ("b", "w")],
    );
    let ast::ModuleItem::ModuleDecl(ast::ModuleDecl::Import(import)) = &module.body[0] else {
      unreachable!()
    };
    let ast::ImportSpecifier::Named(spec) = &import.specifiers[0] else {
      unreachable!()
    };
    assert_eq!(&*spec.local.sym, "q");
    assert!(matches!(&spec.imported, Some(ast::ModuleExportName::Ident(i)) if &*i.sym == "a"));

    let ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportNamed(export)) = &module.body[2] else {
      unreachable!()
    };
    let ast::ExportSpecifier::Named(spec) = &export.specifiers[0] else {
      unreachable!()
    };
    assert!(matches!(&spec.orig, ast::ModuleExportName::Ident(i) if &*i.sym == "w"));
    assert!(matches!(&spec.exported, Some(ast::ModuleExportName::Ident(i)) if &*i.sym == "b"));
  }

  #[test]
  fn leaves_members_and_labels_alone() {
    let module = rename("const a = 1; a: for (;;) { a.a; break a; }", &[("a", "b")]);
    let ast::ModuleItem::Stmt(ast::Stmt::Labeled(labeled)) = &module.body[1] else {
      unreachable!()
    };
    assert_eq!(&*labeled.label.sym, "a");
  }
}
