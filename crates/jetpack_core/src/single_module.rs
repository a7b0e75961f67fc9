use std::cmp::Reverse;

use itertools::Itertools;
use jetpack_codegen::{print_module, CodeGenConfig};
use jetpack_common::Loader;
use jetpack_swc_visitors::{build_scope_tree, jsx_lowering, renamer, ScopeTree};
use rustc_hash::FxHashSet;
use swc_core::{
  common::{Mark, SyntaxContext, GLOBALS},
  ecma::{
    ast::{self, Decl, ModuleDecl, ModuleItem},
    atoms::Atom,
    utils::find_pat_ids,
    visit::VisitMutWith,
  },
};

use crate::{passes::rename_inner_scopes, NameGenerator, UnresolvedNameCollector, SWC_GLOBALS};

/// Parses one module and prints it back, minified when asked. Imports are left alone.
#[tracing::instrument(skip(source))]
pub fn parse_and_codegen(path: &str, source: &str, minify: bool, jsx: bool) -> jetpack_error::Result<String> {
  let loader = Loader::from_path(path, jsx);
  GLOBALS.set(&SWC_GLOBALS, || {
    let mut ast = jetpack_compiler::parse(path, source, loader)?;
    if loader.is_jsx() {
      ast.visit_mut_with(&mut jsx_lowering());
    }
    let unresolved_mark = Mark::new();
    jetpack_swc_visitors::resolve(&mut ast, unresolved_mark, Mark::new());
    let unresolved_ctxt = SyntaxContext::empty().apply_mark(unresolved_mark);

    if minify {
      let mut tree = build_scope_tree(&ast, unresolved_ctxt, source)?;
      minify_names(&mut tree, &exported_locals(&ast))?;
      ast.visit_mut_with(&mut renamer(&tree.rename_map()));
    }

    let config = CodeGenConfig {
      minify,
      unresolved_ctxt: Some(unresolved_ctxt),
      ..Default::default()
    };
    Ok(print_module(&ast, &config, None).content)
  })
}

/// Inner scopes first, then the root. Exported bindings keep their names.
fn minify_names(tree: &mut ScopeTree, exported: &FxHashSet<Atom>) -> jetpack_error::Result<()> {
  let mut collector = UnresolvedNameCollector::default();
  collector.insert_all(tree.unresolved_names());
  let mut generator = rename_inner_scopes(tree)?.with_prev(Box::new(collector));
  generator.reserve(exported);

  let root = tree.root();
  let renames = tree
    .scope(root)
    .variables
    .iter()
    .copied()
    .sorted_by_key(|var| Reverse(tree.variable(*var).references.len()))
    .filter(|var| !exported.contains(&tree.variable(*var).name))
    .filter_map(|var| {
      generator
        .next(&tree.variable(var).name)
        .map(|name| (var, name))
    })
    .collect();
  tree.batch_rename(root, renames)
}

/// Names of root bindings visible to importers of the module.
fn exported_locals(module: &ast::Module) -> FxHashSet<Atom> {
  let mut names = FxHashSet::default();
  for item in &module.body {
    let ModuleItem::ModuleDecl(decl) = item else {
      continue;
    };
    match decl {
      ModuleDecl::ExportDecl(export) => match &export.decl {
        Decl::Var(var) => {
          let ids: Vec<ast::Id> = find_pat_ids(&var.decls);
          names.extend(ids.into_iter().map(|(sym, _)| sym));
        }
        Decl::Fn(f) => {
          names.insert(f.ident.sym.clone());
        }
        Decl::Class(c) => {
          names.insert(c.ident.sym.clone());
        }
        _ => {}
      },
      ModuleDecl::ExportNamed(named) if named.src.is_none() => {
        for spec in &named.specifiers {
          if let ast::ExportSpecifier::Named(spec) = spec {
            if let ast::ModuleExportName::Ident(orig) = &spec.orig {
              names.insert(orig.sym.clone());
            }
          }
        }
      }
      _ => {}
    }
  }
  names
}
