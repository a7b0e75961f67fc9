use std::cmp::Reverse;

use jetpack_error::{BuildError, Diagnostic};
use jetpack_swc_visitors::{ScopeId, ScopeTree};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::{MinifyNameGenerator, ModuleGraph, NameGenerator};

/// Gives every variable below the root scope a minified name, children before parents.
///
/// Sibling scopes start from the same counter and so reuse the shortest names. A parent
/// continues after the largest of its children and never issues a name that passes through it.
/// Returns the merged generator of the root's children, root variables are left untouched.
pub fn rename_inner_scopes(tree: &mut ScopeTree) -> jetpack_error::Result<MinifyNameGenerator> {
  let root = tree.root();
  let mut generators: FxHashMap<ScopeId, MinifyNameGenerator> = FxHashMap::default();

  for scope in tree.post_order() {
    let children = tree.scope(scope).children.clone();
    let mut generator = MinifyNameGenerator::merge(
      children
        .iter()
        .filter_map(|child| generators.remove(child)),
    );
    if scope == root {
      return Ok(generator);
    }

    generator.reserve(tree.scope(scope).through_names());
    let mut variables = tree.scope(scope).variables.clone();
    variables.sort_by_key(|var| Reverse(tree.variable(*var).references.len()));
    let renames = variables
      .into_iter()
      .filter_map(|var| {
        generator
          .next(&tree.variable(var).name)
          .map(|name| (var, name))
      })
      .collect();
    tree.batch_rename(scope, renames)?;
    generators.insert(scope, generator);
  }

  Ok(MinifyNameGenerator::new())
}

/// Runs [rename_inner_scopes] for every module in parallel and merges the results into the
/// generator the root scopes will share.
#[tracing::instrument(skip_all)]
pub fn rename_all_inner_scopes(graph: &mut ModuleGraph) -> Result<MinifyNameGenerator, BuildError> {
  let results = graph
    .modules
    .par_iter_mut()
    .map(|module| {
      rename_inner_scopes(&mut module.scope_tree)
        .map_err(|e| Diagnostic::new(module.path.clone(), e))
    })
    .collect::<Vec<_>>();

  let mut generators = vec![];
  let mut errors = vec![];
  for result in results {
    match result {
      Ok(generator) => generators.push(generator),
      Err(diagnostic) => errors.push(diagnostic),
    }
  }
  match BuildError::from_vec(errors) {
    Some(errors) => Err(errors),
    None => Ok(MinifyNameGenerator::merge(generators)),
  }
}
