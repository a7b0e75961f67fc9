use std::cmp::Reverse;

use itertools::Itertools;
use rustc_hash::FxHashSet;
use swc_core::ecma::atoms::Atom;

use crate::{ModuleFile, NameGenerator};

/// The name the `export default` binding asks for.
pub const DEFAULT_EXPORT_NAME: &str = "_default";

/// Gives every root variable of `module` a name unique across the bundle, most referenced
/// first. Import bindings are skipped, they are linked to their targets afterwards, but no
/// variable is given the current name of one of them.
pub fn rename_root_variables(
  module: &mut ModuleFile,
  generator: &mut dyn NameGenerator,
) -> jetpack_error::Result<()> {
  let renames = {
    let tree = &module.scope_tree;
    let root = tree.root();
    let variables = tree
      .scope(root)
      .variables
      .iter()
      .copied()
      .sorted_by_key(|var| Reverse(tree.variable(*var).references.len()))
      .collect::<Vec<_>>();

    let import_names = variables
      .iter()
      .map(|var| tree.variable(*var))
      .filter(|var| var.kind.is_import())
      .map(|var| var.name.clone())
      .collect::<FxHashSet<_>>();

    let mut renames = vec![];
    for var in variables {
      let variable = tree.variable(var);
      if variable.kind.is_import() {
        continue;
      }
      let requested: Atom = if module.is_default_facade(var) {
        DEFAULT_EXPORT_NAME.into()
      } else {
        variable.name.clone()
      };
      let new_name = loop {
        let candidate = generator
          .next(&requested)
          .unwrap_or_else(|| requested.clone());
        if !import_names.contains(&candidate) {
          break candidate;
        }
      };
      if new_name != variable.name {
        renames.push((var, new_name));
      }
    }
    renames
  };

  tracing::trace!("{}: {} root rename(s)", module.path, renames.len());
  let root = module.scope_tree.root();
  module.scope_tree.batch_rename(root, renames)
}
