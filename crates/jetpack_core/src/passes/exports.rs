use hashlink::LinkedHashSet;
use jetpack_common::{ModuleId, Symbol};
use rustc_hash::FxHashSet;
use swc_core::ecma::atoms::Atom;

use crate::{ModuleGraph, ResolvedDependency};

/// What an export name of a module finally refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
  /// A binding declared at the root of `module`.
  Local { module: ModuleId, symbol: Symbol },
  /// The namespace object of a module, from `export * as ns from './m'`.
  Namespace(ModuleId),
  /// `imported` of an external module. `*` stands for its namespace.
  External { specifier: Atom, imported: Atom },
}

/// Follows local exports, named re-exports and `export *` until a binding is found.
///
/// `visited` holds the modules this lookup has already entered. A module entered twice yields
/// nothing for that branch, which keeps `export *` cycles finite while other branches are
/// still tried. An `export *` of an external module is the last resort, its names are unknown.
pub fn find_export(
  graph: &ModuleGraph,
  module_id: ModuleId,
  name: &Atom,
  visited: &mut FxHashSet<ModuleId>,
) -> Option<ExportTarget> {
  if !visited.insert(module_id) {
    return None;
  }
  let module = graph.module(module_id);
  let scan_result = &module.scan_result;

  if let Some(local) = scan_result.local_exports.get(name) {
    // `import { a } from './b'; export { a };`
    if let Some((source, spec)) = scan_result.find_import_binding(local) {
      return match module.resolved(source)? {
        ResolvedDependency::Module(target) if spec.is_namespace() => {
          Some(ExportTarget::Namespace(*target))
        }
        ResolvedDependency::Module(target) => find_export(graph, *target, &spec.imported, visited),
        ResolvedDependency::External(specifier) => Some(ExportTarget::External {
          specifier: specifier.clone(),
          imported: spec.imported.clone(),
        }),
      };
    }
    return Some(ExportTarget::Local {
      module: module_id,
      symbol: local.clone(),
    });
  }

  for (source, specs) in &scan_result.re_exports {
    let Some(spec) = specs.iter().find(|spec| &spec.exported_as == name) else {
      continue;
    };
    return match module.resolved(source)? {
      ResolvedDependency::Module(target) if &*spec.imported == "*" => {
        Some(ExportTarget::Namespace(*target))
      }
      ResolvedDependency::Module(target) => find_export(graph, *target, &spec.imported, visited),
      ResolvedDependency::External(specifier) => Some(ExportTarget::External {
        specifier: specifier.clone(),
        imported: spec.imported.clone(),
      }),
    };
  }

  // `export *` never forwards `default`
  if &**name == "default" {
    return None;
  }

  let mut external_star = None;
  for source in &scan_result.re_export_all {
    match module.resolved(source) {
      Some(ResolvedDependency::Module(target)) => {
        if let Some(found) = find_export(graph, *target, name, visited) {
          return Some(found);
        }
      }
      Some(ResolvedDependency::External(specifier)) => {
        external_star.get_or_insert_with(|| specifier.clone());
      }
      None => {}
    }
  }

  external_star.map(|specifier| ExportTarget::External {
    specifier,
    imported: name.clone(),
  })
}

/// Every name `module_id` exports: local exports, named re-exports and, minus `default`, the
/// names of `export *` targets. External `export *` contribute nothing, their names are
/// unknown.
pub fn collect_export_names(graph: &ModuleGraph, module_id: ModuleId) -> Vec<Atom> {
  let mut names = LinkedHashSet::new();
  let mut visited = FxHashSet::default();
  push_export_names(graph, module_id, true, &mut names, &mut visited);
  names.into_iter().collect()
}

fn push_export_names(
  graph: &ModuleGraph,
  module_id: ModuleId,
  include_default: bool,
  names: &mut LinkedHashSet<Atom>,
  visited: &mut FxHashSet<ModuleId>,
) {
  if !visited.insert(module_id) {
    return;
  }
  let scan_result = &graph.module(module_id).scan_result;
  scan_result
    .local_exports
    .keys()
    .chain(scan_result.re_exports.values().flatten().map(|spec| &spec.exported_as))
    .filter(|name| include_default || &***name != "default")
    .for_each(|name| {
      if !names.contains(name) {
        names.insert(name.clone());
      }
    });

  for source in &scan_result.re_export_all {
    if let Some(ResolvedDependency::Module(target)) = graph.module(module_id).resolved(source) {
      push_export_names(graph, *target, false, names, visited);
    }
  }
}
