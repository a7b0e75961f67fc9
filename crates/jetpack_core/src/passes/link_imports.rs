use hashlink::LinkedHashMap;
use jetpack_ast_template::build_namespace_object_stmt;
use jetpack_common::ModuleId;
use jetpack_error::{BuildError, Diagnostic, Error};
use jetpack_swc_visitors::VariableId;
use rustc_hash::FxHashSet;
use swc_core::ecma::{ast, atoms::Atom};

use super::{collect_export_names, find_export, ExportTarget};
use crate::{GlobalImportHandler, ModuleGraph, NameGenerator, ResolvedDependency};

/// Registers the imports of external modules, module by module in `order`.
#[tracing::instrument(skip_all)]
pub fn register_external_imports(graph: &ModuleGraph, order: &[ModuleId], handler: &mut GlobalImportHandler) {
  for id in order {
    let module = graph.module(*id);
    for (source, specs) in &module.scan_result.imports {
      if let Some(ResolvedDependency::External(specifier)) = module.resolved(source) {
        handler.handle_import(specifier, specs);
      }
    }
  }
}

/// Everything import linking decided, applied by the caller once the graph is writable again.
#[derive(Debug, Default)]
pub struct LinkResult {
  /// Per module, the import bindings and the final names they alias.
  pub renames: Vec<(ModuleId, Vec<(VariableId, Atom)>)>,
  /// Per module, import bindings that resolve to a root binding of the same module.
  pub self_aliases: Vec<(ModuleId, Vec<(VariableId, VariableId)>)>,
  /// Namespace objects, each placed at the start of the module it describes.
  pub namespace_objects: Vec<(ModuleId, ast::ModuleItem)>,
  /// `(exported name, final local name)` of the entry module.
  pub entry_exports: Vec<(Atom, Atom)>,
  /// External modules the entry forwards with `export *`, their names are only known at runtime.
  pub entry_external_stars: Vec<Atom>,
}

/// Resolves every import binding to the final name of what it imports.
///
/// Local imports alias the exported binding, namespace imports alias a namespace object built
/// on demand and external imports alias the merged import of their specifier.
pub struct Linker<'a> {
  graph: &'a ModuleGraph,
  imports: &'a mut GlobalImportHandler,
  generator: &'a mut dyn NameGenerator,
  namespaces: LinkedHashMap<ModuleId, Atom>,
  pending_namespaces: Vec<ModuleId>,
}

impl<'a> Linker<'a> {
  pub fn new(
    graph: &'a ModuleGraph,
    imports: &'a mut GlobalImportHandler,
    generator: &'a mut dyn NameGenerator,
  ) -> Self {
    Self {
      graph,
      imports,
      generator,
      namespaces: Default::default(),
      pending_namespaces: vec![],
    }
  }

  /// Links every module of `order`. All modules are processed before errors are reported.
  #[tracing::instrument(skip_all)]
  pub fn link(mut self, order: &[ModuleId]) -> Result<LinkResult, BuildError> {
    let mut result = LinkResult::default();
    let mut errors = vec![];

    for id in order {
      match self.link_module(*id) {
        Ok((renames, aliases)) => {
          result.renames.push((*id, renames));
          if !aliases.is_empty() {
            result.self_aliases.push((*id, aliases));
          }
        }
        Err(e) => errors.push(Diagnostic::new(self.graph.module(*id).path.clone(), e)),
      }
    }

    let entry = self.graph.entry;
    match self.exports_of(entry) {
      Ok(exports) => result.entry_exports = exports,
      Err(e) => errors.push(Diagnostic::new(self.graph.module(entry).path.clone(), e)),
    }
    let entry_module = self.graph.module(entry);
    result.entry_external_stars = entry_module
      .scan_result
      .re_export_all
      .iter()
      .filter_map(|source| match entry_module.resolved(source) {
        Some(ResolvedDependency::External(specifier)) => Some(specifier.clone()),
        _ => None,
      })
      .collect();

    while let Some(id) = self.pending_namespaces.pop() {
      match self.namespace_object(id) {
        Ok(item) => result.namespace_objects.push((id, item)),
        Err(e) => errors.push(Diagnostic::new(self.graph.module(id).path.clone(), e)),
      }
    }

    match BuildError::from_vec(errors) {
      Some(errors) => Err(errors),
      None => Ok(result),
    }
  }

  fn link_module(
    &mut self,
    id: ModuleId,
  ) -> jetpack_error::Result<(Vec<(VariableId, Atom)>, Vec<(VariableId, VariableId)>)> {
    let graph = self.graph;
    let module = graph.module(id);
    let mut renames = vec![];
    let mut aliases = vec![];

    for (source, specs) in &module.scan_result.imports {
      // Not followed, left as is
      let Some(dependency) = module.resolved(source) else {
        continue;
      };
      for spec in specs {
        let var = module
          .variable_of(&spec.imported_as)
          .ok_or_else(|| Error::symbol_not_found(spec.imported_as.name().to_string()))?;
        let name = match dependency {
          ResolvedDependency::External(specifier) => {
            self
              .imports
              .alias_for(specifier, &spec.imported, &mut *self.generator)
          }
          ResolvedDependency::Module(target) => {
            let export = if spec.is_namespace() {
              ExportTarget::Namespace(*target)
            } else {
              find_export(graph, *target, &spec.imported, &mut FxHashSet::default()).ok_or_else(
                || Error::missing_export(spec.imported.to_string(), module.path.clone(), source.to_string()),
              )?
            };
            // `import f from './self'` names a binding already declared next to the import
            if let ExportTarget::Local { module: owner, symbol } = &export {
              if *owner == id {
                let local = module
                  .variable_of(symbol)
                  .ok_or_else(|| Error::symbol_not_found(symbol.name().to_string()))?;
                aliases.push((var, local));
                continue;
              }
            }
            self.final_name(&export)?
          }
        };
        renames.push((var, name));
      }
    }

    Ok((renames, aliases))
  }

  /// `(exported name, final name)` of every export of `id`.
  fn exports_of(&mut self, id: ModuleId) -> jetpack_error::Result<Vec<(Atom, Atom)>> {
    let graph = self.graph;
    let module = graph.module(id);
    collect_export_names(graph, id)
      .into_iter()
      .map(|name| {
        let target = find_export(graph, id, &name, &mut FxHashSet::default()).ok_or_else(|| {
          Error::missing_export(name.to_string(), module.path.clone(), module.path.clone())
        })?;
        let local = self.final_name(&target)?;
        Ok((name, local))
      })
      .collect()
  }

  fn namespace_object(&mut self, id: ModuleId) -> jetpack_error::Result<ast::ModuleItem> {
    let exports = self.exports_of(id)?;
    let var_name = self.namespace_name(id);
    Ok(build_namespace_object_stmt(var_name, exports))
  }

  pub fn final_name(&mut self, target: &ExportTarget) -> jetpack_error::Result<Atom> {
    match target {
      ExportTarget::Local { module, symbol } => self
        .graph
        .module(*module)
        .final_name_of(symbol)
        .cloned()
        .ok_or_else(|| Error::symbol_not_found(symbol.name().to_string())),
      ExportTarget::Namespace(module) => Ok(self.namespace_name(*module)),
      ExportTarget::External {
        specifier,
        imported,
      } => Ok(self.imports.alias_for(specifier, imported, &mut *self.generator)),
    }
  }

  /// The variable holding the namespace object of `id`. The first request schedules the object.
  fn namespace_name(&mut self, id: ModuleId) -> Atom {
    if let Some(name) = self.namespaces.get(&id) {
      return name.clone();
    }
    let requested: Atom = format!("{}_ns", self.graph.module(id).stem_name()).into();
    let name = self
      .generator
      .next(&requested)
      .unwrap_or(requested);
    self.namespaces.insert(id, name.clone());
    self.pending_namespaces.push(id);
    name
  }
}
