use hashlink::{LinkedHashMap, LinkedHashSet};
use jetpack_ast_template::{build_named_import, build_namespace_import};
use jetpack_common::ImportedSpecifier;
use rustc_hash::FxHashMap;
use swc_core::ecma::{ast, atoms::Atom};

use crate::NameGenerator;

/// Everything the bundle imports from one external specifier.
#[derive(Debug, Clone)]
pub struct GlobalImportInfo {
  /// First-seen order, also the emission order.
  pub id: usize,
  pub path: Atom,
  pub has_namespace: bool,
  /// The requested local name until names are distributed, the alias afterwards.
  pub ns_import_name: Atom,
  pub has_default: bool,
  pub default_local_name: Atom,
  pub names: LinkedHashSet<Atom>,
  pub alias_map: FxHashMap<Atom, Atom>,
  distributed: bool,
}

impl GlobalImportInfo {
  fn new(id: usize, path: Atom) -> Self {
    Self {
      id,
      path,
      has_namespace: false,
      ns_import_name: Atom::default(),
      has_default: false,
      default_local_name: Atom::default(),
      names: Default::default(),
      alias_map: Default::default(),
      distributed: false,
    }
  }
}

/// Merges the imports of external modules across the whole graph into one import declaration
/// per specifier.
///
/// Usage:
/// 1. [GlobalImportHandler::handle_import] for every import of an external specifier.
/// 2. [GlobalImportHandler::distribute_names] once the graph is complete.
/// 3. [GlobalImportHandler::alias_for] to rename each local import binding.
/// 4. [GlobalImportHandler::gen_ast] to build the declarations.
#[derive(Debug, Default)]
pub struct GlobalImportHandler {
  import_infos: LinkedHashMap<Atom, GlobalImportInfo>,
}

impl GlobalImportHandler {
  fn info_mut(&mut self, path: &Atom) -> &mut GlobalImportInfo {
    let next_id = self.import_infos.len();
    self
      .import_infos
      .entry(path.clone())
      .or_insert_with(|| GlobalImportInfo::new(next_id, path.clone()))
  }

  /// Records the requests of one import declaration. An import without specifiers still
  /// registers the specifier.
  pub fn handle_import(&mut self, path: &Atom, specifiers: &[ImportedSpecifier]) {
    let info = self.info_mut(path);
    for spec in specifiers {
      match &*spec.imported {
        "*" => {
          if !info.has_namespace {
            info.ns_import_name = spec.imported_as.name().clone();
          }
          info.has_namespace = true;
        }
        "default" => {
          if !info.has_default {
            info.default_local_name = spec.imported_as.name().clone();
          }
          info.has_default = true;
        }
        _ => {
          info.names.insert(spec.imported.clone());
        }
      }
    }
  }

  pub fn is_empty(&self) -> bool {
    self.import_infos.is_empty()
  }

  pub fn infos(&self) -> impl Iterator<Item = &GlobalImportInfo> {
    self.import_infos.values()
  }

  pub fn get(&self, path: &Atom) -> Option<&GlobalImportInfo> {
    self.import_infos.get(path)
  }

  /// Asks `generator` for an alias of every requested name, in id order.
  #[tracing::instrument(skip_all)]
  pub fn distribute_names(&mut self, generator: &mut dyn NameGenerator) {
    for info in self.import_infos.values_mut() {
      if info.distributed {
        continue;
      }
      info.distributed = true;
      if info.has_namespace {
        info.ns_import_name = next_name(generator, &info.ns_import_name);
      }
      if info.has_default {
        info.default_local_name = next_name(generator, &info.default_local_name);
      }
      for name in &info.names {
        let alias = next_name(generator, name);
        info.alias_map.insert(name.clone(), alias);
      }
    }
  }

  /// The alias a local binding importing `imported` from `path` must be renamed to.
  ///
  /// Requests showing up after [GlobalImportHandler::distribute_names], from re-exports of
  /// external modules for example, are given an alias on the spot.
  pub fn alias_for(&mut self, path: &Atom, imported: &Atom, generator: &mut dyn NameGenerator) -> Atom {
    let info = self.info_mut(path);
    let fallback_name = || -> Atom {
      std::path::Path::new(&**path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| {
          stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect::<String>()
        })
        .filter(|stem| !stem.is_empty() && !stem.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or_else(|| "external".to_string())
        .into()
    };
    match &**imported {
      "*" => {
        if !info.has_namespace {
          info.has_namespace = true;
          info.ns_import_name = next_name(generator, &fallback_name());
        }
        info.ns_import_name.clone()
      }
      "default" => {
        if !info.has_default {
          info.has_default = true;
          info.default_local_name = next_name(generator, &fallback_name());
        }
        info.default_local_name.clone()
      }
      _ => {
        if let Some(alias) = info.alias_map.get(imported) {
          return alias.clone();
        }
        info.names.insert(imported.clone());
        let alias = next_name(generator, imported);
        info.alias_map.insert(imported.clone(), alias.clone());
        alias
      }
    }
  }

  /// One namespace import and one default/named import per specifier, in first-seen order.
  pub fn gen_ast(&self) -> Vec<ast::ModuleItem> {
    let mut items = vec![];
    for info in self.import_infos.values() {
      if info.has_namespace {
        items.push(build_namespace_import(
          info.path.clone(),
          info.ns_import_name.clone(),
        ));
      }
      let has_named = info.has_default || !info.names.is_empty();
      if has_named || !info.has_namespace {
        let named = info
          .names
          .iter()
          .map(|name| {
            let alias = info.alias_map.get(name).unwrap_or(name).clone();
            (name.clone(), alias)
          })
          .collect();
        items.push(build_named_import(
          info.path.clone(),
          info.has_default.then(|| info.default_local_name.clone()),
          named,
        ));
      }
    }
    items
  }
}

fn next_name(generator: &mut dyn NameGenerator, requested: &Atom) -> Atom {
  generator
    .next(requested)
    .unwrap_or_else(|| requested.clone())
}

#[cfg(test)]
mod tests {
  use jetpack_common::Symbol;
  use swc_core::common::SyntaxContext;

  use super::*;
  use crate::{ReadableNameGenerator, UnresolvedNameCollector};

  fn spec(imported: &str, local: &str) -> ImportedSpecifier {
    ImportedSpecifier {
      imported_as: Symbol::new(local.into(), SyntaxContext::empty()),
      imported: imported.into(),
    }
  }

  #[test]
  fn dedupes_by_specifier_in_first_seen_order() {
    let mut handler = GlobalImportHandler::default();
    handler.handle_import(&"react".into(), &[spec("default", "React"), spec("useState", "useState")]);
    handler.handle_import(&"lodash".into(), &[spec("*", "_")]);
    handler.handle_import(&"react".into(), &[spec("default", "R"), spec("useState", "us")]);

    let infos = handler.infos().collect::<Vec<_>>();
    assert_eq!(infos.len(), 2);
    assert_eq!(&*infos[0].path, "react");
    assert_eq!(infos[0].id, 0);
    assert_eq!(&*infos[0].default_local_name, "React");
    assert_eq!(infos[0].names.len(), 1);
    assert_eq!(infos[1].id, 1);
  }

  #[test]
  fn aliases_avoid_used_names() {
    let mut collector = UnresolvedNameCollector::default();
    collector.insert_all(&[Atom::from("useState")]);
    let mut generator = ReadableNameGenerator::with_prev(Box::new(collector));
    let mut handler = GlobalImportHandler::default();
    handler.handle_import(&"react".into(), &[spec("default", "React"), spec("useState", "s")]);
    handler.distribute_names(&mut generator);

    assert_eq!(&*handler.alias_for(&"react".into(), &"default".into(), &mut generator), "React");
    assert_eq!(
      &*handler.alias_for(&"react".into(), &"useState".into(), &mut generator),
      "useState_0"
    );
    assert_eq!(handler.gen_ast().len(), 1);
  }

  #[test]
  fn late_requests_get_an_alias() {
    let mut generator = ReadableNameGenerator::new();
    let mut handler = GlobalImportHandler::default();
    handler.distribute_names(&mut generator);
    let ns = handler.alias_for(&"@scope/my-lib".into(), &"*".into(), &mut generator);
    assert_eq!(&*ns, "my_lib");
    let first = handler.alias_for(&"@scope/my-lib".into(), &"x".into(), &mut generator);
    let second = handler.alias_for(&"@scope/my-lib".into(), &"x".into(), &mut generator);
    assert_eq!(first, second);
    // namespace import plus the named import
    assert_eq!(handler.gen_ast().len(), 2);
  }

  #[test]
  fn side_effect_import_is_kept() {
    let mut handler = GlobalImportHandler::default();
    handler.handle_import(&"polyfill".into(), &[]);
    let items = handler.gen_ast();
    assert_eq!(items.len(), 1);
    let ast::ModuleItem::ModuleDecl(ast::ModuleDecl::Import(import)) = &items[0] else {
      unreachable!()
    };
    assert!(import.specifiers.is_empty());
  }
}
