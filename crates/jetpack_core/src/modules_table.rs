use std::sync::{Mutex, MutexGuard, PoisonError};

use jetpack_common::ModuleId;
use jetpack_error::Error;
use rustc_hash::FxHashMap;
use swc_core::common::SyntaxContext;

use crate::ModuleFile;

#[derive(Debug, Default)]
struct TableInner {
  path_to_id: FxHashMap<String, ModuleId>,
  modules: Vec<Option<ModuleFile>>,
}

/// Shared by discovery workers. Owns every [ModuleFile] and hands out dense ids.
#[derive(Debug, Default)]
pub struct ModulesTable {
  inner: Mutex<TableInner>,
}

impl ModulesTable {
  fn lock(&self) -> MutexGuard<'_, TableInner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Returns the id of `path` and whether this call created it.
  ///
  /// Check and insert happen under one lock, a path is reported as new exactly once.
  pub fn insert_if_absent(&self, path: &str) -> (ModuleId, bool) {
    let mut inner = self.lock();
    if let Some(id) = inner.path_to_id.get(path) {
      return (*id, false);
    }
    let id = ModuleId::new(inner.modules.len());
    inner.path_to_id.insert(path.to_string(), id);
    inner.modules.push(None);
    (id, true)
  }

  /// Stores a parsed module into the slot reserved for its id.
  pub fn set_module(&self, module: ModuleFile) {
    let mut inner = self.lock();
    let idx = module.id.index();
    debug_assert!(inner.modules[idx].is_none(), "{} parsed twice", module.path);
    inner.modules[idx] = Some(module);
  }

  pub fn id_of(&self, path: &str) -> Option<ModuleId> {
    self.lock().path_to_id.get(path).copied()
  }

  pub fn len(&self) -> usize {
    self.lock().modules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Moves every module out of the table. Fails if a reserved slot was never filled.
  pub fn take_graph(
    &self,
    entry: ModuleId,
    unresolved_ctxt: SyntaxContext,
  ) -> jetpack_error::Result<ModuleGraph> {
    let mut inner = self.lock();
    let path_to_id = std::mem::take(&mut inner.path_to_id);
    let slots = std::mem::take(&mut inner.modules);
    let modules = slots
      .into_iter()
      .enumerate()
      .map(|(idx, slot)| {
        slot.ok_or_else(|| {
          let path = path_to_id
            .iter()
            .find(|(_, id)| id.index() == idx)
            .map(|(path, _)| path.as_str())
            .unwrap_or_default();
          Error::panic(format!("module {path} was discovered but never parsed"))
        })
      })
      .collect::<jetpack_error::Result<Vec<_>>>()?;
    Ok(ModuleGraph {
      entry,
      modules,
      path_to_id,
      unresolved_ctxt,
    })
  }
}

/// The discovered module graph, owned by the single thread running the serial passes.
#[derive(Debug)]
pub struct ModuleGraph {
  pub entry: ModuleId,
  pub modules: Vec<ModuleFile>,
  path_to_id: FxHashMap<String, ModuleId>,
  /// Context shared by every reference that resolves to no binding.
  pub unresolved_ctxt: SyntaxContext,
}

impl ModuleGraph {
  pub fn module(&self, id: ModuleId) -> &ModuleFile {
    &self.modules[id.index()]
  }

  pub fn module_mut(&mut self, id: ModuleId) -> &mut ModuleFile {
    &mut self.modules[id.index()]
  }

  pub fn entry_module(&self) -> &ModuleFile {
    self.module(self.entry)
  }

  pub fn id_of(&self, path: &str) -> Option<ModuleId> {
    self.path_to_id.get(path).copied()
  }

  pub fn len(&self) -> usize {
    self.modules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.modules.is_empty()
  }

  pub fn clear_visited_marks(&mut self) {
    self
      .modules
      .iter_mut()
      .for_each(|module| module.visited_mark = false);
  }

  /// Modules reachable from the entry, dependencies before dependents.
  ///
  /// Cycles are cut at the first module seen twice.
  #[tracing::instrument(skip_all)]
  pub fn post_order(&mut self) -> Vec<ModuleId> {
    enum Action {
      Enter,
      Exit,
    }

    self.clear_visited_marks();
    let mut order = Vec::with_capacity(self.modules.len());
    let mut queue = vec![(Action::Enter, self.entry)];

    while let Some((action, id)) = queue.pop() {
      match action {
        Action::Enter => {
          let module = self.module_mut(id);
          if module.visited_mark {
            continue;
          }
          module.visited_mark = true;
          let deps = module.ref_mods.clone();
          queue.push((Action::Exit, id));
          deps
            .into_iter()
            .rev()
            // Early filter modules that are already entered
            .filter(|dep| !self.module(*dep).visited_mark)
            .for_each(|dep| queue.push((Action::Enter, dep)));
        }
        Action::Exit => order.push(id),
      }
    }

    tracing::trace!("post order: {:?}", order);
    order
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;

  #[test]
  fn paths_are_new_only_once() {
    let table = Arc::new(ModulesTable::default());
    let handles = (0..8)
      .map(|_| {
        let table = table.clone();
        std::thread::spawn(move || {
          ["/a.js", "/b.js", "/c.js"]
            .iter()
            .filter(|path| table.insert_if_absent(path).1)
            .count()
        })
      })
      .collect::<Vec<_>>();
    let created: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(created, 3);
    assert_eq!(table.len(), 3);
    let ids = ["/a.js", "/b.js", "/c.js"]
      .iter()
      .map(|path| table.id_of(path).unwrap().index())
      .collect::<rustc_hash::FxHashSet<_>>();
    assert_eq!(ids.len(), 3);
  }

  #[test]
  fn unfilled_slot_is_reported() {
    let table = ModulesTable::default();
    let (id, _) = table.insert_if_absent("/a.js");
    let err = table.take_graph(id, SyntaxContext::empty()).unwrap_err();
    assert!(err.to_string().contains("/a.js"));
  }
}
