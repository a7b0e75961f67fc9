use rustc_hash::{FxHashMap, FxHashSet};
use swc_core::{
  common::BytePos,
  ecma::{ast::Id, atoms::Atom},
};

mod builder;
pub use builder::build_scope_tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(u32);

impl VariableId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
  Module,
  Function,
  Block,
  Catch,
  /// Holds the name of a named function or class expression.
  Named,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
  Var,
  Let,
  Const,
  Function,
  Class,
  Param,
  CatchParam,
  Import,
}

impl BindingKind {
  pub fn is_import(self) -> bool {
    matches!(self, BindingKind::Import)
  }
}

#[derive(Debug)]
pub struct Variable {
  /// The identity given by the resolver. Never changes.
  pub id: Id,
  /// The current name. Updated by renames.
  pub name: Atom,
  pub kind: BindingKind,
  pub scope: ScopeId,
  /// The scope of every identifier referencing this variable, declarations excluded.
  pub references: Vec<ScopeId>,
  pub declared_at: BytePos,
  lexical: bool,
}

#[derive(Debug)]
pub struct Scope {
  pub kind: ScopeKind,
  pub parent: Option<ScopeId>,
  pub children: Vec<ScopeId>,
  /// Variables declared directly in this scope, in declaration order.
  pub variables: Vec<VariableId>,
  names: FxHashMap<Atom, VariableId>,
  // Names referenced inside this scope (or a descendant) that resolve to a binding outside of it.
  through: FxHashMap<Atom, u32>,
}

impl Scope {
  fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
    Self {
      kind,
      parent,
      children: vec![],
      variables: vec![],
      names: Default::default(),
      through: Default::default(),
    }
  }

  pub fn is_root(&self) -> bool {
    self.parent.is_none()
  }

  pub fn get(&self, name: &Atom) -> Option<VariableId> {
    self.names.get(name).copied()
  }

  pub fn through_names(&self) -> impl Iterator<Item = &Atom> {
    self
      .through
      .iter()
      .filter(|(_, count)| **count > 0)
      .map(|(name, _)| name)
  }

  pub fn is_through(&self, name: &Atom) -> bool {
    self.through.get(name).map_or(false, |count| *count > 0)
  }
}

/// The lexical scopes of one module and the variables they own.
///
/// Built from a resolved AST. Renaming happens on the tree first. The AST is rewritten
/// afterwards from [ScopeTree::rename_map].
#[derive(Debug)]
pub struct ScopeTree {
  scopes: Vec<Scope>,
  variables: Vec<Variable>,
  by_id: FxHashMap<Id, VariableId>,
  unresolved: FxHashSet<Atom>,
}

impl ScopeTree {
  fn new() -> Self {
    Self {
      scopes: vec![Scope::new(ScopeKind::Module, None)],
      variables: vec![],
      by_id: Default::default(),
      unresolved: Default::default(),
    }
  }

  pub fn root(&self) -> ScopeId {
    ScopeId(0)
  }

  pub fn scope(&self, id: ScopeId) -> &Scope {
    &self.scopes[id.index()]
  }

  pub fn variable(&self, id: VariableId) -> &Variable {
    &self.variables[id.index()]
  }

  pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
    self
      .variables
      .iter()
      .enumerate()
      .map(|(idx, var)| (VariableId(idx as u32), var))
  }

  pub fn scope_count(&self) -> usize {
    self.scopes.len()
  }

  pub fn find_variable(&self, id: &Id) -> Option<VariableId> {
    self.by_id.get(id).copied()
  }

  /// Names referenced in this module that no declaration binds, such as `console`.
  pub fn unresolved_names(&self) -> &FxHashSet<Atom> {
    &self.unresolved
  }

  /// Names of every variable not declared at the root.
  pub fn declared_scoped_names(&self) -> impl Iterator<Item = &Atom> {
    self
      .variables
      .iter()
      .filter(|var| var.scope != self.root())
      .map(|var| &var.name)
  }

  /// Scopes in post-order, children before their parent.
  pub fn post_order(&self) -> Vec<ScopeId> {
    let mut order = Vec::with_capacity(self.scopes.len());
    let mut stack = vec![(self.root(), false)];
    while let Some((scope, expanded)) = stack.pop() {
      if expanded {
        order.push(scope);
        continue;
      }
      stack.push((scope, true));
      self
        .scope(scope)
        .children
        .iter()
        .rev()
        .for_each(|child| stack.push((*child, false)));
    }
    order
  }

  pub fn rename(&mut self, var: VariableId, new_name: Atom) -> jetpack_error::Result<()> {
    let scope = self.variable(var).scope;
    self.batch_rename(scope, vec![(var, new_name)])
  }

  /// Renames variables of one scope together. Either every rename applies or none does.
  ///
  /// A rename is rejected when the new name is held by another variable of the scope, when a
  /// scope between a reference and the declaring scope binds the new name, or when the new name
  /// already passes through the scope. Import bindings may share a name, they end up as aliases
  /// of the same variable.
  pub fn batch_rename(
    &mut self,
    scope: ScopeId,
    renames: Vec<(VariableId, Atom)>,
  ) -> jetpack_error::Result<()> {
    let renames = renames
      .into_iter()
      .filter(|(var, new_name)| &self.variable(*var).name != new_name)
      .collect::<Vec<_>>();
    if renames.is_empty() {
      return Ok(());
    }

    let renamed = renames.iter().map(|(var, _)| *var).collect::<FxHashSet<_>>();
    let mut targets: FxHashMap<&Atom, VariableId> = FxHashMap::default();

    for (var, new_name) in &renames {
      let variable = self.variable(*var);
      debug_assert_eq!(variable.scope, scope);
      let conflict = || jetpack_error::Error::rename_conflict(variable.name.to_string(), new_name.to_string());
      let both_imports = |other: VariableId| variable.kind.is_import() && self.variable(other).kind.is_import();

      if let Some(holder) = self.scope(scope).get(new_name) {
        if !renamed.contains(&holder) && !both_imports(holder) {
          return Err(conflict());
        }
      }
      if let Some(other) = targets.insert(new_name, *var) {
        if !both_imports(other) {
          return Err(conflict());
        }
      }
      if self.scope(scope).is_through(new_name) {
        return Err(conflict());
      }
      if self.is_captured(*var, scope, new_name) {
        return Err(conflict());
      }
    }

    self.apply_renames(scope, renames);
    Ok(())
  }

  /// Makes the import binding `import` a second name of `target`, a variable of the same scope.
  ///
  /// Used when a module imports one of its own bindings. Fails when a scope between a reference
  /// of the import and the declaring scope binds the name of `target`.
  pub fn alias_import(&mut self, import: VariableId, target: VariableId) -> jetpack_error::Result<()> {
    let variable = self.variable(import);
    let scope = variable.scope;
    let new_name = self.variable(target).name.clone();
    if variable.name == new_name {
      return Ok(());
    }
    if !variable.kind.is_import()
      || self.variable(target).scope != scope
      || self.is_captured(import, scope, &new_name)
    {
      return Err(jetpack_error::Error::rename_conflict(
        variable.name.to_string(),
        new_name.to_string(),
      ));
    }
    self.apply_renames(scope, vec![(import, new_name)]);
    Ok(())
  }

  /// Whether a reference of `var` would resolve to another binding once named `new_name`.
  fn is_captured(&self, var: VariableId, scope: ScopeId, new_name: &Atom) -> bool {
    self.variable(var).references.iter().any(|reference| {
      self
        .ancestors_until(*reference, scope)
        .any(|between| self.scope(between).get(new_name).is_some())
    })
  }

  fn apply_renames(&mut self, scope: ScopeId, renames: Vec<(VariableId, Atom)>) {
    for (var, _) in &renames {
      let old_name = self.variable(*var).name.clone();
      let names = &mut self.scopes[scope.index()].names;
      if names.get(&old_name) == Some(var) {
        names.remove(&old_name);
      }
    }
    for (var, new_name) in renames {
      let old_name = std::mem::replace(&mut self.variables[var.index()].name, new_name.clone());
      self.scopes[scope.index()]
        .names
        .entry(new_name.clone())
        .or_insert(var);
      let references = self.variables[var.index()].references.clone();
      for reference in references {
        let between = self.ancestors_until(reference, scope).collect::<Vec<_>>();
        for scope in between {
          let through = &mut self.scopes[scope.index()].through;
          if let Some(count) = through.get_mut(&old_name) {
            *count = count.saturating_sub(1);
          }
          *through.entry(new_name.clone()).or_default() += 1;
        }
      }
    }
  }

  /// Every variable whose current name differs from its declared name.
  pub fn rename_map(&self) -> FxHashMap<Id, Atom> {
    let mut map = FxHashMap::default();
    self.by_id.iter().for_each(|(id, var)| {
      let var = self.variable(*var);
      if var.name != id.0 {
        map.insert(id.clone(), var.name.clone());
      }
    });
    map
  }

  /// From `from` up to, but excluding, `until`.
  fn ancestors_until(&self, from: ScopeId, until: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
    let mut next = Some(from);
    std::iter::from_fn(move || {
      let current = next.filter(|scope| *scope != until)?;
      next = self.scope(current).parent;
      Some(current)
    })
  }

  fn add_scope(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
    let id = ScopeId(self.scopes.len() as u32);
    self.scopes.push(Scope::new(kind, Some(parent)));
    self.scopes[parent.index()].children.push(id);
    id
  }

  /// Records a declaration. Returns the existing variable on an illegal redeclaration.
  fn declare(
    &mut self,
    scope: ScopeId,
    id: Id,
    kind: BindingKind,
    lexical: bool,
    declared_at: BytePos,
  ) -> Result<VariableId, VariableId> {
    if let Some(existing) = self.by_id.get(&id).copied().or_else(|| self.scope(scope).get(&id.0)) {
      let var = self.variable(existing);
      if var.scope == scope {
        if lexical || var.lexical {
          return Err(existing);
        }
        self.by_id.insert(id, existing);
        return Ok(existing);
      }
    }

    let var_id = VariableId(self.variables.len() as u32);
    self.variables.push(Variable {
      name: id.0.clone(),
      id: id.clone(),
      kind,
      scope,
      references: vec![],
      declared_at,
      lexical,
    });
    self.scopes[scope.index()].variables.push(var_id);
    self.scopes[scope.index()].names.insert(id.0.clone(), var_id);
    self.by_id.insert(id, var_id);
    Ok(var_id)
  }

  fn add_reference(&mut self, id: &Id, from: ScopeId) {
    let Some(var) = self.by_id.get(id).copied() else {
      // Only happens for code the resolver leaves without a binding, treat it as a global.
      self.add_unresolved_reference(id.0.clone(), from);
      return;
    };
    let declared_in = self.variable(var).scope;
    let name = self.variable(var).name.clone();
    self.variables[var.index()].references.push(from);
    let between = self.ancestors_until(from, declared_in).collect::<Vec<_>>();
    between.into_iter().for_each(|scope| {
      *self.scopes[scope.index()]
        .through
        .entry(name.clone())
        .or_default() += 1;
    });
  }

  fn add_unresolved_reference(&mut self, name: Atom, from: ScopeId) {
    let mut next = Some(from);
    while let Some(scope) = next {
      *self.scopes[scope.index()]
        .through
        .entry(name.clone())
        .or_default() += 1;
      next = self.scope(scope).parent;
    }
    self.unresolved.insert(name);
  }
}

#[cfg(test)]
mod tests {
  use jetpack_common::Loader;
  use swc_core::common::{Mark, SyntaxContext, GLOBALS};

  use super::*;

  fn with_tree(source: &str, f: impl FnOnce(&mut ScopeTree)) {
    GLOBALS.set(&Default::default(), || {
      let mut module = jetpack_compiler::parse("/a.js", source, Loader::Js).unwrap();
      let unresolved_mark = Mark::new();
      let top_level_mark = Mark::new();
      crate::resolve(&mut module, unresolved_mark, top_level_mark);
      let mut tree = build_scope_tree(
        &module,
        SyntaxContext::empty().apply_mark(unresolved_mark),
        source,
      )
      .unwrap();
      f(&mut tree)
    })
  }

  fn root_var(tree: &ScopeTree, name: &str) -> VariableId {
    tree.scope(tree.root()).get(&Atom::from(name)).unwrap()
  }

  #[test]
  fn collects_unresolved_names() {
    with_tree("const a = 1; console.log(a, window);", |tree| {
      assert!(tree.unresolved_names().contains(&Atom::from("console")));
      assert!(tree.unresolved_names().contains(&Atom::from("window")));
      assert!(!tree.unresolved_names().contains(&Atom::from("a")));
    });
  }

  #[test]
  fn var_hoists_to_function_scope() {
    with_tree("function f() { { var a = 1; } return a; }", |tree| {
      let (_, var) = tree.variables().find(|(_, v)| &*v.name == "a").unwrap();
      assert_eq!(tree.scope(var.scope).kind, ScopeKind::Function);
      assert_eq!(var.references.len(), 1);
    });
  }

  #[test]
  fn rename_is_rejected_when_it_would_capture_a_global() {
    with_tree("const a = 1; function f() { return a + b; }", |tree| {
      let a = root_var(tree, "a");
      let err = tree.rename(a, "b".into()).unwrap_err();
      assert_eq!(err.code(), jetpack_error::error_code::RENAME_CONFLICT);
    });
  }

  #[test]
  fn rename_is_rejected_when_an_inner_binding_would_shadow() {
    with_tree("const a = 1; function f() { const c = 2; return a + c; }", |tree| {
      let a = root_var(tree, "a");
      assert!(tree.rename(a, "c".into()).is_err());
      assert!(tree.rename(a, "d".into()).is_ok());
      assert_eq!(&*tree.variable(a).name, "d");
    });
  }

  #[test]
  fn batch_rename_can_swap_names() {
    with_tree("const a = 1, b = 2; console.log(a, b);", |tree| {
      let a = root_var(tree, "a");
      let b = root_var(tree, "b");
      let root = tree.root();
      tree
        .batch_rename(root, vec![(a, "b".into()), (b, "a".into())])
        .unwrap();
      assert_eq!(&*tree.variable(a).name, "b");
      assert_eq!(&*tree.variable(b).name, "a");
      assert_eq!(tree.rename_map().len(), 2);
    });
  }

  #[test]
  fn imports_may_alias_each_other() {
    with_tree("import a from 'x'; import { b } from 'y'; a(b);", |tree| {
      let a = root_var(tree, "a");
      let b = root_var(tree, "b");
      let root = tree.root();
      assert!(tree
        .batch_rename(root, vec![(a, "c".into()), (b, "c".into())])
        .is_ok());
    });
  }

  #[test]
  fn import_can_alias_a_binding_of_its_scope() {
    with_tree("import f from './a'; function g() { return 1; } f();", |tree| {
      let f = root_var(tree, "f");
      let g = root_var(tree, "g");
      assert!(tree.rename(f, "g".into()).is_err());
      tree.alias_import(f, g).unwrap();
      assert_eq!(&*tree.variable(f).name, "g");
      assert_eq!(tree.scope(tree.root()).get(&Atom::from("g")), Some(g));
      let map = tree.rename_map();
      assert_eq!(map.len(), 1);
      assert!(map.values().all(|name| &**name == "g"));
    });
  }

  #[test]
  fn alias_is_rejected_when_an_inner_binding_would_shadow() {
    with_tree(
      "import f from './a'; const g = 1; function h() { const g = 2; return f + g; }",
      |tree| {
        let f = root_var(tree, "f");
        let g = root_var(tree, "g");
        let err = tree.alias_import(f, g).unwrap_err();
        assert_eq!(err.code(), jetpack_error::error_code::RENAME_CONFLICT);
        assert_eq!(&*tree.variable(f).name, "f");
      },
    );
  }

  #[test]
  fn post_order_visits_children_first() {
    with_tree("function f() { { let a; } }", |tree| {
      let order = tree.post_order();
      assert_eq!(order.len(), tree.scope_count());
      assert_eq!(*order.last().unwrap(), tree.root());
      assert_eq!(tree.scope(order[0]).kind, ScopeKind::Block);
    });
  }
}
