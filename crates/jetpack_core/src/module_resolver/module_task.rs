use std::{
  any::Any,
  panic::{self, AssertUnwindSafe},
  sync::Arc,
};

use jetpack_common::{is_external_specifier, LineIndex, Loader, ModuleId};
use jetpack_error::{Diagnostic, Error};
use jetpack_resolver::ResolvedModule;
use jetpack_swc_visitors::{build_scope_tree, jsx_lowering, scan, ScanHooks};
use rustc_hash::FxHashMap;
use swc_core::{
  common::{Mark, SyntaxContext, GLOBALS},
  ecma::{ast, atoms::Atom, visit::VisitMutWith},
};
use tracing::instrument;

use super::DiscoveryContext;
use crate::{ModuleFile, ResolvedDependency, SWC_GLOBALS};

/// Loads, parses and analyzes one module.
pub(crate) struct ModuleTask {
  id: ModuleId,
  resolved: ResolvedModule,
}

impl ModuleTask {
  pub(crate) fn new(id: ModuleId, resolved: ResolvedModule) -> Self {
    Self { id, resolved }
  }

  pub(crate) fn path(&self) -> &str {
    &self.resolved.id
  }

  /// Never unwinds. Failures, panics included, end up in the error list of `ctx`.
  #[instrument(skip_all, fields(path = %self.resolved.id))]
  pub(crate) fn run(self, ctx: &Arc<DiscoveryContext>) {
    let path = self.resolved.id.clone();
    match panic::catch_unwind(AssertUnwindSafe(|| self.run_inner(ctx))) {
      Ok(Ok(module)) => {
        tracing::trace!("finish: {}", module.path);
        ctx.table.set_module(module);
      }
      Ok(Err(err)) => ctx.add_error(Diagnostic::new(path, err)),
      Err(payload) => ctx.add_error(Diagnostic::new(path, Error::panic(panic_message(payload)))),
    }
    ctx.finish_one();
  }

  fn run_inner(self, ctx: &Arc<DiscoveryContext>) -> jetpack_error::Result<ModuleFile> {
    let path = self.resolved.id.clone();
    let source = ctx.resolver.load(&self.resolved)?;
    let loader = Loader::from_path(&path, ctx.options.jsx);

    GLOBALS.set(&SWC_GLOBALS, || {
      let mut ast = jetpack_compiler::parse(&path, &source, loader)?;
      if loader.is_jsx() {
        ast.visit_mut_with(&mut jsx_lowering());
      }

      let top_level_mark = Mark::new();
      jetpack_swc_visitors::resolve(&mut ast, ctx.unresolved_mark, top_level_mark);
      let top_level_ctxt = SyntaxContext::empty().apply_mark(top_level_mark);

      let mut hooks = DiscoveryHooks {
        ctx,
        importer: &path,
        resolved_map: Default::default(),
        ref_mods: vec![],
      };
      let scan_result = scan(&mut ast, top_level_ctxt, &mut hooks)?;
      let DiscoveryHooks {
        resolved_map,
        ref_mods,
        ..
      } = hooks;

      let scope_tree = build_scope_tree(&ast, ctx.unresolved_ctxt, &source)?;
      let line_index = LineIndex::new(&source);

      Ok(ModuleFile {
        id: self.id,
        path: path.clone(),
        line_index,
        ast,
        top_level_ctxt,
        scope_tree,
        scan_result,
        resolved_map,
        ref_mods,
        visited_mark: false,
        fragment: None,
        source,
      })
    })
  }
}

/// Grows the graph while a module is being scanned.
struct DiscoveryHooks<'a> {
  ctx: &'a Arc<DiscoveryContext>,
  importer: &'a str,
  resolved_map: FxHashMap<Atom, ResolvedDependency>,
  ref_mods: Vec<ModuleId>,
}

impl<'a> DiscoveryHooks<'a> {
  /// An unresolvable specifier is reported and skipped, the rest of the module still counts.
  fn handle_new_location_added(&mut self, specifier: &Atom) {
    let options = &self.ctx.options;
    if !options.trace_file || self.resolved_map.contains_key(specifier) {
      return;
    }

    let is_bare = is_external_specifier(specifier);
    if is_bare && options.library {
      self.add_external(specifier);
      return;
    }

    match self.ctx.resolver.resolve(Some(self.importer), specifier) {
      Some(resolved) => {
        let (id, is_new) = self.ctx.table.insert_if_absent(&resolved.id);
        self
          .resolved_map
          .insert(specifier.clone(), ResolvedDependency::Module(id));
        if !self.ref_mods.contains(&id) {
          self.ref_mods.push(id);
        }
        if is_new {
          self.ctx.spawn_task(ModuleTask::new(id, resolved));
        }
      }
      None if is_bare => self.add_external(specifier),
      None => self.ctx.add_error(Diagnostic::new(
        self.importer,
        Error::unresolved_module(self.importer, specifier.to_string()),
      )),
    }
  }

  fn add_external(&mut self, specifier: &Atom) {
    tracing::trace!("external: {}", specifier);
    self.resolved_map.insert(
      specifier.clone(),
      ResolvedDependency::External(specifier.clone()),
    );
  }
}

impl<'a> ScanHooks for DiscoveryHooks<'a> {
  fn on_import_declaration(&mut self, decl: &ast::ImportDecl) -> jetpack_error::Result<()> {
    self.handle_new_location_added(&decl.src.value);
    Ok(())
  }

  fn on_export_named_with_source(&mut self, decl: &ast::NamedExport) -> jetpack_error::Result<()> {
    if let Some(src) = &decl.src {
      self.handle_new_location_added(&src.value);
    }
    Ok(())
  }

  fn on_export_all_with_source(&mut self, decl: &ast::ExportAll) -> jetpack_error::Result<()> {
    self.handle_new_location_added(&decl.src.value);
    Ok(())
  }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
  match payload.downcast::<String>() {
    Ok(message) => *message,
    Err(payload) => match payload.downcast::<&'static str>() {
      Ok(message) => message.to_string(),
      Err(_) => "worker panicked".to_string(),
    },
  }
}
