use std::sync::{Arc, Condvar, Mutex, PoisonError};

use jetpack_error::{BuildError, Diagnostic, Error};
use jetpack_resolver::{ResolvedModule, Resolver};
use swc_core::common::{Mark, SyntaxContext, GLOBALS};

use crate::{ModuleGraph, ModulesTable, SWC_GLOBALS};

pub(crate) mod module_task;
use module_task::ModuleTask;

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
  pub jsx: bool,
  /// Follow imports. Without it only the entry is parsed.
  pub trace_file: bool,
  /// Treat every bare specifier as external.
  pub library: bool,
  pub threads: usize,
}

impl Default for DiscoveryOptions {
  fn default() -> Self {
    Self {
      jsx: false,
      trace_file: true,
      library: false,
      threads: crate::default_threads(),
    }
  }
}

#[derive(Debug, Default)]
struct Counters {
  enqueued: usize,
  finished: usize,
}

/// State shared by the driver and every parse task.
#[derive(Debug)]
pub(crate) struct DiscoveryContext {
  pub(crate) resolver: Resolver,
  pub(crate) table: ModulesTable,
  pub(crate) options: DiscoveryOptions,
  pub(crate) unresolved_mark: Mark,
  pub(crate) unresolved_ctxt: SyntaxContext,
  counters: Mutex<Counters>,
  all_finished: Condvar,
  errors: Mutex<Vec<Diagnostic>>,
}

impl DiscoveryContext {
  /// Schedules a parse task on the pool the caller runs in.
  pub(crate) fn spawn_task(self: &Arc<Self>, task: ModuleTask) {
    self.enqueue_one();
    tracing::trace!("spawning new job for {}", task.path());
    let ctx = Arc::clone(self);
    rayon::spawn(move || task.run(&ctx));
  }

  pub(crate) fn add_error(&self, diagnostic: Diagnostic) {
    tracing::debug!("worker error: {}", diagnostic);
    self
      .errors
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(diagnostic);
  }

  fn enqueue_one(&self) {
    self
      .counters
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .enqueued += 1;
  }

  pub(crate) fn finish_one(&self) {
    {
      let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
      counters.finished += 1;
      tracing::trace!("remaining: {}", counters.enqueued - counters.finished);
    }
    self.all_finished.notify_all();
  }

  /// Blocks until every enqueued task, including those enqueued while waiting, has finished.
  fn wait_for_all(&self) -> usize {
    let counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
    let counters = self
      .all_finished
      .wait_while(counters, |counters| counters.finished < counters.enqueued)
      .unwrap_or_else(PoisonError::into_inner);
    counters.finished
  }

  fn take_errors(&self) -> Vec<Diagnostic> {
    std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
  }
}

/// Discovers and parses the module graph of an entry on a pool of worker threads.
#[derive(Debug)]
pub struct ModuleResolver {
  resolver: Resolver,
  options: DiscoveryOptions,
}

impl ModuleResolver {
  pub fn new(resolver: Resolver, options: DiscoveryOptions) -> Self {
    Self { resolver, options }
  }

  /// Every module error is collected. The graph is only returned when there is none.
  #[tracing::instrument(skip_all)]
  pub fn begin_from_entry(self, entry: &str) -> Result<ModuleGraph, BuildError> {
    let fatal = |error: Error| BuildError::new(Diagnostic::new(entry, error));
    let resolved: ResolvedModule = self.resolver.resolve_or_error(None, entry).map_err(fatal)?;

    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(self.options.threads.max(1))
      .thread_name(|idx| format!("jetpack-worker-{idx}"))
      .build()
      .map_err(|e| fatal(Error::panic(e)))?;

    let (unresolved_mark, unresolved_ctxt) = GLOBALS.set(&SWC_GLOBALS, || {
      let mark = Mark::new();
      (mark, SyntaxContext::empty().apply_mark(mark))
    });
    let ctx = Arc::new(DiscoveryContext {
      resolver: self.resolver,
      table: ModulesTable::default(),
      options: self.options,
      unresolved_mark,
      unresolved_ctxt,
      counters: Default::default(),
      all_finished: Condvar::new(),
      errors: Default::default(),
    });

    let (entry_id, _) = ctx.table.insert_if_absent(&resolved.id);
    let task = ModuleTask::new(entry_id, resolved);
    pool.install(|| ctx.spawn_task(task));

    let finished = ctx.wait_for_all();
    tracing::debug!("discovery finished, {} module(s) processed", finished);

    if let Some(errors) = BuildError::from_vec(ctx.take_errors()) {
      return Err(errors);
    }
    ctx
      .table
      .take_graph(entry_id, ctx.unresolved_ctxt)
      .map_err(|e| BuildError::new(Diagnostic::new(entry, e)))
  }
}
