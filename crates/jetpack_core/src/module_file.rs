use derivative::Derivative;
use jetpack_codegen::{CodeGen, CodeGenConfig, SourceContext};
use jetpack_common::{LineIndex, ModuleId, Symbol};
use jetpack_sourcemap::CodeGenFragment;
use jetpack_swc_utils::is_valid_identifier;
use jetpack_swc_visitors::{ScanResult, ScopeTree, VariableId};
use rustc_hash::FxHashMap;
use swc_core::{
  common::SyntaxContext,
  ecma::{ast, atoms::Atom},
};

/// Where an import or export-with-source specifier of a module points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedDependency {
  Module(ModuleId),
  /// Left to the runtime, keyed by the specifier as written.
  External(Atom),
}

/// One parsed source file.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ModuleFile {
  pub id: ModuleId,
  /// Canonical key given by the provider, the absolute path for files.
  pub path: String,
  #[derivative(Debug = "ignore")]
  pub source: String,
  #[derivative(Debug = "ignore")]
  pub line_index: LineIndex,
  #[derivative(Debug = "ignore")]
  pub ast: ast::Module,
  pub top_level_ctxt: SyntaxContext,
  #[derivative(Debug = "ignore")]
  pub scope_tree: ScopeTree,
  pub scan_result: ScanResult,
  pub resolved_map: FxHashMap<Atom, ResolvedDependency>,
  /// Outgoing edges in source order, without duplicates.
  pub ref_mods: Vec<ModuleId>,
  pub visited_mark: bool,
  #[derivative(Debug = "ignore")]
  pub fragment: Option<CodeGenFragment>,
}

impl ModuleFile {
  pub fn resolved(&self, specifier: &Atom) -> Option<&ResolvedDependency> {
    self.resolved_map.get(specifier)
  }

  pub fn variable_of(&self, symbol: &Symbol) -> Option<VariableId> {
    self.scope_tree.find_variable(symbol.as_id())
  }

  /// The current name of the binding `symbol` was declared as.
  pub fn final_name_of(&self, symbol: &Symbol) -> Option<&Atom> {
    self
      .variable_of(symbol)
      .map(|var| &self.scope_tree.variable(var).name)
  }

  pub fn is_default_facade(&self, var: VariableId) -> bool {
    self
      .scan_result
      .default_facade
      .as_ref()
      .map_or(false, |facade| self.variable_of(facade) == Some(var))
  }

  /// A readable identifier derived from the file name, `src/my-util.js` gives `my_util`.
  pub fn stem_name(&self) -> String {
    let stem = std::path::Path::new(&self.path)
      .file_stem()
      .and_then(|stem| stem.to_str())
      .unwrap_or("module");
    let mut name = stem
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
      .collect::<String>();
    if !is_valid_identifier(&name) {
      name.insert(0, '_');
    }
    name
  }

  /// Prints the AST into [ModuleFile::fragment]. `file_id` is the index of this module in the
  /// sources of the source map.
  pub fn codegen(&mut self, config: &CodeGenConfig, file_id: u32) {
    let mut codegen = CodeGen::new(
      config,
      Some(SourceContext {
        file_id,
        source: &self.source,
        line_index: &self.line_index,
      }),
    );
    codegen.emit_module(&self.ast);
    self.fragment = Some(codegen.finish());
  }
}
