use std::{path::Path, time::Instant};

use jetpack_ast_template::{build_export_all, build_exports_stmt};
use jetpack_codegen::{print_module, CodeGenConfig};
use jetpack_common::ModuleId;
use jetpack_error::{BuildError, Diagnostic, Error};
use jetpack_resolver::Resolver;
use jetpack_sourcemap::{ModuleCompositor, SourceMapGenerator, SourceMapJson};
use jetpack_swc_visitors::{lower_module_decls, renamer};
use rayon::prelude::*;
use swc_core::{
  common::DUMMY_SP,
  ecma::{ast, atoms::Atom, visit::VisitMutWith},
};

use crate::{
  passes::{
    register_external_imports, rename_all_inner_scopes, rename_root_variables, LinkResult, Linker,
  },
  stats::timed,
  BundleOptions, BundleResult, BundleStats, GlobalImportHandler, ModuleGraph, ModuleResolver,
  NameGenerator, ReadableNameGenerator, UnresolvedNameCollector,
};

/// The bundled code and its source map.
#[derive(Debug)]
pub struct BundleOutput {
  pub code: String,
  pub map: Option<SourceMapJson>,
  pub stats: BundleStats,
}

/// Bundles the module graph of one entry into a single ES module.
#[derive(Debug)]
pub struct Bundler {
  options: BundleOptions,
}

impl Bundler {
  pub fn new(options: BundleOptions) -> Self {
    jetpack_tracing::enable_tracing_on_demand();
    Self { options }
  }

  pub fn options(&self) -> &BundleOptions {
    &self.options
  }

  /// Bundles the entry file.
  #[tracing::instrument(skip_all)]
  pub fn build(&self) -> BundleResult<BundleOutput> {
    tracing::debug!("{:#?}", self.options);
    let (resolver, entry) = self.options.file_resolver();
    self.build_with(resolver, &entry)
  }

  /// Bundles `source` as if it were the entry file.
  #[tracing::instrument(skip_all)]
  pub fn build_string(&self, source: &str) -> BundleResult<BundleOutput> {
    let (resolver, entry) = self.options.memory_resolver(source);
    self.build_with(resolver, &entry)
  }

  /// Bundles the entry file and writes the output, and `<output>.map` when source maps are on.
  /// Nothing is written when the build fails.
  pub fn write(&self) -> BundleResult<BundleOutput> {
    let mut output = self.build()?;
    let start = Instant::now();
    let out_path = self.options.output_path();
    write_output(&out_path, &output).map_err(|e| {
      BuildError::new(Diagnostic::new(out_path.to_string_lossy(), e))
    })?;
    output.stats.write_io = start.elapsed();
    output.stats.total += output.stats.write_io;
    Ok(output)
  }

  fn build_with(&self, resolver: Resolver, entry: &str) -> BundleResult<BundleOutput> {
    let start = Instant::now();
    let mut stats = BundleStats::default();

    let mut discovery = self.options.discovery_options();
    // Linking needs every module of the graph
    discovery.trace_file = true;
    let mut graph = timed(&mut stats.parse_stage, "parse stage", || {
      ModuleResolver::new(resolver, discovery).begin_from_entry(entry)
    })?;
    stats.module_count = graph.len();

    let order = graph.post_order();
    let config = CodeGenConfig {
      unresolved_ctxt: Some(graph.unresolved_ctxt),
      ..self.options.codegen_config()
    };

    let mut imports = GlobalImportHandler::default();
    register_external_imports(&graph, &order, &mut imports);

    let mut collector = UnresolvedNameCollector::default();
    for module in &graph.modules {
      collector.insert_all(module.scope_tree.unresolved_names());
      if !self.options.minify {
        collector.insert_all(module.scope_tree.declared_scoped_names());
      }
    }
    tracing::debug!("{} reserved name(s)", collector.len());

    let mut generator: Box<dyn NameGenerator> = if self.options.minify {
      let merged = timed(&mut stats.minify, "minify inner scopes", || {
        rename_all_inner_scopes(&mut graph)
      })?;
      Box::new(merged.with_prev(Box::new(collector)))
    } else {
      Box::new(ReadableNameGenerator::with_prev(Box::new(collector)))
    };

    imports.distribute_names(&mut *generator);
    self.rename_roots(&mut graph, &order, &mut *generator)?;

    let mut link = Linker::new(&graph, &mut imports, &mut *generator).link(&order)?;
    let entry_external_stars = std::mem::take(&mut link.entry_external_stars);
    let entry_exports = apply_link(&mut graph, link)?;

    timed(&mut stats.codegen, "codegen", || {
      codegen_modules(&mut graph, &order, &config)
    });

    let file = self
      .options
      .output_path()
      .file_name()
      .map(|name| name.to_string_lossy().to_string())
      .unwrap_or_default();
    let compositor = timed(&mut stats.compose, "module composition", || {
      let exports = entry_external_stars
        .into_iter()
        .map(build_export_all)
        .chain((!entry_exports.is_empty()).then(|| build_exports_stmt(entry_exports)))
        .collect();
      compose(&mut graph, &order, &imports, exports, &config, file)
    });

    let (code, map) = compositor.finish();
    let map = timed(&mut stats.sourcemap, "sourcemap finalize", || {
      map.map(SourceMapGenerator::finalize)
    });

    stats.total = start.elapsed();
    tracing::debug!("bundled {} module(s)", stats.module_count);
    Ok(BundleOutput { code, map, stats })
  }

  /// One shared generator, in post-order, so names are deterministic.
  #[tracing::instrument(skip_all)]
  fn rename_roots(
    &self,
    graph: &mut ModuleGraph,
    order: &[ModuleId],
    generator: &mut dyn NameGenerator,
  ) -> BundleResult<()> {
    for id in order {
      let module = graph.module_mut(*id);
      rename_root_variables(module, generator)
        .map_err(|e| BuildError::new(Diagnostic::new(module.path.clone(), e)))?;
    }
    Ok(())
  }
}

/// Renames import bindings to what they link to and places namespace objects. Returns the
/// exports of the entry.
fn apply_link(
  graph: &mut ModuleGraph,
  link: LinkResult,
) -> BundleResult<Vec<(Atom, Atom)>> {
  let LinkResult {
    renames,
    self_aliases,
    namespace_objects,
    entry_exports,
    ..
  } = link;

  let mut errors = vec![];
  for (id, renames) in renames {
    let module = graph.module_mut(id);
    let root = module.scope_tree.root();
    if let Err(e) = module.scope_tree.batch_rename(root, renames) {
      errors.push(Diagnostic::new(module.path.clone(), e));
    }
  }
  for (id, aliases) in self_aliases {
    let module = graph.module_mut(id);
    for (import, local) in aliases {
      if let Err(e) = module.scope_tree.alias_import(import, local) {
        errors.push(Diagnostic::new(module.path.clone(), e));
      }
    }
  }
  if let Some(errors) = BuildError::from_vec(errors) {
    return Err(errors);
  }

  for (id, item) in namespace_objects {
    graph.module_mut(id).ast.body.insert(0, item);
  }
  Ok(entry_exports)
}

fn codegen_modules(graph: &mut ModuleGraph, order: &[ModuleId], config: &CodeGenConfig) {
  let file_ids = order
    .iter()
    .enumerate()
    .map(|(file_id, id)| (*id, file_id as u32))
    .collect::<rustc_hash::FxHashMap<_, _>>();
  graph.modules.par_iter_mut().for_each(|module| {
    let Some(file_id) = file_ids.get(&module.id).copied() else {
      return;
    };
    let rename_map = module.scope_tree.rename_map();
    lower_module_decls(&mut module.ast);
    module.ast.visit_mut_with(&mut renamer(&rename_map));
    module.codegen(config, file_id);
  });
}

/// External imports, then modules in post-order, then the exports of the entry.
fn compose(
  graph: &mut ModuleGraph,
  order: &[ModuleId],
  imports: &GlobalImportHandler,
  exports: Vec<ast::ModuleItem>,
  config: &CodeGenConfig,
  file: String,
) -> ModuleCompositor {
  let sourcemap = config.sourcemap.then(|| {
    let mut generator = SourceMapGenerator::new(file);
    for id in order {
      let module = graph.module(*id);
      generator.add_source(module.path.clone(), module.source.clone());
    }
    generator
  });
  let mut compositor = ModuleCompositor::new(sourcemap);

  if !imports.is_empty() {
    compositor.append(print_module(&synthetic_module(imports.gen_ast()), config, None));
  }
  for id in order {
    if let Some(fragment) = graph.module_mut(*id).fragment.take() {
      compositor.append(fragment);
    }
  }
  if !exports.is_empty() {
    compositor.append(print_module(&synthetic_module(exports), config, None));
  }
  compositor
}

fn synthetic_module(body: Vec<ast::ModuleItem>) -> ast::Module {
  ast::Module {
    span: DUMMY_SP,
    body,
    shebang: None,
  }
}

fn write_output(out_path: &Path, output: &BundleOutput) -> jetpack_error::Result<()> {
  if let Some(parent) = out_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .map_err(|e| Error::io_error(e).context(format!("Create directory: {}", parent.display())))?;
  }
  std::fs::write(out_path, &output.code)
    .map_err(|e| Error::io_error(e).context(format!("Write file: {}", out_path.display())))?;
  if let Some(map) = &output.map {
    let map_path = format!("{}.map", out_path.display());
    std::fs::write(&map_path, map.to_json_string()?)
      .map_err(|e| Error::io_error(e).context(format!("Write file: {map_path}")))?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::fs;

  use jetpack_sourcemap::SourceMapDecoder;

  use super::*;

  fn bundle_dir(files: &[(&str, &str)], options: impl FnOnce(&mut BundleOptions)) -> BundleResult<BundleOutput> {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
      let path = dir.path().join(name);
      fs::create_dir_all(path.parent().unwrap()).unwrap();
      fs::write(path, content).unwrap();
    }
    let mut bundle_options = BundleOptions::new(dir.path().join(files[0].0).to_string_lossy());
    bundle_options.base_path = Some(dir.path().to_path_buf());
    bundle_options.threads = 2;
    options(&mut bundle_options);
    Bundler::new(bundle_options).build()
  }

  #[test]
  fn imports_link_to_exported_binding() {
    let output = bundle_dir(
      &[
        ("b.js", "import { name as n } from './a';\nconsole.log(n);"),
        ("a.js", "export const name = 3;"),
      ],
      |_| {},
    )
    .unwrap();
    assert_eq!(output.code, "const name = 3;\nconsole.log(name);\n");
    assert_eq!(output.stats.module_count, 2);
  }

  #[test]
  fn colliding_roots_are_renamed() {
    let output = bundle_dir(
      &[
        ("main.js", "import { get } from './a';\nconst value = 2;\nconsole.log(get(), value);"),
        ("a.js", "const value = 1;\nexport function get() { return value; }"),
      ],
      |_| {},
    )
    .unwrap();
    assert!(output.code.contains("const value = 1;"));
    assert!(output.code.contains("const value_0 = 2;"));
    assert!(output.code.contains("console.log(get(), value_0);"));
  }

  #[test]
  fn external_imports_are_merged() {
    let output = bundle_dir(
      &[
        ("main.js", "import React from 'react';\nimport './a';\nReact.render();"),
        ("a.js", "import R, { useState } from 'react';\nR.createElement(useState);"),
      ],
      |_| {},
    )
    .unwrap();
    assert_eq!(output.code.matches("from 'react'").count(), 1);
    // The first default import seen names the shared alias
    assert!(output.code.contains("import R, { useState } from 'react';"));
    assert!(output.code.contains("R.createElement(useState);"));
    assert!(output.code.contains("R.render();"));
  }

  #[test]
  fn namespace_import_builds_object() {
    let output = bundle_dir(
      &[
        ("main.js", "import * as util from './util';\nconsole.log(util.a);"),
        ("util.js", "export const a = 1;\nexport function b() {}"),
      ],
      |_| {},
    )
    .unwrap();
    assert!(output.code.contains("var util_ns = {"));
    assert!(output.code.contains("console.log(util_ns.a);"));
  }

  #[test]
  fn entry_exports_are_emitted() {
    let output = bundle_dir(
      &[
        ("main.js", "export { a as b } from './a';\nexport default 42;"),
        ("a.js", "export const a = 1;"),
      ],
      |_| {},
    )
    .unwrap();
    assert!(output.code.contains("export {"));
    assert!(output.code.contains("a as b"));
    assert!(output.code.contains("_default as default"));
  }

  #[test]
  fn missing_export_is_reported() {
    let err = bundle_dir(
      &[
        ("main.js", "import { nope } from './a';\nnope();"),
        ("a.js", "export const a = 1;"),
      ],
      |_| {},
    )
    .unwrap_err();
    assert_eq!(err.diagnostics().len(), 1);
    assert_eq!(err.diagnostics()[0].code(), "MISSING_EXPORT");
  }

  #[test]
  fn minified_names_are_unique_and_not_reserved() {
    let output = bundle_dir(
      &[
        ("main.js", "import { add } from './math';\nfunction run(first, second) { return add(first, second); }\nrun(1, 2);"),
        ("math.js", "export function add(left, right) { const total = left + right; return total; }"),
      ],
      |options| options.minify = true,
    )
    .unwrap();
    assert!(!output.code.contains("total"));
    assert!(!output.code.contains("first"));
    assert!(!output.code.contains("add"));
  }

  #[test]
  fn minify_rewrites_only_global_undefined() {
    let output = bundle_dir(
      &[(
        "main.js",
        "const o = { undefined, x: 1 };\nfunction f(undefined) { return undefined; }\nconsole.log(o, f(2), undefined);",
      )],
      |options| options.minify = true,
    )
    .unwrap();
    assert!(output.code.contains("={undefined,x:1};"));
    assert!(output.code.contains(",void 0);"));
    assert_eq!(output.code.matches("void 0").count(), 1);
  }

  #[test]
  fn sourcemap_points_back_to_entry() {
    let output = bundle_dir(
      &[("main.js", "function main() {\n  console.log('hello world');\n}\n")],
      |options| options.sourcemap = true,
    )
    .unwrap();
    let map = output.map.unwrap();
    assert_eq!(map.version, 3);
    assert_eq!(map.sources.len(), 1);
    assert!(map.sources[0].ends_with("main.js"));

    let decoded = SourceMapDecoder::decode(map).unwrap();
    let originals = decoded
      .mappings
      .iter()
      .map(|m| (m.original_line, m.original_column))
      .collect::<Vec<_>>();
    // console, log and the string literal
    assert!(originals.contains(&(1, 2)));
    assert!(originals.contains(&(1, 10)));
    assert!(originals.contains(&(1, 14)));
  }

  /// The text of 0-based `line` from UTF-16 `column` on.
  fn rest_of_line(text: &str, line: u32, column: u32) -> String {
    let line = text.lines().nth(line as usize).unwrap();
    let units = line.encode_utf16().skip(column as usize).collect::<Vec<_>>();
    String::from_utf16(&units).unwrap()
  }

  /// A leading identifier, number or quoted string.
  fn leading_token(text: &str) -> &str {
    let mut chars = text.char_indices();
    let end = match chars.next() {
      Some((_, quote @ ('\'' | '"'))) => chars
        .find(|(_, ch)| *ch == quote)
        .map_or(text.len(), |(idx, ch)| idx + ch.len_utf8()),
      _ => text
        .find(|ch: char| !(ch.is_alphanumeric() || ch == '_' || ch == '$'))
        .unwrap_or(text.len()),
    };
    &text[..end]
  }

  #[test]
  fn sourcemap_columns_land_on_the_same_token() {
    let output = bundle_dir(
      &[
        (
          "main.js",
          "import React from 'react';\nimport { greet, suffix } from './greet';\nconst banner = 'ünï';\nconsole.log('😀 wide', banner,\n  greet(React) + suffix);",
        ),
        (
          "greet.js",
          "const prefix = '𝒳 héllo', tail = 1;\nexport const suffix = '!' + tail;\nexport function greet(who) {\n  return prefix + who;\n}",
        ),
      ],
      |options| options.sourcemap = true,
    )
    .unwrap();
    // The merged external import is the first line
    assert!(output.code.starts_with("import React from 'react';\n"));

    let decoded = SourceMapDecoder::decode(output.map.unwrap()).unwrap();
    assert_eq!(decoded.sources.len(), 2);
    let greet = decoded
      .sources
      .iter()
      .position(|source| source.ends_with("greet.js"))
      .unwrap() as u32;
    assert!(decoded.mappings.len() >= 14);

    for mapping in &decoded.mappings {
      let source = &decoded.sources_content[mapping.source_index as usize];
      let original = rest_of_line(source, mapping.original_line, mapping.original_column);
      let generated = rest_of_line(&output.code, mapping.generated_line - 1, mapping.generated_column);
      let token = leading_token(&original);
      assert!(!token.is_empty(), "{mapping:?}");
      assert!(generated.starts_with(token), "{mapping:?}: {generated:?} does not start with {token:?}");
    }

    let first_greet_line = decoded
      .mappings
      .iter()
      .filter(|mapping| mapping.source_index == greet)
      .map(|mapping| mapping.generated_line)
      .min();
    assert_eq!(first_greet_line, Some(2));
    // console, log, the astral string and `banner` after it
    let after_astral = decoded
      .mappings
      .iter()
      .filter(|mapping| mapping.source_index != greet && mapping.original_line == 3)
      .count();
    assert_eq!(after_astral, 4);
  }

  #[test]
  fn module_can_import_itself() {
    let output = bundle_dir(
      &[(
        "f.js",
        "import self from './f';\nexport default function named() { return self; }\nconsole.log(named());",
      )],
      |_| {},
    )
    .unwrap();
    assert!(output.code.contains("return _default;"));
    assert!(output.code.contains("var _default = named;"));
    assert!(!output.code.contains("self"));
  }

  #[test]
  fn string_entry_bundles_relative_imports() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("dep.js"), "export const x = 1;").unwrap();
    let mut options = BundleOptions::default();
    options.base_path = Some(dir.path().to_path_buf());
    let output = Bundler::new(options)
      .build_string("import { x } from './dep';\nconsole.log(x);")
      .unwrap();
    assert_eq!(output.code, "const x = 1;\nconsole.log(x);\n");
  }

  #[test]
  fn write_creates_output_and_map() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.js"), "console.log(1);").unwrap();
    let mut options = BundleOptions::new(dir.path().join("main.js").to_string_lossy());
    options.output = Some(dir.path().join("dist/out.js"));
    options.sourcemap = true;
    Bundler::new(options).write().unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("dist/out.js")).unwrap(), "console.log(1);\n");
    let map = fs::read_to_string(dir.path().join("dist/out.js.map")).unwrap();
    let map: SourceMapJson = serde_json::from_str(&map).unwrap();
    assert_eq!(map.version, 3);
    assert_eq!(map.file, "out.js");
  }
}
