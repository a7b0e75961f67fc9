use std::collections::BTreeMap;

use serde::Serialize;

use crate::{passes::collect_export_names, BundleOptions, BundleResult, ModuleResolver};

/// A summary of the imports and exports of an entry module.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleAnalysis {
  pub entry: String,
  /// Local import name to the specifier it is imported from.
  pub import_stat: BTreeMap<String, String>,
  pub total_files: usize,
  /// Export names of the entry, re-exports included.
  pub exports: Vec<String>,
}

impl ModuleAnalysis {
  pub fn to_json_string(&self) -> jetpack_error::Result<String> {
    serde_json::to_string_pretty(self).map_err(|e| jetpack_error::anyhow::Error::from(e).into())
  }
}

/// Discovers the graph of `options.entry`, following imports unless `trace_file` is off.
#[tracing::instrument(skip_all)]
pub fn analyze_module(options: &BundleOptions) -> BundleResult<ModuleAnalysis> {
  jetpack_tracing::enable_tracing_on_demand();
  let (resolver, entry) = options.file_resolver();
  let graph = ModuleResolver::new(resolver, options.discovery_options()).begin_from_entry(&entry)?;

  let module = graph.entry_module();
  let import_stat = module
    .scan_result
    .imports
    .iter()
    .flat_map(|(source, specs)| {
      specs
        .iter()
        .map(move |spec| (spec.imported_as.name().to_string(), source.to_string()))
    })
    .collect();

  // Without tracing, re-exported modules are not in the graph
  let exports = if options.trace_file {
    collect_export_names(&graph, graph.entry)
  } else {
    module
      .scan_result
      .local_exports
      .keys()
      .chain(module.scan_result.re_exports.values().flatten().map(|spec| &spec.exported_as))
      .cloned()
      .collect()
  };

  Ok(ModuleAnalysis {
    entry: module.path.clone(),
    import_stat,
    total_files: graph.len(),
    exports: exports.into_iter().map(|name| name.to_string()).collect(),
  })
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  fn setup() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
      dir.path().join("main.js"),
      "import { a as first } from './a';\nimport * as b from './b';\nexport * from './b';\nexport const main = first + b.b;",
    )
    .unwrap();
    fs::write(dir.path().join("a.js"), "export const a = 1;").unwrap();
    fs::write(dir.path().join("b.js"), "export const b = 2;\nexport default 3;").unwrap();
    dir
  }

  #[test]
  fn follows_imports() {
    let dir = setup();
    let mut options = BundleOptions::new(dir.path().join("main.js").to_string_lossy());
    options.base_path = Some(dir.path().to_path_buf());
    let analysis = analyze_module(&options).unwrap();

    assert_eq!(analysis.total_files, 3);
    assert_eq!(analysis.import_stat.get("first").map(String::as_str), Some("./a"));
    assert_eq!(analysis.import_stat.get("b").map(String::as_str), Some("./b"));
    // `export *` never forwards `default`
    assert_eq!(analysis.exports, vec!["main".to_string(), "b".to_string()]);

    let json = analysis.to_json_string().unwrap();
    assert!(json.contains("\"importStat\""));
    assert!(json.contains("\"totalFiles\": 3"));
  }

  #[test]
  fn no_trace_stays_in_entry() {
    let dir = setup();
    let mut options = BundleOptions::new(dir.path().join("main.js").to_string_lossy());
    options.base_path = Some(dir.path().to_path_buf());
    options.trace_file = false;
    let analysis = analyze_module(&options).unwrap();

    assert_eq!(analysis.total_files, 1);
    assert_eq!(analysis.exports, vec!["main".to_string()]);
  }
}
