use std::path::Path;

use serde::Deserialize;

use crate::Occurrence;

fn entry_by_default() -> String {
  "main.js".to_string()
}

/// Describes one fixture, read from its `test.config.json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestConfig {
  #[serde(default = "entry_by_default")]
  pub entry: String,
  #[serde(default)]
  pub minify: bool,
  #[serde(default)]
  pub sourcemap: bool,
  #[serde(default)]
  pub jsx: bool,
  #[serde(default)]
  pub library: bool,
  #[serde(default)]
  pub expected: Expected,
  /// The build must fail with this single error.
  #[serde(default)]
  pub expected_error: Option<ExpectedError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Expected {
  #[serde(default)]
  pub contains: Vec<String>,
  #[serde(default)]
  pub not_contains: Vec<String>,
  #[serde(default)]
  pub occurrences: Vec<crate::Occurrence>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExpectedError {
  pub code: String,
}

impl TestConfig {
  pub fn from_config_path(filepath: &Path) -> Self {
    let content = std::fs::read_to_string(filepath).unwrap_or_else(|_| "{}".to_string());
    serde_json::from_str(&content)
      .unwrap_or_else(|e| panic!("invalid test config {}: {e}", filepath.display()))
  }

  /// Every failed expectation, one line each.
  pub fn check_output(&self, code: &str) -> Vec<String> {
    let mut failures = vec![];
    for text in &self.expected.contains {
      if !code.contains(text.as_str()) {
        failures.push(format!("expected output to contain {text:?}"));
      }
    }
    for text in &self.expected.not_contains {
      if code.contains(text.as_str()) {
        failures.push(format!("expected output not to contain {text:?}"));
      }
    }
    for Occurrence { text, count } in &self.expected.occurrences {
      let found = code.matches(text.as_str()).count();
      if found != *count {
        failures.push(format!("expected {text:?} {count} time(s), found {found}"));
      }
    }
    failures
  }
}
