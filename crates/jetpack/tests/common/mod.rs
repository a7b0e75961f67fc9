use std::path::Path;

use jetpack::Bundler;
use jetpack_sourcemap::SourceMapDecoder;
use jetpack_test_utils::TestConfig;

pub fn run_test(test_config_path: &Path) {
  let fixture_path = test_config_path.parent().unwrap();
  let config = TestConfig::from_config_path(test_config_path);
  let output = Bundler::new(config.bundle_options(fixture_path)).build();

  // If the test config has an expected error, assert that the error matches
  if let Some(expected_error) = &config.expected_error {
    let errors = output.expect_err("Expected error but got success").into_vec();
    assert_eq!(errors.len(), 1, "{errors:#?}");
    assert_eq!(errors[0].code(), expected_error.code);
    return;
  }

  let output = output.unwrap_or_else(|errors| panic!("{}", errors.to_readable_string(fixture_path)));
  let failures = config.check_output(&output.code);
  assert!(
    failures.is_empty(),
    "{}\n---------- output ----------\n{}",
    failures.join("\n"),
    output.code
  );

  if config.sourcemap {
    let map = output.map.expect("sourcemap was requested");
    assert_eq!(map.version, 3);
    let decoded = SourceMapDecoder::decode(map).unwrap();
    let generated_lines = output.code.lines().count() as u32;
    for mapping in &decoded.mappings {
      assert!((1..=generated_lines).contains(&mapping.generated_line), "{mapping:?}");
      let source = &decoded.sources_content[mapping.source_index as usize];
      assert!((mapping.original_line as usize) < source.lines().count().max(1), "{mapping:?}");
    }
  }
}
