use std::path::PathBuf;

use clap::Parser;
use jetpack_core::{analyze_module, BundleOptions, Bundler};

/// Exit code of a build that reported diagnostics.
pub const EXIT_BUILD_ERROR: i32 = 3;

/// jetpack: bundles an ES module graph into a single file
#[derive(Parser, Debug)]
#[command(name = "jetpack", version)]
pub struct Cli {
  /// Entry module
  pub entry: Option<String>,

  /// Output file, `<entry stem>.bundle.js` by default
  #[arg(short, long)]
  pub out: Option<PathBuf>,

  /// Shorten identifiers and drop whitespace
  #[arg(long)]
  pub minify: bool,

  /// Write `<out>.map` next to the output
  #[arg(long)]
  pub sourcemap: bool,

  /// Parse every module as JSX
  #[arg(long)]
  pub jsx: bool,

  /// Only look at the entry, do not follow imports
  #[arg(long)]
  pub no_trace: bool,

  /// Keep bare specifiers external
  #[arg(long)]
  pub library: bool,

  /// Print imports and exports of a module as JSON instead of bundling
  #[arg(long, value_name = "PATH")]
  pub analyze_module: Option<String>,

  /// Print the time spent in each phase
  #[arg(long)]
  pub profile: bool,

  /// Print trace logs to stderr
  #[arg(long)]
  pub trace_log: bool,
}

impl Cli {
  pub fn bundle_options(&self, entry: String) -> BundleOptions {
    BundleOptions {
      entry,
      output: self.out.clone(),
      minify: self.minify,
      sourcemap: self.sourcemap,
      jsx: self.jsx,
      trace_file: !self.no_trace,
      library: self.library,
      ..Default::default()
    }
  }
}

/// Runs the command and returns the process exit code.
pub fn run(cli: Cli) -> anyhow::Result<i32> {
  if cli.trace_log {
    jetpack_tracing::init();
  }
  let cwd = std::env::current_dir()?;

  if let Some(path) = &cli.analyze_module {
    return match analyze_module(&cli.bundle_options(path.clone())) {
      Ok(analysis) => {
        println!("{}", analysis.to_json_string()?);
        Ok(0)
      }
      Err(errors) => {
        errors.print_to_stderr(&cwd);
        Ok(EXIT_BUILD_ERROR)
      }
    };
  }

  let Some(entry) = cli.entry.clone() else {
    anyhow::bail!("no entry given, see `jetpack --help`");
  };
  match Bundler::new(cli.bundle_options(entry)).write() {
    Ok(output) => {
      if cli.profile {
        print!("{}", output.stats.report());
      }
      println!("Finished.");
      println!(
        "Totally {} file(s) in {} ms.",
        output.stats.module_count,
        output.stats.total.as_millis()
      );
      Ok(0)
    }
    Err(errors) => {
      errors.print_to_stderr(&cwd);
      Ok(EXIT_BUILD_ERROR)
    }
  }
}
