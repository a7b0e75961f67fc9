use clap::Parser;
use jetpack::Cli;

fn main() -> anyhow::Result<()> {
  jetpack_tracing::enable_tracing_on_demand();
  let code = jetpack::run(Cli::parse())?;
  if code != 0 {
    std::process::exit(code);
  }
  Ok(())
}
