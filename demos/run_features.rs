//! Runs feature files against the real deployments configured through `.env` and the process
//! environment (`CLIENT_ID`, `CLIENT_SECRET`, and the optional `DEV2_*` / `STAGE_*` overrides).
//!
//! `cargo run --example run_features -- features/recognitions.feature`

// std
use std::{env, fs, process::ExitCode};
// crates.io
use color_eyre::{Result, eyre::WrapErr};
use tracing_subscriber::EnvFilter;
// self
use review_api_bdd::{harness::Harness, runner::Runner};

#[tokio::main]
async fn main() -> Result<ExitCode> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("review_api_bdd=info")),
		)
		.init();

	let paths = env::args().skip(1).collect::<Vec<_>>();

	if paths.is_empty() {
		eprintln!("usage: run_features <path.feature>...");

		return Ok(ExitCode::from(2));
	}

	let runner = Runner::with_default_steps(Harness::from_env()?)?;
	let mut failed = 0;

	for path in &paths {
		let source = fs::read_to_string(path).wrap_err_with(|| format!("cannot read {path}"))?;
		let report = runner.run_source(&source).await.wrap_err_with(|| format!("in {path}"))?;

		println!("{report}\n");

		failed += report.counts().1;
	}

	Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
