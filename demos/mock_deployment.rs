//! Runs the bundled features against an in-process mock of the dev2 and stage deployments and
//! prints the report.
//!
//! `RUST_LOG=review_api_bdd=debug cargo run --example mock_deployment --features test`

#[path = "../tests/support/mod.rs"]
mod support;

// crates.io
use color_eyre::{Result, eyre::eyre};
use httpmock::MockServer;
use tracing_subscriber::EnvFilter;
// self
use review_api_bdd::{_preludet::mock_harness, runner::Runner};

const FEATURES: [&str; 2] = [
	include_str!("../features/performance_reviews.feature"),
	include_str!("../features/recognitions.feature"),
];

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("review_api_bdd=info")),
		)
		.init();

	let server = MockServer::start_async().await;

	support::mount(&server).await;

	let runner = Runner::with_default_steps(mock_harness(&server.base_url()))?;
	let mut failed = 0;

	for source in FEATURES {
		let report = runner.run_source(source).await?;

		println!("{report}\n");

		failed += report.counts().1;
	}

	if failed > 0 {
		return Err(eyre!("{failed} scenario(s) failed against the mock deployment"));
	}

	Ok(())
}
