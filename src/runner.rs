//! Drives parsed features through the step registry.
//!
//! Scenarios run one after another, each with a fresh [`ScenarioContext`]; background steps run
//! first. The first failing step fails the scenario and the remaining steps are reported as
//! skipped. Nothing is retried.

// self
use crate::{
	_prelude::*,
	context::ScenarioContext,
	error::ConfigError,
	feature::{Feature, Scenario, Step, StepKeyword},
	harness::Harness,
	obs::{self, FlowOutcome, FlowSpan},
	steps::StepRegistry,
};

/// Result of one step.
#[derive(Debug)]
pub enum StepOutcome {
	/// Handler returned `Ok`.
	Passed,
	/// Handler (or step resolution) failed.
	Failed(Error),
	/// An earlier step of the scenario failed.
	Skipped,
}
impl StepOutcome {
	/// Returns a stable label for logs and summaries.
	pub const fn as_str(&self) -> &'static str {
		match self {
			StepOutcome::Passed => "passed",
			StepOutcome::Failed(_) => "failed",
			StepOutcome::Skipped => "skipped",
		}
	}
}

/// Outcome of one executed (or skipped) step.
#[derive(Debug)]
pub struct StepReport {
	/// Keyword as written.
	pub keyword: StepKeyword,
	/// Step text.
	pub text: String,
	/// Source line.
	pub line: usize,
	/// What happened.
	pub outcome: StepOutcome,
	/// Wall time spent in the handler; zero for skipped steps.
	pub elapsed: Duration,
}

/// Outcome of one scenario.
#[derive(Debug)]
pub struct ScenarioReport {
	/// Scenario title.
	pub name: String,
	/// Effective tags.
	pub tags: Vec<String>,
	/// Source line of the header.
	pub line: usize,
	/// When the first step started.
	pub started_at: OffsetDateTime,
	/// Wall time of the whole scenario.
	pub elapsed: Duration,
	/// Background steps followed by the scenario's own steps.
	pub steps: Vec<StepReport>,
}
impl ScenarioReport {
	/// Whether every step passed.
	pub fn passed(&self) -> bool {
		self.steps.iter().all(|step| matches!(step.outcome, StepOutcome::Passed))
	}

	/// The failing step, if any.
	pub fn failure(&self) -> Option<(&StepReport, &Error)> {
		self.steps.iter().find_map(|step| match &step.outcome {
			StepOutcome::Failed(err) => Some((step, err)),
			_ => None,
		})
	}
}

/// Outcome of one feature.
#[derive(Debug)]
pub struct FeatureReport {
	/// Feature title.
	pub name: String,
	/// Scenario reports in declaration order.
	pub scenarios: Vec<ScenarioReport>,
}
impl FeatureReport {
	/// Whether every scenario passed.
	pub fn passed(&self) -> bool {
		self.scenarios.iter().all(ScenarioReport::passed)
	}

	/// Number of passed and failed scenarios.
	pub fn counts(&self) -> (usize, usize) {
		let passed = self.scenarios.iter().filter(|scenario| scenario.passed()).count();

		(passed, self.scenarios.len() - passed)
	}
}
impl Display for FeatureReport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		writeln!(f, "Feature: {}", self.name)?;

		for scenario in &self.scenarios {
			let verdict = if scenario.passed() { "passed" } else { "FAILED" };

			writeln!(f, "  Scenario: {} ({verdict}, {})", scenario.name, scenario.elapsed)?;

			for step in &scenario.steps {
				writeln!(f, "    [{}] {} {}", step.outcome.as_str(), step.keyword, step.text)?;

				if let StepOutcome::Failed(err) = &step.outcome {
					for line in err.to_string().lines() {
						writeln!(f, "        {line}")?;
					}
				}
			}
		}

		let (passed, failed) = self.counts();

		write!(f, "{} scenarios ({passed} passed, {failed} failed)", self.scenarios.len())
	}
}

/// Executes features against one [`Harness`].
#[derive(Debug)]
pub struct Runner {
	/// Long-lived collaborators handed to every step.
	pub harness: Harness,
	/// Step vocabulary.
	pub registry: StepRegistry,
}
impl Runner {
	/// Creates a runner over an explicit registry.
	pub fn new(harness: Harness, registry: StepRegistry) -> Self {
		Self { harness, registry }
	}

	/// Creates a runner with the review and recognition vocabulary.
	pub fn with_default_steps(harness: Harness) -> Result<Self, ConfigError> {
		Ok(Self::new(harness, StepRegistry::with_default_steps()?))
	}

	/// Parses and runs feature `source`.
	pub async fn run_source(&self, source: &str) -> Result<FeatureReport> {
		let feature = Feature::parse(source)?;

		Ok(self.run_feature(&feature).await)
	}

	/// Runs every scenario of `feature`.
	pub async fn run_feature(&self, feature: &Feature) -> FeatureReport {
		let mut scenarios = Vec::with_capacity(feature.scenarios.len());

		for scenario in &feature.scenarios {
			scenarios.push(self.run_scenario(feature, scenario).await);
		}

		FeatureReport { name: feature.name.clone(), scenarios }
	}

	/// Runs `feature`'s background followed by `scenario` with a fresh context.
	pub async fn run_scenario(&self, feature: &Feature, scenario: &Scenario) -> ScenarioReport {
		let mut ctx = ScenarioContext::new();
		let mut steps = Vec::with_capacity(feature.background.len() + scenario.steps.len());
		let mut failed = false;
		let started_at = OffsetDateTime::now_utc();

		#[cfg(feature = "tracing")]
		tracing::info!(feature = %feature.name, scenario = %scenario.name, "scenario started");

		for step in feature.background.iter().chain(&scenario.steps) {
			let report = if failed {
				skipped(step)
			} else {
				self.run_step(&scenario.name, step, &mut ctx).await
			};

			failed |= matches!(report.outcome, StepOutcome::Failed(_));

			steps.push(report);
		}

		let report = ScenarioReport {
			name: scenario.name.clone(),
			tags: scenario.tags.clone(),
			line: scenario.line,
			started_at,
			elapsed: OffsetDateTime::now_utc() - started_at,
			steps,
		};

		#[cfg(feature = "tracing")]
		tracing::info!(
			scenario = %report.name,
			passed = report.passed(),
			elapsed = %report.elapsed,
			"scenario finished"
		);

		report
	}

	async fn run_step(&self, scenario: &str, step: &Step, ctx: &mut ScenarioContext) -> StepReport {
		let span = FlowSpan::step(scenario, &step.text);
		let started_at = OffsetDateTime::now_utc();

		obs::record_step_outcome(FlowOutcome::Attempt);

		let result = span
			.instrument(self.registry.execute(
				&self.harness,
				ctx,
				&step.text,
				step.doc_string.as_deref(),
			))
			.await;
		let elapsed = OffsetDateTime::now_utc() - started_at;
		let outcome = match result {
			Ok(()) => {
				obs::record_step_outcome(FlowOutcome::Success);

				StepOutcome::Passed
			},
			Err(err) => {
				obs::record_step_outcome(FlowOutcome::Failure);

				#[cfg(feature = "tracing")]
				tracing::error!(line = step.line, step = %step.text, error = %err, "step failed");

				StepOutcome::Failed(err)
			},
		};

		StepReport {
			keyword: step.keyword,
			text: step.text.clone(),
			line: step.line,
			outcome,
			elapsed,
		}
	}
}

fn skipped(step: &Step) -> StepReport {
	StepReport {
		keyword: step.keyword,
		text: step.text.clone(),
		line: step.line,
		outcome: StepOutcome::Skipped,
		elapsed: Duration::ZERO,
	}
}
