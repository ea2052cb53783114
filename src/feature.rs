//! Feature files, parsed with the `gherkin` crate and narrowed to what the runner executes.
//!
//! `Feature:`, `Background:`, `Scenario:` / `Example:`, step keywords, doc strings, tags, comments,
//! and descriptions come straight from the parser. Scenario outlines, `Rule:` blocks, and data
//! tables are rejected rather than misread.

// crates.io
use gherkin::{GherkinEnv, StepType};
// self
use crate::_prelude::*;

/// Step keyword as written. Matching ignores it; it only shows up in reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKeyword {
	/// `Given`
	Given,
	/// `When`
	When,
	/// `Then`
	Then,
	/// `And`
	And,
	/// `But`
	But,
	/// `*`
	Star,
}
impl StepKeyword {
	const ALL: [StepKeyword; 6] = [
		StepKeyword::Given,
		StepKeyword::When,
		StepKeyword::Then,
		StepKeyword::And,
		StepKeyword::But,
		StepKeyword::Star,
	];

	/// Keyword text.
	pub const fn as_str(self) -> &'static str {
		match self {
			StepKeyword::Given => "Given",
			StepKeyword::When => "When",
			StepKeyword::Then => "Then",
			StepKeyword::And => "And",
			StepKeyword::But => "But",
			StepKeyword::Star => "*",
		}
	}

	fn of(step: &gherkin::Step) -> Self {
		let written = step.keyword.trim();

		Self::ALL.into_iter().find(|keyword| keyword.as_str() == written).unwrap_or(match step.ty {
			StepType::Given => StepKeyword::Given,
			StepType::When => StepKeyword::When,
			StepType::Then => StepKeyword::Then,
		})
	}
}
impl Display for StepKeyword {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One step line plus its doc string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
	/// Keyword as written.
	pub keyword: StepKeyword,
	/// Text after the keyword.
	pub text: String,
	/// Attached doc string, dedented, without surrounding blank lines.
	pub doc_string: Option<String>,
	/// One-based source line.
	pub line: usize,
}
impl TryFrom<gherkin::Step> for Step {
	type Error = Error;

	fn try_from(step: gherkin::Step) -> Result<Self> {
		let line = step.position.line;

		if step.table.is_some() {
			return Err(parse_error(Some(line), "data tables are not supported"));
		}

		Ok(Self {
			keyword: StepKeyword::of(&step),
			text: step.value,
			doc_string: step.docstring.map(|body| {
				body.trim_start_matches(['\r', '\n']).trim_end().to_owned()
			}),
			line,
		})
	}
}

/// A named sequence of steps run with a fresh context.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Scenario {
	/// Scenario title.
	pub name: String,
	/// Tags (without `@`), including the feature's tags.
	pub tags: Vec<String>,
	/// Steps in declaration order (background excluded).
	pub steps: Vec<Step>,
	/// One-based source line of the header.
	pub line: usize,
}
impl Scenario {
	fn from_gherkin(scenario: gherkin::Scenario, feature_tags: &[String]) -> Result<Self> {
		let line = scenario.position.line;

		if !scenario.examples.is_empty() || scenario.keyword.starts_with("Scenario ") {
			return Err(parse_error(Some(line), "scenario outlines are not supported"));
		}

		Ok(Self {
			name: scenario.name,
			tags: feature_tags.iter().cloned().chain(scenario.tags).collect(),
			steps: convert_steps(scenario.steps)?,
			line,
		})
	}
}

/// Parsed feature file.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Feature {
	/// Feature title.
	pub name: String,
	/// Feature-level tags.
	pub tags: Vec<String>,
	/// Steps run before every scenario.
	pub background: Vec<Step>,
	/// Scenarios in declaration order.
	pub scenarios: Vec<Scenario>,
}
impl Feature {
	/// Parses feature `source`.
	pub fn parse(source: &str) -> Result<Self> {
		let parsed = gherkin::Feature::parse(source, GherkinEnv::default())
			.map_err(|err| parse_error(None, err.to_string()))?;

		Self::try_from(parsed)
	}
}
impl TryFrom<gherkin::Feature> for Feature {
	type Error = Error;

	fn try_from(feature: gherkin::Feature) -> Result<Self> {
		if let Some(rule) = feature.rules.first() {
			return Err(parse_error(Some(rule.position.line), "`Rule:` blocks are not supported"));
		}

		let background = match feature.background {
			Some(background) => convert_steps(background.steps)?,
			None => Vec::new(),
		};
		let scenarios = feature
			.scenarios
			.into_iter()
			.map(|scenario| Scenario::from_gherkin(scenario, &feature.tags))
			.collect::<Result<_>>()?;

		Ok(Self { name: feature.name, tags: feature.tags, background, scenarios })
	}
}

fn convert_steps(steps: Vec<gherkin::Step>) -> Result<Vec<Step>> {
	steps.into_iter().map(Step::try_from).collect()
}

fn parse_error(line: Option<usize>, reason: impl Into<String>) -> Error {
	Error::FeatureParse { line, reason: reason.into() }
}
