//! Step registry: phrase patterns mapped to handler functions.
//!
//! Each [`StepDefinition`] pairs an anchored regular expression with a plain function pointer.
//! Resolving a step's text yields exactly one definition plus the captured arguments; zero or
//! several matches are errors so a typo in a feature file never silently runs the wrong step.
//! The vocabulary used by the review and recognition features lives in [`catalog`].

pub mod catalog;

// crates.io
use regex::Regex;
// self
use crate::{_prelude::*, context::ScenarioContext, error::ConfigError, harness::Harness};

/// Future returned by step handlers; borrows the harness and the scenario context.
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a>>;

/// Step handler signature.
pub type StepHandler =
	for<'a> fn(&'a Harness, &'a mut ScenarioContext, &'a StepInput) -> StepFuture<'a>;

/// Arguments extracted from one step line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepInput {
	/// Step text without its keyword.
	pub text: String,
	/// Capture groups of the matching pattern, in order.
	pub captures: Vec<String>,
	/// Doc string attached to the step.
	pub doc_string: Option<String>,
}
impl StepInput {
	/// Returns capture `idx`.
	pub fn capture(&self, idx: usize) -> Result<&str> {
		self.captures.get(idx).map(String::as_str).ok_or_else(|| Error::StepArgument {
			text: self.text.clone(),
			what: "pattern capture",
		})
	}

	/// Returns capture `idx` parsed as an HTTP status code.
	pub fn status_code(&self, idx: usize) -> Result<u16> {
		self.capture(idx)?
			.parse()
			.map_err(|_| Error::StepArgument { text: self.text.clone(), what: "status code" })
	}

	/// Returns the doc string, failing when the step has none.
	pub fn doc_string(&self) -> Result<&str> {
		self.doc_string
			.as_deref()
			.ok_or_else(|| Error::StepArgument { text: self.text.clone(), what: "doc string" })
	}
}

/// One registered step phrase.
#[derive(Clone)]
pub struct StepDefinition {
	/// Pattern as written at registration.
	pub source: String,
	pattern: Regex,
	handler: StepHandler,
}
impl StepDefinition {
	/// Compiles `pattern` anchored at both ends.
	pub fn new(pattern: &str, handler: StepHandler) -> Result<Self, ConfigError> {
		let anchored = format!("^(?:{pattern})$");
		let compiled = Regex::new(&anchored).map_err(|source| ConfigError::StepPattern {
			pattern: pattern.to_owned(),
			source,
		})?;

		Ok(Self { source: pattern.to_owned(), pattern: compiled, handler })
	}

	fn captures(&self, text: &str) -> Option<Vec<String>> {
		let captures = self.pattern.captures(text)?;

		Some(
			captures
				.iter()
				.skip(1)
				.map(|group| group.map(|m| m.as_str().to_owned()).unwrap_or_default())
				.collect(),
		)
	}
}
impl Debug for StepDefinition {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("StepDefinition").field(&self.source).finish()
	}
}

/// A step resolved to its handler.
#[derive(Debug)]
pub struct ResolvedStep<'r> {
	/// Matching definition.
	pub definition: &'r StepDefinition,
	/// Extracted arguments.
	pub input: StepInput,
}
impl ResolvedStep<'_> {
	/// Runs the handler against `ctx`.
	pub async fn run(&self, harness: &Harness, ctx: &mut ScenarioContext) -> Result<()> {
		(self.definition.handler)(harness, ctx, &self.input).await
	}
}

/// Ordered table of step definitions.
#[derive(Clone, Debug, Default)]
pub struct StepRegistry {
	definitions: Vec<StepDefinition>,
}
impl StepRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry holding the review and recognition vocabulary.
	pub fn with_default_steps() -> Result<Self, ConfigError> {
		let mut registry = Self::new();

		catalog::register_all(&mut registry)?;

		Ok(registry)
	}

	/// Adds a definition.
	pub fn register(&mut self, pattern: &str, handler: StepHandler) -> Result<(), ConfigError> {
		self.definitions.push(StepDefinition::new(pattern, handler)?);

		Ok(())
	}

	/// Registered definitions in registration order.
	pub fn definitions(&self) -> &[StepDefinition] {
		&self.definitions
	}

	/// Finds the single definition matching `text`.
	pub fn resolve(&self, text: &str, doc_string: Option<&str>) -> Result<ResolvedStep<'_>> {
		let text = text.trim();
		let mut matches = self
			.definitions
			.iter()
			.filter_map(|definition| definition.captures(text).map(|caps| (definition, caps)))
			.collect::<Vec<_>>();

		match matches.len() {
			0 => Err(Error::UndefinedStep { text: text.to_owned() }),
			1 => {
				let (definition, captures) = matches.remove(0);
				let input = StepInput {
					text: text.to_owned(),
					captures,
					doc_string: doc_string.map(str::to_owned),
				};

				Ok(ResolvedStep { definition, input })
			},
			_ => Err(Error::AmbiguousStep {
				text: text.to_owned(),
				patterns: matches.into_iter().map(|(definition, _)| definition.source.clone()).collect(),
			}),
		}
	}

	/// Resolves and runs one step.
	pub async fn execute(
		&self,
		harness: &Harness,
		ctx: &mut ScenarioContext,
		text: &str,
		doc_string: Option<&str>,
	) -> Result<()> {
		self.resolve(text, doc_string)?.run(harness, ctx).await
	}
}
