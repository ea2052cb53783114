//! Optional observability helpers for login flows and scenario steps.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `review_api_bdd.flow` with
//!   the `flow` (grant) and `stage` (call site) fields, and `review_api_bdd.step` with the
//!   `step` text for every executed step.
//! - Enable `metrics` to increment the `review_api_bdd_flow_total` counter for every login
//!   attempt/success/failure, labeled by `flow` + `outcome`, and `review_api_bdd_step_total`
//!   labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Login flows observed by the harness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Browser login followed by an authorization code exchange.
	AuthorizationCode,
	/// Direct confidential-client login.
	ClientCredentials,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::ClientCredentials => "client_credentials",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow or step.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
