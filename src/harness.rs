//! Long-lived collaborators shared by every step of a run.

// self
use crate::{
	_prelude::*,
	config::HarnessConfig,
	error::ConfigError,
	flows::ReqwestAuthenticator,
	resource::ApiClient,
};

/// Login flows and API client bound to one deployment configuration.
///
/// The harness holds no scenario state; that lives in [`ScenarioContext`](crate::context::ScenarioContext).
#[derive(Clone, Debug)]
pub struct Harness {
	/// Deployment settings.
	pub config: Arc<HarnessConfig>,
	/// Login flows.
	pub auth: ReqwestAuthenticator,
	/// Resource API client.
	pub api: ApiClient,
}
impl Harness {
	/// Builds the default reqwest-backed collaborators for `config`.
	pub fn new(config: HarnessConfig) -> Result<Self> {
		let config = Arc::new(config);

		Ok(Self {
			auth: ReqwestAuthenticator::new(config.clone())?,
			api: ApiClient::new(config.clone())?,
			config,
		})
	}

	/// Builds a harness from `.env` and the process environment.
	pub fn from_env() -> Result<Self> {
		let config = HarnessConfig::from_env().map_err(ConfigError::from)?;

		Self::new(config)
	}
}
