//! Deployment settings for the two API surfaces exercised by the scenarios.
//!
//! Defaults point at the dev2 and stage deployments. Every URL can be overridden through the
//! environment (or a `.env` file), and tests point the harness at local mock servers through
//! [`HarnessConfigBuilder`].

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

/// Identity provider realm used by the dev2 deployment.
pub const DEV2_AUTH_BASE: &str = "https://auth.dev2.bonrepublic.com/realms/tenants";
/// Resource API root of the dev2 deployment.
pub const DEV2_API_BASE: &str = "https://api.dev2.bonrepublic.com";
/// Public client registered for the browser login.
pub const FRONTEND_CLIENT_ID: &str = "frontend";
/// Redirect URI registered for [`FRONTEND_CLIENT_ID`].
pub const FRONTEND_REDIRECT_URI: &str = "https://maxim-lvov.dev2.bonrepublic.com/";
/// Identity provider realm used by the stage deployment.
pub const STAGE_AUTH_BASE: &str = "https://auth.stage.bonrepublic.com/realms/tenants";
/// Resource API root of the stage deployment.
pub const STAGE_API_BASE: &str = "https://api.stage.bonrepublic.com/api";

const AUTHORIZATION_PATH: &str = "protocol/openid-connect/auth";
const TOKEN_PATH: &str = "protocol/openid-connect/token";

/// Deployment a step talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiSurface {
	/// dev2: browser login with the public frontend client, review-session API.
	Dev2,
	/// stage: confidential client login, recognition API.
	Stage,
}
impl ApiSurface {
	/// Returns a stable label suitable for span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ApiSurface::Dev2 => "dev2",
			ApiSurface::Stage => "stage",
		}
	}
}
impl Display for ApiSurface {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// OpenID Connect endpoints of one identity provider realm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityProvider {
	/// Authorization endpoint used by the browser login.
	pub authorization: Url,
	/// Token endpoint used for code exchanges and direct grants.
	pub token: Url,
}
impl IdentityProvider {
	/// Derives the standard OpenID Connect endpoints from a realm URL.
	pub fn from_realm(realm: &Url) -> Result<Self, HarnessConfigError> {
		let base = with_trailing_slash(realm);
		let join = |path: &str| {
			base.join(path).map_err(|source| HarnessConfigError::InvalidUrl {
				field: "realm",
				value: realm.to_string(),
				source,
			})
		};

		Ok(Self { authorization: join(AUTHORIZATION_PATH)?, token: join(TOKEN_PATH)? })
	}
}

/// Public client used by the browser login on dev2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrontendClient {
	/// Public client identifier.
	pub client_id: String,
	/// Redirect URI registered for the client.
	pub redirect_uri: Url,
}

/// Confidential client used by the direct login on stage.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ConfidentialClient {
	/// Client identifier (`CLIENT_ID`).
	pub client_id: Option<String>,
	/// Client secret (`CLIENT_SECRET`).
	pub client_secret: Option<String>,
}
impl ConfidentialClient {
	/// Returns the identifier and secret, failing when either is unset.
	pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
		let id = self
			.client_id
			.as_deref()
			.ok_or(ConfigError::MissingClientCredential { name: "CLIENT_ID" })?;
		let secret = self
			.client_secret
			.as_deref()
			.ok_or(ConfigError::MissingClientCredential { name: "CLIENT_SECRET" })?;

		Ok((id, secret))
	}
}
impl Debug for ConfidentialClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConfidentialClient")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.finish()
	}
}

/// Identity provider and API root for one deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceConfig {
	/// Identity provider realm endpoints.
	pub identity: IdentityProvider,
	/// Root every API path is appended to.
	pub api_base: Url,
}
impl SurfaceConfig {
	/// Appends `path` (which may carry a query) to the API root.
	///
	/// Paths are appended verbatim rather than resolved, so a root such as `.../api` keeps its
	/// last segment.
	pub fn api_url(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.api_base.as_str().trim_end_matches('/');
		let path = path.trim_start_matches('/');
		let raw = format!("{base}/{path}");

		Url::parse(&raw).map_err(|source| ConfigError::UnresolvableUrl {
			base: self.api_base.to_string(),
			reference: path.to_owned(),
			source,
		})
	}
}

/// Validated settings for every surface the harness talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
	/// dev2 deployment.
	pub dev2: SurfaceConfig,
	/// stage deployment.
	pub stage: SurfaceConfig,
	/// Public client for the dev2 browser login.
	pub frontend: FrontendClient,
	/// Confidential client for the stage direct login.
	pub confidential: ConfidentialClient,
}
impl HarnessConfig {
	/// Creates a builder seeded with the compiled-in defaults.
	pub fn builder() -> HarnessConfigBuilder {
		HarnessConfigBuilder::default()
	}

	/// Loads `.env` (when present) and applies environment overrides on top of the defaults.
	///
	/// Recognized variables: `CLIENT_ID`, `CLIENT_SECRET`, `DEV2_AUTH_BASE`, `DEV2_API_BASE`,
	/// `DEV2_REDIRECT_URI`, `DEV2_FRONTEND_CLIENT_ID`, `STAGE_AUTH_BASE`, `STAGE_API_BASE`.
	pub fn from_env() -> Result<Self, HarnessConfigError> {
		allow_missing_dotenv(dotenvy::dotenv())?;

		HarnessConfigBuilder::default().with_env_overrides().build()
	}

	/// Returns the settings for `surface`.
	pub fn surface(&self, surface: ApiSurface) -> &SurfaceConfig {
		match surface {
			ApiSurface::Dev2 => &self.dev2,
			ApiSurface::Stage => &self.stage,
		}
	}
}

/// Errors raised while validating [`HarnessConfig`] values.
#[derive(Debug, ThisError)]
pub enum HarnessConfigError {
	/// A configured value is not a URL.
	#[error("`{field}` is not a valid URL: {value}.")]
	InvalidUrl {
		/// Setting name.
		field: &'static str,
		/// Rejected value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL uses a scheme other than HTTP(S) or has no host.
	#[error("`{field}` must be an absolute http(s) URL: {value}.")]
	NotHttp {
		/// Setting name.
		field: &'static str,
		/// Rejected value.
		value: String,
	},
	/// The public client identifier is blank.
	#[error("The frontend client identifier must not be empty.")]
	EmptyClientId,
	/// A `.env` file exists but could not be loaded.
	#[error("The `.env` file could not be loaded.")]
	DotEnv {
		/// Underlying loader failure.
		#[source]
		source: dotenvy::Error,
	},
}

/// Builder for [`HarnessConfig`] values.
///
/// Values are kept as raw strings until [`build`](HarnessConfigBuilder::build) so that
/// environment overrides and test fixtures share one validation path.
#[derive(Clone, Debug)]
pub struct HarnessConfigBuilder {
	/// dev2 identity provider realm.
	pub dev2_auth_base: String,
	/// dev2 API root.
	pub dev2_api_base: String,
	/// stage identity provider realm.
	pub stage_auth_base: String,
	/// stage API root.
	pub stage_api_base: String,
	/// Public client identifier.
	pub frontend_client_id: String,
	/// Redirect URI registered for the public client.
	pub redirect_uri: String,
	/// Confidential client credentials.
	pub confidential: ConfidentialClient,
}
impl Default for HarnessConfigBuilder {
	fn default() -> Self {
		Self {
			dev2_auth_base: DEV2_AUTH_BASE.into(),
			dev2_api_base: DEV2_API_BASE.into(),
			stage_auth_base: STAGE_AUTH_BASE.into(),
			stage_api_base: STAGE_API_BASE.into(),
			frontend_client_id: FRONTEND_CLIENT_ID.into(),
			redirect_uri: FRONTEND_REDIRECT_URI.into(),
			confidential: ConfidentialClient::default(),
		}
	}
}
impl HarnessConfigBuilder {
	/// Sets the dev2 identity provider realm.
	pub fn dev2_auth_base(mut self, value: impl Into<String>) -> Self {
		self.dev2_auth_base = value.into();

		self
	}

	/// Sets the dev2 API root.
	pub fn dev2_api_base(mut self, value: impl Into<String>) -> Self {
		self.dev2_api_base = value.into();

		self
	}

	/// Sets the stage identity provider realm.
	pub fn stage_auth_base(mut self, value: impl Into<String>) -> Self {
		self.stage_auth_base = value.into();

		self
	}

	/// Sets the stage API root.
	pub fn stage_api_base(mut self, value: impl Into<String>) -> Self {
		self.stage_api_base = value.into();

		self
	}

	/// Sets the public client identifier.
	pub fn frontend_client_id(mut self, value: impl Into<String>) -> Self {
		self.frontend_client_id = value.into();

		self
	}

	/// Sets the redirect URI of the public client.
	pub fn redirect_uri(mut self, value: impl Into<String>) -> Self {
		self.redirect_uri = value.into();

		self
	}

	/// Sets the confidential client credentials.
	pub fn client_credentials(
		mut self,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		self.confidential = ConfidentialClient {
			client_id: Some(client_id.into()),
			client_secret: Some(client_secret.into()),
		};

		self
	}

	/// Replaces values with any of the recognized environment variables that are set.
	pub fn with_env_overrides(mut self) -> Self {
		let read = |name: &str| env::var(name).ok().filter(|value| !value.trim().is_empty());

		if let Some(value) = read("DEV2_AUTH_BASE") {
			self.dev2_auth_base = value;
		}
		if let Some(value) = read("DEV2_API_BASE") {
			self.dev2_api_base = value;
		}
		if let Some(value) = read("DEV2_REDIRECT_URI") {
			self.redirect_uri = value;
		}
		if let Some(value) = read("DEV2_FRONTEND_CLIENT_ID") {
			self.frontend_client_id = value;
		}
		if let Some(value) = read("STAGE_AUTH_BASE") {
			self.stage_auth_base = value;
		}
		if let Some(value) = read("STAGE_API_BASE") {
			self.stage_api_base = value;
		}
		if let Some(value) = read("CLIENT_ID") {
			self.confidential.client_id = Some(value);
		}
		if let Some(value) = read("CLIENT_SECRET") {
			self.confidential.client_secret = Some(value);
		}

		self
	}

	/// Validates the collected values.
	pub fn build(self) -> Result<HarnessConfig, HarnessConfigError> {
		if self.frontend_client_id.trim().is_empty() {
			return Err(HarnessConfigError::EmptyClientId);
		}

		let dev2 = SurfaceConfig {
			identity: IdentityProvider::from_realm(&http_url("dev2_auth_base", &self.dev2_auth_base)?)?,
			api_base: http_url("dev2_api_base", &self.dev2_api_base)?,
		};
		let stage = SurfaceConfig {
			identity: IdentityProvider::from_realm(&http_url(
				"stage_auth_base",
				&self.stage_auth_base,
			)?)?,
			api_base: http_url("stage_api_base", &self.stage_api_base)?,
		};
		let frontend = FrontendClient {
			client_id: self.frontend_client_id,
			redirect_uri: http_url("redirect_uri", &self.redirect_uri)?,
		};

		Ok(HarnessConfig { dev2, stage, frontend, confidential: self.confidential })
	}
}

// A missing `.env` is normal in CI, where variables come from the runner.
fn allow_missing_dotenv<T>(loaded: Result<T, dotenvy::Error>) -> Result<(), HarnessConfigError> {
	match loaded {
		Ok(_) => Ok(()),
		Err(err) if err.not_found() => Ok(()),
		Err(source) => Err(HarnessConfigError::DotEnv { source }),
	}
}

fn http_url(field: &'static str, value: &str) -> Result<Url, HarnessConfigError> {
	let url = Url::parse(value).map_err(|source| HarnessConfigError::InvalidUrl {
		field,
		value: value.to_owned(),
		source,
	})?;

	if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
		return Err(HarnessConfigError::NotHttp { field, value: value.to_owned() });
	}

	Ok(url)
}

fn with_trailing_slash(url: &Url) -> Url {
	if url.path().ends_with('/') {
		return url.clone();
	}

	let mut url = url.clone();
	let path = format!("{}/", url.path());

	url.set_path(&path);

	url
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_a_missing_dotenv_is_ignored() {
		let dir = env::temp_dir().join(format!("review-api-bdd-dotenv-{}", std::process::id()));
		let malformed = dir.join(".env");

		std::fs::create_dir_all(&dir).expect("Temp dir should be writable.");
		std::fs::write(&malformed, "this line is not an assignment\n")
			.expect("Temp file should be writable.");

		assert!(allow_missing_dotenv(dotenvy::from_path(dir.join("absent.env"))).is_ok());
		assert!(matches!(
			allow_missing_dotenv(dotenvy::from_path(&malformed)),
			Err(HarnessConfigError::DotEnv { .. })
		));

		let _ = std::fs::remove_dir_all(&dir);
	}

	#[test]
	fn defaults_derive_openid_connect_endpoints() {
		let config = HarnessConfig::builder().build().expect("Default configuration should be valid.");

		assert_eq!(
			config.dev2.identity.authorization.as_str(),
			"https://auth.dev2.bonrepublic.com/realms/tenants/protocol/openid-connect/auth",
		);
		assert_eq!(
			config.stage.identity.token.as_str(),
			"https://auth.stage.bonrepublic.com/realms/tenants/protocol/openid-connect/token",
		);
		assert_eq!(config.frontend.client_id, FRONTEND_CLIENT_ID);
		assert!(config.confidential.client_id.is_none());
	}

	#[test]
	fn api_url_keeps_base_path_and_query() {
		let config = HarnessConfig::builder().build().expect("Default configuration should be valid.");
		let url = config
			.stage
			.api_url("/recognition/template/?page=1&page_size=10")
			.expect("Template path should join onto the stage API root.");

		assert_eq!(
			url.as_str(),
			"https://api.stage.bonrepublic.com/api/recognition/template/?page=1&page_size=10",
		);
	}

	#[test]
	fn builder_rejects_non_http_urls() {
		let err = HarnessConfig::builder()
			.dev2_api_base("ftp://files.example.com")
			.build()
			.expect_err("Non-HTTP API roots should be rejected.");

		assert!(matches!(err, HarnessConfigError::NotHttp { field: "dev2_api_base", .. }));

		let err = HarnessConfig::builder()
			.redirect_uri("not a url")
			.build()
			.expect_err("Unparseable redirect URIs should be rejected.");

		assert!(matches!(err, HarnessConfigError::InvalidUrl { field: "redirect_uri", .. }));
	}

	#[test]
	fn confidential_credentials_require_both_values() {
		let missing = ConfidentialClient::default();

		assert!(matches!(
			missing.credentials(),
			Err(ConfigError::MissingClientCredential { name: "CLIENT_ID" })
		));

		let partial = ConfidentialClient { client_id: Some("bdd".into()), client_secret: None };

		assert!(matches!(
			partial.credentials(),
			Err(ConfigError::MissingClientCredential { name: "CLIENT_SECRET" })
		));

		let full = ConfidentialClient {
			client_id: Some("bdd".into()),
			client_secret: Some("hunter2".into()),
		};

		assert_eq!(full.credentials().expect("Both values are set."), ("bdd", "hunter2"));
		assert!(!format!("{full:?}").contains("hunter2"));
	}
}
