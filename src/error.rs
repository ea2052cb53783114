//! Harness-level error types shared across flows, lifecycle calls, assertions, and the runner.

// self
use crate::_prelude::*;

/// Harness-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical harness error. Every variant is terminal for the running scenario and its
/// `Display` output is the diagnostic shown to the operator.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A step ran before the context held what it needs.
	#[error(transparent)]
	Precondition(#[from] PreconditionError),
	/// An expectation about the last response did not hold.
	#[error(transparent)]
	Assertion(#[from] AssertionError),

	/// Login page did not contain a usable form.
	#[error("Cannot find login form action on the identity provider login page: {reason}.")]
	FormNotFound {
		/// What exactly was missing.
		reason: &'static str,
	},
	/// Login did not end on a redirect carrying an authorization `code`.
	#[error("Authorization code not found in redirect url: {redirect_url}.")]
	AuthorizationCodeMissing {
		/// Final URL reached after posting the credentials.
		redirect_url: String,
	},
	/// Provider rejected the grant (bad credentials, stale code).
	#[error("Provider rejected the {grant} grant: {reason}.")]
	InvalidGrant {
		/// Grant label.
		grant: &'static str,
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed for the {grant} grant: {reason}.")]
	InvalidClient {
		/// Grant label.
		grant: &'static str,
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Token endpoint answered with an unexpected failure.
	#[error("Token endpoint failed during the {grant} grant (status: {status:?}): {message}. Response: {body_preview}")]
	TokenEndpoint {
		/// Grant label.
		grant: &'static str,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Summary of the failure.
		message: String,
		/// Leading part of the response body.
		body_preview: String,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON during the {grant} grant (status: {status:?}).")]
	TokenResponseParse {
		/// Grant label.
		grant: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// A call that must succeed answered with a non-2xx status.
	#[error("{method} {url} failed with status {status}. Response: {body_preview}")]
	HttpStatus {
		/// HTTP method of the failing call.
		method: String,
		/// Request URL.
		url: String,
		/// Returned status code.
		status: u16,
		/// Leading part of the response body.
		body_preview: String,
	},
	/// A creation response did not carry the resource identifier.
	#[error("POST ok but no '{field}' in response: {body_preview}")]
	MissingIdentifier {
		/// Field the identifier was expected under.
		field: &'static str,
		/// Leading part of the response body.
		body_preview: String,
	},
	/// A response body was expected to be JSON but was not.
	#[error("Response from {url} is not valid JSON: {source}. Response: {body_preview}")]
	MalformedBody {
		/// Request URL.
		url: String,
		/// Parser failure.
		#[source]
		source: serde_json::Error,
		/// Leading part of the response body.
		body_preview: String,
	},
	/// A step's doc string payload is not valid JSON.
	#[error("Step payload is not valid JSON: {source}.")]
	MalformedPayload {
		/// Parser failure.
		#[source]
		source: serde_json::Error,
	},

	/// No registered step pattern matches the step text.
	#[error("Undefined step: `{text}`.")]
	UndefinedStep {
		/// Step text without its keyword.
		text: String,
	},
	/// More than one registered step pattern matches the step text.
	#[error("Ambiguous step `{text}` matches: {patterns:?}.")]
	AmbiguousStep {
		/// Step text without its keyword.
		text: String,
		/// Patterns that matched.
		patterns: Vec<String>,
	},
	/// A step needed a doc string or capture that was not supplied.
	#[error("Step `{text}` is missing its {what}.")]
	StepArgument {
		/// Step text without its keyword.
		text: String,
		/// Missing piece.
		what: &'static str,
	},
	/// Feature source could not be parsed.
	#[error("Feature parse error: {reason}.")]
	FeatureParse {
		/// One-based line of the rejected construct; the parser's own errors carry it in `reason`.
		line: Option<usize>,
		/// Parser complaint.
		reason: String,
	},
}

/// Configuration and validation failures raised by the harness.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Harness configuration failed validation.
	#[error(transparent)]
	Harness(#[from] crate::config::HarnessConfigError),
	/// A configured endpoint cannot be used by the OAuth client.
	#[error("Endpoint `{endpoint}` is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// A relative URL could not be joined onto its base.
	#[error("Cannot resolve `{reference}` against `{base}`.")]
	UnresolvableUrl {
		/// Base URL.
		base: String,
		/// Reference being resolved.
		reference: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The confidential client is not configured.
	#[error("Environment variable `{name}` must be set for the client credentials login.")]
	MissingClientCredential {
		/// Variable name.
		name: &'static str,
	},
	/// A step pattern is not a valid regular expression.
	#[error("Step pattern `{pattern}` does not compile.")]
	StepPattern {
		/// Pattern as registered.
		pattern: String,
		/// Regex compilation failure.
		#[source]
		source: regex::Error,
	},
	/// The bearer token cannot be carried in an HTTP header.
	#[error("Access token contains characters that are not valid in an HTTP header.")]
	InvalidTokenHeader,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Endpoint label or URL being called.
		target: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		target: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { target: target.into(), source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		let target = e.url().map(|url| url.to_string()).unwrap_or_else(|| "<unknown>".into());

		Self::network(target, e)
	}
}
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		if e.is_builder() { ConfigError::from(e).into() } else { TransportError::from(e).into() }
	}
}

/// Steps that ran before the scenario context held what they need.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PreconditionError {
	/// No authentication step has run yet.
	#[error("Not authenticated. Call the auth step first.")]
	NotAuthenticated,
	/// No resource has been created in this scenario.
	#[error("No {kind} id in context.")]
	NoResourceId {
		/// Resource label.
		kind: &'static str,
	},
	/// Neither remembered admin headers nor current headers exist.
	#[error("No headers present to authorize DELETE.")]
	NoAuthorizationHeaders,
	/// No request has been issued yet.
	#[error("No response in context. Send a request first.")]
	NoResponse,
}

/// Expected-versus-actual mismatches reported by the assertion layer.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AssertionError {
	/// Status code mismatch.
	#[error("Expected {expected}, got {actual}. URL: {url} \nResponse: {body_preview}")]
	Status {
		/// Expected status code.
		expected: u16,
		/// Received status code.
		actual: u16,
		/// Request URL.
		url: String,
		/// Leading part of the response body.
		body_preview: String,
	},
	/// Top-level JSON key missing.
	#[error("Key '{key}' not found in response. Got: {dump}")]
	MissingKey {
		/// Expected key.
		key: String,
		/// Truncated JSON dump of the body.
		dump: String,
	},
	/// No participant carries the expected title.
	#[error("Expected title not found.\nExpected: {expected}\nGot titles: {titles:?}")]
	ParticipantTitleMissing {
		/// Expected title.
		expected: String,
		/// Titles that were present (`None` for participants without one).
		titles: Vec<Option<String>>,
	},
	/// Some participant titles are visible.
	#[error("Titles are visible, expected anonymity. Visible titles: {visible:?}")]
	ParticipantTitlesVisible {
		/// Non-blank titles that were returned.
		visible: Vec<String>,
	},
}
