//! Redacted bearer tokens and the request headers that carry them.

// crates.io
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
// self
use crate::{_prelude::*, error::ConfigError};

/// Opaque access token issued by an identity provider. Formatting never reveals it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerToken(String);
impl BearerToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Builds the `Authorization: Bearer <token>` header set.
	pub fn authorization_headers(&self) -> Result<AuthHeaders, ConfigError> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))
			.map_err(|_| ConfigError::InvalidTokenHeader)?;

		value.set_sensitive(true);

		let mut headers = HeaderMap::new();

		headers.insert(AUTHORIZATION, value);

		Ok(AuthHeaders(headers))
	}
}
impl AsRef<str> for BearerToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BearerToken").field(&"<redacted>").finish()
	}
}
impl Display for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Token issued by a login flow plus the moments it is known to be valid for.
///
/// The expiry is informational only; scenarios are short and tokens are never refreshed.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Issued access token.
	pub token: BearerToken,
	/// When the token endpoint answered.
	pub obtained_at: OffsetDateTime,
	/// `obtained_at + expires_in`, when the provider reported a lifetime.
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenGrant {
	/// Creates a grant obtained now with an optional lifetime.
	pub fn new(token: BearerToken, expires_in: Option<Duration>) -> Self {
		let obtained_at = OffsetDateTime::now_utc();

		Self { token, obtained_at, expires_at: expires_in.map(|ttl| obtained_at + ttl) }
	}
}

/// Request headers that authorize API calls.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct AuthHeaders(HeaderMap);
impl AuthHeaders {
	/// Borrows the header map.
	pub fn as_map(&self) -> &HeaderMap {
		&self.0
	}

	/// Returns the `Authorization` header value when it is valid UTF-8.
	pub fn authorization(&self) -> Option<&str> {
		self.0.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
	}

	/// Whether no header is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for AuthHeaders {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_set().entries(self.0.keys().map(|name| name.as_str())).finish()
	}
}
