//! Token endpoint facade over the `oauth2` crate.

pub use oauth2;

// std
use std::{borrow::Cow, time::Duration as StdDuration};
// crates.io
use oauth2::{
	AccessToken, AuthType, AuthorizationCode, Client, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, Scope,
	StandardRevocableToken, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::{BearerToken, TokenGrant},
	error::{ConfigError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
};

type FacadeClient<HasTokenUrl = EndpointNotSet> = Client<
	BasicErrorResponse,
	FacadeTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	HasTokenUrl,
>;
type ConfiguredClient = FacadeClient<EndpointSet>;

/// Successful token endpoint body. Only `access_token` is required; `token_type` defaults to
/// `bearer` and `expires_in` is optional.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct FacadeTokenResponse {
	access_token: AccessToken,
	#[serde(default = "bearer")]
	token_type: BasicTokenType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	expires_in: Option<u64>,
}
impl TokenResponse for FacadeTokenResponse {
	type TokenType = BasicTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &BasicTokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<StdDuration> {
		self.expires_in.map(StdDuration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		None
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		None
	}
}

fn bearer() -> BasicTokenType {
	BasicTokenType::Bearer
}

/// Grant types the harness requests from the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantType {
	/// Code obtained through the browser login.
	AuthorizationCode,
	/// Confidential client credentials (plus the user's password).
	ClientCredentials,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::ClientCredentials => "client_credentials",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Maps HTTP transport failures into harness [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a harness error.
	fn map_transport_error(
		&self,
		grant: GrantType,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		grant: GrantType,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => Error::from(*inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => token_endpoint_error(
				grant,
				meta,
				format!("HTTP client error occurred while calling the token endpoint: {message}"),
			),
			_ => token_endpoint_error(
				grant,
				meta,
				"HTTP client error occurred while calling the token endpoint".into(),
			),
		}
	}
}

/// `oauth2` client bound to one token endpoint plus the transport used to reach it.
pub(crate) struct BasicFacade<C = ReqwestHttpClient, M = ReqwestTransportErrorMapper>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds a facade that authenticates in the request body, as both Keycloak clients expect.
	pub(crate) fn new(
		token_endpoint: &Url,
		client_id: &str,
		client_secret: Option<&str>,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self> {
		let token_url = TokenUrl::new(token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;
		let mut oauth_client = FacadeClient::new(ClientId::new(client_id.to_owned()))
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		if let Some(secret) = client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.to_owned()));
		}

		Ok(Self { oauth_client, http_client, error_mapper })
	}

	/// Performs the `client_credentials` grant with additional form parameters.
	pub(crate) async fn exchange_client_credentials(
		&self,
		extra_params: &[(&str, &str)],
	) -> Result<TokenGrant> {
		const GRANT: GrantType = GrantType::ClientCredentials;

		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let mut request = self.oauth_client.exchange_client_credentials();

		for (key, value) in extra_params {
			request = request.add_extra_param((*key).to_owned(), (*value).to_owned());
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GRANT, meta.take(), err, self.error_mapper.as_ref()))?;

		map_token_response(GRANT, meta.take(), response)
	}

	/// Exchanges an authorization code obtained for `redirect_uri`.
	pub(crate) async fn exchange_authorization_code(
		&self,
		code: &str,
		redirect_uri: &Url,
	) -> Result<TokenGrant> {
		const GRANT: GrantType = GrantType::AuthorizationCode;

		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let redirect_url = RedirectUrl::new(redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "redirect_uri", source })?;
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.set_redirect_uri(Cow::Owned(redirect_url))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GRANT, meta.take(), err, self.error_mapper.as_ref()))?;

		map_token_response(GRANT, meta.take(), response)
	}
}

fn map_token_response(
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	response: FacadeTokenResponse,
) -> Result<TokenGrant> {
	let access_token = response.access_token().secret();

	if access_token.trim().is_empty() {
		return Err(token_endpoint_error(
			grant,
			meta.as_ref(),
			"Token endpoint returned an empty access_token".into(),
		));
	}

	// The lifetime is informational; an absurd value is dropped rather than rejected.
	let expires_in = response
		.expires_in()
		.and_then(|ttl| i64::try_from(ttl.as_secs()).ok())
		.filter(|secs| *secs > 0)
		.map(Duration::seconds);

	Ok(TokenGrant::new(BearerToken::new(access_token.to_owned()), expires_in))
}

fn map_request_error<E, M>(
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(grant, response, meta_ref),
		RequestTokenError::Request(error) => mapper.map_transport_error(grant, meta_ref, error),
		RequestTokenError::Parse(error, _body) => match meta_status(meta_ref) {
			Some(status) if !(200..300).contains(&status) => token_endpoint_error(
				grant,
				meta_ref,
				format!("Token endpoint answered with HTTP {status}"),
			),
			status => Error::TokenResponseParse { grant: grant.as_str(), source: error, status },
		},
		RequestTokenError::Other(message) => token_endpoint_error(
			grant,
			meta_ref,
			format!("Token endpoint returned an unexpected response: {message}"),
		),
	}
}

fn map_server_response_error(
	grant: GrantType,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let code = response.error().as_ref().to_string();
	let reason = match response.error_description() {
		Some(description) => format!("{code}: {description}"),
		None => code.clone(),
	};

	match (code.as_str(), meta_status(meta)) {
		("invalid_grant", _) => Error::InvalidGrant { grant: grant.as_str(), reason },
		("invalid_client" | "unauthorized_client", _) | (_, Some(401)) =>
			Error::InvalidClient { grant: grant.as_str(), reason },
		_ => token_endpoint_error(grant, meta, format!("Token endpoint returned an OAuth error: {reason}")),
	}
}

fn token_endpoint_error(grant: GrantType, meta: Option<&ResponseMetadata>, message: String) -> Error {
	Error::TokenEndpoint {
		grant: grant.as_str(),
		status: meta_status(meta),
		message,
		body_preview: meta.and_then(|value| value.body_preview.clone()).unwrap_or_default(),
	}
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn token_url() -> Url {
		Url::parse("https://idp.example.com/realms/tenants/protocol/openid-connect/token")
			.expect("Failed to parse token endpoint URL.")
	}

	#[test]
	fn builds_public_and_confidential_clients() {
		let http = Arc::new(ReqwestHttpClient::new().expect("Token client should build."));
		let mapper = Arc::new(ReqwestTransportErrorMapper);

		assert!(
			<BasicFacade>::new(&token_url(), "frontend", None, http.clone(), mapper.clone())
				.is_ok()
		);
		assert!(<BasicFacade>::new(&token_url(), "bdd", Some("secret"), http, mapper).is_ok());
	}

	#[test]
	fn token_bodies_need_only_an_access_token() {
		let response: FacadeTokenResponse = serde_json::from_str("{\"access_token\":\"abc\"}")
			.expect("Minimal token body should deserialize.");

		assert_eq!(response.token_type(), &BasicTokenType::Bearer);

		let grant = map_token_response(GrantType::ClientCredentials, None, response)
			.expect("Minimal token body should be accepted.");

		assert_eq!(grant.token.expose(), "abc");
		assert_eq!(grant.expires_at, None);

		let response: FacadeTokenResponse = serde_json::from_str(
			"{\"access_token\":\"abc\",\"token_type\":\"Bearer\",\"expires_in\":300}",
		)
		.expect("Full token body should deserialize.");
		let grant = map_token_response(GrantType::AuthorizationCode, None, response)
			.expect("Full token body should be accepted.");

		assert_eq!(grant.expires_at.map(|at| at - grant.obtained_at), Some(Duration::seconds(300)));
	}

	#[test]
	fn oauth_error_codes_are_classified() {
		let meta = ResponseMetadata { status: Some(400), body_preview: Some("{}".into()) };
		let response: BasicErrorResponse =
			serde_json::from_str("{\"error\":\"invalid_grant\",\"error_description\":\"Invalid user credentials\"}")
				.expect("Error fixture should deserialize.");
		let err = map_server_response_error(GrantType::ClientCredentials, response, Some(&meta));

		assert!(matches!(err, Error::InvalidGrant { grant: "client_credentials", .. }));
		assert!(err.to_string().contains("Invalid user credentials"));

		let response: BasicErrorResponse = serde_json::from_str("{\"error\":\"invalid_request\"}")
			.expect("Error fixture should deserialize.");
		let meta = ResponseMetadata { status: Some(401), body_preview: None };
		let err = map_server_response_error(GrantType::AuthorizationCode, response, Some(&meta));

		assert!(matches!(err, Error::InvalidClient { grant: "authorization_code", .. }));
	}
}
