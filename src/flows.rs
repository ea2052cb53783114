//! Login flows that turn user credentials into bearer tokens.
//!
//! [`Authenticator`] owns the token transport and the deployment settings so each flow only
//! deals with its own exchange: the browser login with the public frontend client
//! ([`Authenticator::authorization_code_login`]) and the direct confidential-client login
//! ([`Authenticator::client_credentials_login`]). Tokens are returned to the caller and never
//! cached.

mod authorization_code;
mod client_credentials;

pub use authorization_code::*;

// self
use crate::{
	_prelude::*,
	config::HarnessConfig,
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{ReqwestTransportErrorMapper, TransportErrorMapper},
};

/// Authenticator specialized for the crate's default reqwest transport stack.
pub type ReqwestAuthenticator = Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Runs the login flows against the configured identity providers.
#[derive(Clone)]
pub struct Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every token endpoint request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Deployment settings (endpoints and clients).
	pub config: Arc<HarnessConfig>,
}
impl<C, M> Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an authenticator that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: impl Into<Arc<HarnessConfig>>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			config: config.into(),
		}
	}
}
impl Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an authenticator with its own reqwest token transport.
	pub fn new(config: impl Into<Arc<HarnessConfig>>) -> Result<Self> {
		Ok(Self::with_http_client(
			config,
			ReqwestHttpClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}
}
impl<C, M> Debug for Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator").field("config", &self.config).finish()
	}
}
