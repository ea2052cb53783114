//! Direct login with the confidential client.
//!
//! Keycloak accepts the user's credentials alongside `grant_type=client_credentials` for the
//! stage realm, so a single token endpoint call both authenticates the client (id + secret from
//! the environment) and selects the user the token is issued for.

// self
use crate::{
	_prelude::*,
	auth::TokenGrant,
	flows::Authenticator,
	http::TokenHttpClient,
	oauth::{BasicFacade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Requests a token for `username` from the stage token endpoint.
	///
	/// Fails before any HTTP call when `CLIENT_ID` or `CLIENT_SECRET` is not configured. A
	/// non-2xx answer is surfaced with its status and body preview; nothing is retried.
	pub async fn client_credentials_login(
		&self,
		username: &str,
		password: &str,
	) -> Result<TokenGrant> {
		const KIND: FlowKind = FlowKind::ClientCredentials;

		let span = FlowSpan::new(KIND, "client_credentials_login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let (client_id, client_secret) = self.config.confidential.credentials()?;
				let facade: BasicFacade<C, M> = BasicFacade::new(
					&self.config.stage.identity.token,
					client_id,
					Some(client_secret),
					self.http_client.clone(),
					self.transport_mapper.clone(),
				)?;

				facade
					.exchange_client_credentials(&[("username", username), ("password", password)])
					.await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
