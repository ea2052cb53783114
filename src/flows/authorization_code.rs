//! Browser login with the public frontend client.
//!
//! The flow impersonates a browser: it opens the authorization URL with a cookie-keeping
//! session, scrapes the login form, posts the user's credentials, and reads the authorization
//! `code` from the URL the identity provider finally redirects to. The code is then exchanged at
//! the token endpoint. Nothing is exchanged when the login does not produce a code.

// crates.io
use reqwest::{Method, redirect::Policy};
// self
use crate::{
	_prelude::*,
	auth::TokenGrant,
	error::ConfigError,
	flows::Authenticator,
	html,
	http::{ApiResponse, TokenHttpClient},
	oauth::{BasicFacade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const LOGIN_PAGE_PREVIEW_LIMIT: usize = 500;
const MAX_BROWSER_REDIRECTS: usize = 10;

impl<C, M> Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Authorization URL the browser login starts from.
	///
	/// Carries `scope=openid`, `response_type=code`, the registered redirect URI, and the public
	/// client identifier.
	pub fn authorization_url(&self) -> Url {
		let mut url = self.config.dev2.identity.authorization.clone();

		url.query_pairs_mut()
			.append_pair("scope", "openid")
			.append_pair("response_type", "code")
			.append_pair("redirect_uri", self.config.frontend.redirect_uri.as_str())
			.append_pair("client_id", &self.config.frontend.client_id);

		url
	}

	/// Logs `username` in through the dev2 login page and exchanges the resulting code.
	pub async fn authorization_code_login(
		&self,
		username: &str,
		password: &str,
	) -> Result<TokenGrant> {
		const KIND: FlowKind = FlowKind::AuthorizationCode;

		let span = FlowSpan::new(KIND, "authorization_code_login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let code = self.browser_login(username, password).await?;
				let facade: BasicFacade<C, M> = BasicFacade::new(
					&self.config.dev2.identity.token,
					&self.config.frontend.client_id,
					None,
					self.http_client.clone(),
					self.transport_mapper.clone(),
				)?;

				facade.exchange_authorization_code(&code, &self.config.frontend.redirect_uri).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn browser_login(&self, username: &str, password: &str) -> Result<String> {
		let browser = ReqwestClient::builder()
			.cookie_store(true)
			.redirect(Policy::limited(MAX_BROWSER_REDIRECTS))
			.build()
			.map_err(ConfigError::from)?;
		let login_page = ApiResponse::read(
			Method::GET,
			browser.get(self.authorization_url()).send().await?,
		)
		.await?;

		login_page.error_for_status(LOGIN_PAGE_PREVIEW_LIMIT)?;

		let action = html::extract_form_action(&login_page.body)?;
		let action_url = login_page.url.join(&action).map_err(|source| {
			ConfigError::UnresolvableUrl {
				base: login_page.url.to_string(),
				reference: action.clone(),
				source,
			}
		})?;
		let landing = browser
			.post(action_url)
			.form(&[("username", username), ("password", password)])
			.send()
			.await?;

		authorization_code_from(landing.url())
	}
}

/// Reads the `code` query parameter from the URL the login ended on.
pub fn authorization_code_from(redirect_url: &Url) -> Result<String> {
	redirect_url
		.query_pairs()
		.find(|(key, value)| key == "code" && !value.is_empty())
		.map(|(_, value)| value.into_owned())
		.ok_or_else(|| Error::AuthorizationCodeMissing { redirect_url: redirect_url.to_string() })
}
