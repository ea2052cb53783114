//! Per-scenario state shared between steps.

// self
use crate::{
	_prelude::*,
	auth::{AuthHeaders, BearerToken, TokenGrant},
	error::PreconditionError,
	http::ApiResponse,
	resource::ResourceId,
};

/// State linking the steps of one scenario run.
///
/// A fresh context is built for every scenario and handed to each step by mutable reference;
/// nothing outlives the scenario.
#[derive(Debug, Default)]
pub struct ScenarioContext {
	/// Token issued by the last login step.
	pub token: Option<BearerToken>,
	/// Headers that authorize requests as the current user.
	pub headers: Option<AuthHeaders>,
	/// Headers remembered for privileged calls (delete).
	pub admin_headers: Option<AuthHeaders>,
	/// Response of the last request.
	pub response: Option<ApiResponse>,
	/// Identifier of the last created resource.
	pub resource_id: Option<ResourceId>,
}
impl ScenarioContext {
	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records a login: stores the token and the matching bearer headers.
	pub fn authenticate(&mut self, grant: TokenGrant) -> Result<()> {
		let headers = grant.token.authorization_headers()?;

		self.token = Some(grant.token);
		self.headers = Some(headers);

		Ok(())
	}

	/// Current user's headers, or a precondition failure when no login ran.
	pub fn require_headers(&self) -> Result<&AuthHeaders, PreconditionError> {
		self.headers.as_ref().ok_or(PreconditionError::NotAuthenticated)
	}

	/// Snapshots the current headers into the admin slot.
	pub fn remember_admin(&mut self) -> Result<(), PreconditionError> {
		let headers = self.require_headers()?.clone();

		self.admin_headers = Some(headers);

		Ok(())
	}

	/// Headers for privileged calls: remembered admin headers win over the current ones.
	pub fn privileged_headers(&self) -> Result<&AuthHeaders, PreconditionError> {
		self.admin_headers
			.as_ref()
			.or(self.headers.as_ref())
			.filter(|headers| !headers.is_empty())
			.ok_or(PreconditionError::NoAuthorizationHeaders)
	}

	/// Identifier of the last created resource.
	pub fn require_resource_id(&self, kind: &'static str) -> Result<&ResourceId, PreconditionError> {
		self.resource_id.as_ref().ok_or(PreconditionError::NoResourceId { kind })
	}

	/// Last response, or a precondition failure when no request ran.
	pub fn require_response(&self) -> Result<&ApiResponse, PreconditionError> {
		self.response.as_ref().ok_or(PreconditionError::NoResponse)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn grant(token: &str) -> TokenGrant {
		TokenGrant::new(BearerToken::new(token), None)
	}

	#[test]
	fn authenticate_stores_token_and_bearer_header() {
		let mut ctx = ScenarioContext::new();

		assert_eq!(ctx.require_headers(), Err(PreconditionError::NotAuthenticated));

		ctx.authenticate(grant("tok-1")).expect("Token should be accepted.");

		assert_eq!(ctx.token.as_ref().map(BearerToken::expose), Some("tok-1"));
		assert_eq!(
			ctx.require_headers().expect("Headers should be stored.").authorization(),
			Some("Bearer tok-1")
		);
	}

	#[test]
	fn remember_admin_requires_login() {
		let mut ctx = ScenarioContext::new();

		assert_eq!(ctx.remember_admin(), Err(PreconditionError::NotAuthenticated));
		assert!(ctx.admin_headers.is_none());
	}

	#[test]
	fn privileged_headers_prefer_remembered_admin() {
		let mut ctx = ScenarioContext::new();

		assert_eq!(ctx.privileged_headers(), Err(PreconditionError::NoAuthorizationHeaders));

		ctx.authenticate(grant("admin")).expect("Token should be accepted.");
		ctx.remember_admin().expect("Admin headers should be remembered.");
		ctx.authenticate(grant("employee")).expect("Token should be accepted.");

		assert_eq!(
			ctx.privileged_headers().expect("Headers should exist.").authorization(),
			Some("Bearer admin")
		);
		assert_eq!(
			ctx.require_headers().expect("Headers should exist.").authorization(),
			Some("Bearer employee")
		);

		ctx.admin_headers = None;

		assert_eq!(
			ctx.privileged_headers().expect("Current headers are the fallback.").authorization(),
			Some("Bearer employee")
		);
	}
}
