//! Behavior-driven contract checks for the performance-review and recognition APIs: OAuth 2.0
//! logins, resource lifecycles, and response assertions driven by Gherkin steps.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod assert;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod feature;
pub mod flows;
pub mod harness;
pub mod html;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod resource;
pub mod runner;
pub mod steps;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{BearerToken, TokenGrant},
		config::HarnessConfig,
		context::ScenarioContext,
		harness::Harness,
	};

	/// Confidential client identifier configured by [`mock_config`].
	pub const MOCK_CLIENT_ID: &str = "bdd-confidential";
	/// Confidential client secret configured by [`mock_config`].
	pub const MOCK_CLIENT_SECRET: &str = "bdd-secret";
	/// Realm path both identity providers live under in [`mock_config`].
	pub const MOCK_REALM_PATH: &str = "/realms/tenants";
	/// Token endpoint path derived from [`MOCK_REALM_PATH`].
	pub const MOCK_TOKEN_PATH: &str = "/realms/tenants/protocol/openid-connect/token";
	/// Authorization endpoint path derived from [`MOCK_REALM_PATH`].
	pub const MOCK_AUTHORIZATION_PATH: &str = "/realms/tenants/protocol/openid-connect/auth";
	/// Redirect path registered for the frontend client in [`mock_config`].
	pub const MOCK_CALLBACK_PATH: &str = "/callback";
	/// API root of the stage surface in [`mock_config`].
	pub const MOCK_STAGE_API_PATH: &str = "/api";

	/// Points both surfaces at a single mock deployment rooted at `base_url`.
	///
	/// dev2 serves its API at the root, stage under [`MOCK_STAGE_API_PATH`]; both share the
	/// realm at [`MOCK_REALM_PATH`].
	pub fn mock_config(base_url: &str) -> HarnessConfig {
		let base = base_url.trim_end_matches('/');

		HarnessConfig::builder()
			.dev2_auth_base(format!("{base}{MOCK_REALM_PATH}"))
			.dev2_api_base(base)
			.stage_auth_base(format!("{base}{MOCK_REALM_PATH}"))
			.stage_api_base(format!("{base}{MOCK_STAGE_API_PATH}"))
			.redirect_uri(format!("{base}{MOCK_CALLBACK_PATH}"))
			.client_credentials(MOCK_CLIENT_ID, MOCK_CLIENT_SECRET)
			.build()
			.expect("Mock deployment configuration should be valid.")
	}

	/// Builds a [`Harness`] backed by [`mock_config`].
	pub fn mock_harness(base_url: &str) -> Harness {
		Harness::new(mock_config(base_url)).expect("Mock harness should build.")
	}

	/// Returns a context already holding bearer headers for `token`.
	pub fn authenticated_context(token: &str) -> ScenarioContext {
		let mut ctx = ScenarioContext::new();

		ctx.authenticate(TokenGrant::new(BearerToken::new(token), None))
			.expect("Fixture token should form a valid header.");

		ctx
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _, tracing_subscriber as _};
