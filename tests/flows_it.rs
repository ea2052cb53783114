#![cfg(feature = "test")]

mod support;

// crates.io
use httpmock::prelude::*;
// self
use review_api_bdd::{_preludet::*, config::HarnessConfig, error::ConfigError, harness::Harness};
use support::{ADMIN, HR};

#[tokio::test]
async fn browser_login_follows_the_form_and_exchanges_the_code() {
	let server = MockServer::start_async().await;

	support::mount_dev2_login(&server, ADMIN).await;

	let harness = mock_harness(&server.base_url());
	let grant = harness
		.auth
		.authorization_code_login(ADMIN.username, ADMIN.password)
		.await
		.expect("Browser login should produce a token.");

	assert_eq!(grant.token.expose(), ADMIN.token);
	assert!(grant.expires_at.is_some_and(|expires_at| expires_at > grant.obtained_at));
	assert!(!format!("{grant:?}").contains(ADMIN.token));
}

#[tokio::test]
async fn logins_accept_a_token_body_with_only_an_access_token() {
	let server = MockServer::start_async().await;

	support::mount_dev2_login_answering(&server, ADMIN, support::minimal_token_body("abc")).await;
	support::mount_stage_login_answering(&server, HR, support::minimal_token_body("def")).await;

	let harness = mock_harness(&server.base_url());
	let browser = harness
		.auth
		.authorization_code_login(ADMIN.username, ADMIN.password)
		.await
		.expect("Browser login should accept a minimal token body.");
	let confidential = harness
		.auth
		.client_credentials_login(HR.username, HR.password)
		.await
		.expect("Confidential login should accept a minimal token body.");

	assert_eq!(browser.token.expose(), "abc");
	assert_eq!(browser.expires_at, None);
	assert_eq!(confidential.token.expose(), "def");
	assert_eq!(confidential.expires_at, None);
}

#[tokio::test]
async fn browser_login_without_form_fails_before_posting() {
	let server = MockServer::start_async().await;
	let page = server
		.mock_async(|when, then| {
			when.method(GET).path(MOCK_AUTHORIZATION_PATH);
			then.status(200).header("content-type", "text/html").body("<html><p>Maintenance</p></html>");
		})
		.await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(MOCK_TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(support::token_body("x"));
		})
		.await;
	let harness = mock_harness(&server.base_url());
	let err = harness
		.auth
		.authorization_code_login(ADMIN.username, ADMIN.password)
		.await
		.expect_err("A page without a form cannot be logged into.");

	assert!(matches!(err, Error::FormNotFound { reason: "no form element" }));

	page.assert_calls_async(1).await;
	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_credentials_never_reach_the_token_endpoint() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(MOCK_AUTHORIZATION_PATH);
			then.status(200).header("content-type", "text/html").body(support::login_page());
		})
		.await;
	// The identity provider re-renders the login page instead of redirecting.
	server
		.mock_async(|when, then| {
			when.method(POST).path(support::LOGIN_ACTION_PATH);
			then.status(200)
				.header("content-type", "text/html")
				.body("<html><span id=\"input-error\">Invalid username or password.</span></html>");
		})
		.await;

	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(MOCK_TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(support::token_body("x"));
		})
		.await;
	let harness = mock_harness(&server.base_url());
	let err = harness
		.auth
		.authorization_code_login(ADMIN.username, "wrong")
		.await
		.expect_err("No code means no login.");

	match err {
		Error::AuthorizationCodeMissing { redirect_url } =>
			assert!(redirect_url.contains("/login-actions/authenticate")),
		other => panic!("Unexpected error: {other:?}"),
	}

	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn login_page_errors_carry_the_status() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(MOCK_AUTHORIZATION_PATH);
			then.status(503).body("upstream unavailable");
		})
		.await;

	let harness = mock_harness(&server.base_url());
	let err = harness
		.auth
		.authorization_code_login(ADMIN.username, ADMIN.password)
		.await
		.expect_err("A failing login page aborts the flow.");

	assert!(matches!(
		err,
		Error::HttpStatus { status: 503, ref body_preview, .. } if body_preview == "upstream unavailable"
	));
}

#[tokio::test]
async fn confidential_login_posts_client_and_user_credentials() {
	let server = MockServer::start_async().await;

	support::mount_stage_login(&server, HR).await;

	let harness = mock_harness(&server.base_url());
	let grant = harness
		.auth
		.client_credentials_login(HR.username, HR.password)
		.await
		.expect("Confidential login should succeed.");

	assert_eq!(grant.token.expose(), HR.token);
}

#[tokio::test]
async fn confidential_login_classifies_provider_errors() {
	let server = MockServer::start_async().await;
	let mut rejected = server
		.mock_async(|when, then| {
			when.method(POST).path(MOCK_TOKEN_PATH).form_urlencoded_tuple("password", "wrong");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\",\"error_description\":\"Invalid client or Invalid client credentials\"}");
		})
		.await;
	let harness = mock_harness(&server.base_url());
	let err = harness
		.auth
		.client_credentials_login(HR.username, "wrong")
		.await
		.expect_err("401 responses must fail.");

	assert!(matches!(err, Error::InvalidClient { grant: "client_credentials", .. }));
	assert!(err.to_string().contains("Invalid client credentials"));

	rejected.assert_calls_async(1).await;
	rejected.delete_async().await;
	server
		.mock_async(|when, then| {
			when.method(POST).path(MOCK_TOKEN_PATH);
			then.status(500).header("content-type", "text/plain").body("realm is restarting");
		})
		.await;

	let err = harness
		.auth
		.client_credentials_login(HR.username, HR.password)
		.await
		.expect_err("500 responses must fail.");

	match err {
		Error::TokenEndpoint { status, body_preview, .. } => {
			assert_eq!(status, Some(500));
			assert_eq!(body_preview, "realm is restarting");
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn confidential_login_requires_client_credentials() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(MOCK_TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(support::token_body("x"));
		})
		.await;
	let base = server.base_url();
	let config = HarnessConfig::builder()
		.stage_auth_base(format!("{base}{MOCK_REALM_PATH}"))
		.stage_api_base(format!("{base}{MOCK_STAGE_API_PATH}"))
		.build()
		.expect("Configuration without credentials is still valid.");
	let harness = Harness::new(config).expect("Harness should build.");
	let err = harness
		.auth
		.client_credentials_login(HR.username, HR.password)
		.await
		.expect_err("Missing CLIENT_ID must fail.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::MissingClientCredential { name: "CLIENT_ID" })
	));

	token.assert_calls_async(0).await;
}
