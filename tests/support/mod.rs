//! In-process stand-in for the dev2 and stage deployments.
//!
//! Shared by the integration tests and the `mock_deployment` demo. Both identity providers live
//! under the realm of [`mock_config`](review_api_bdd::_preludet::mock_config); the dev2 API is
//! served at the root and the stage API under `/api`.

#![allow(dead_code)]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use review_api_bdd::_preludet::*;

/// Login accepted by the dev2 login page and allowed to see participant titles.
pub const ADMIN: Account = Account {
	username: "admin@bonrepublic.com",
	password: "admin-password",
	code: "admin-code",
	token: "admin-token",
};
/// Login accepted by the dev2 login page that must not see participant titles.
pub const EMPLOYEE: Account = Account {
	username: "employee@bonrepublic.com",
	password: "employee-password",
	code: "employee-code",
	token: "employee-token",
};
/// User the stage confidential client logs in.
pub const HR: Account =
	Account { username: "hr@bonrepublic.com", password: "hr-password", code: "", token: "stage-token" };

/// Path the login form posts to, relative to the server root.
pub const LOGIN_ACTION_PATH: &str = "/realms/tenants/login-actions/authenticate";
/// Review session identifier issued by the mock API.
pub const REVIEW_SESSION_ID: &str = "6f1c2b1e-8d11-4c43-a6b2-0d2f7f7a9e10";
/// Recognition template identifier issued by the mock API.
pub const RECOGNITION_TEMPLATE_ID: u64 = 42;
/// Session cookie set by the login page and expected back on the form post.
pub const SESSION_COOKIE: &str = "AUTH_SESSION_ID=bdd-session";

/// Credentials and the artifacts the mock identity provider issues for them.
#[derive(Clone, Copy, Debug)]
pub struct Account {
	/// Login name.
	pub username: &'static str,
	/// Password.
	pub password: &'static str,
	/// Authorization code the login page redirects with.
	pub code: &'static str,
	/// Access token issued for the account.
	pub token: &'static str,
}
impl Account {
	/// `Authorization` header value carrying the account's token.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.token)
	}
}

/// Login page served at the authorization endpoint.
pub fn login_page() -> String {
	format!(
		"<!DOCTYPE html><html><body><div id=\"kc-form\">\
		<form id=\"kc-form-login\" method=\"post\" \
		action=\"{LOGIN_ACTION_PATH}?session_code=s1&amp;execution=e1&amp;client_id=frontend\">\
		<input name=\"username\"/><input name=\"password\" type=\"password\"/>\
		</form></div></body></html>"
	)
}

/// Token endpoint success body for `token`.
pub fn token_body(token: &str) -> String {
	json!({
		"access_token": token,
		"token_type": "Bearer",
		"expires_in": 300,
		"scope": "openid profile email",
	})
	.to_string()
}

/// Smallest success body a token endpoint may answer with.
pub fn minimal_token_body(token: &str) -> String {
	json!({ "access_token": token }).to_string()
}

/// Mounts every mock of the deployment.
pub async fn mount(server: &MockServer) {
	mount_dev2_login(server, ADMIN).await;
	mount_dev2_login(server, EMPLOYEE).await;
	mount_stage_login(server, HR).await;
	mount_review_sessions(server).await;
	mount_recognition_templates(server).await;
}

/// Login page, credential post, callback, and code exchange for `account` on dev2.
pub async fn mount_dev2_login(server: &MockServer, account: Account) {
	mount_dev2_login_answering(server, account, token_body(account.token)).await;
}

/// Same as [`mount_dev2_login`] with a custom token endpoint success body.
pub async fn mount_dev2_login_answering(server: &MockServer, account: Account, token: String) {
	server
		.mock_async(|when, then| {
			when.method(GET).path(MOCK_AUTHORIZATION_PATH).query_param("client_id", "frontend");
			then.status(200)
				.header("content-type", "text/html; charset=utf-8")
				.header("set-cookie", format!("{SESSION_COOKIE}; Path=/"))
				.body(login_page());
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(LOGIN_ACTION_PATH)
				.query_param("execution", "e1")
				.header("cookie", SESSION_COOKIE)
				.form_urlencoded_tuple("username", account.username)
				.form_urlencoded_tuple("password", account.password);
			then.status(302).header(
				"location",
				server.url(format!("{MOCK_CALLBACK_PATH}?session_state=st&code={}", account.code)),
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(MOCK_CALLBACK_PATH);
			then.status(200).header("content-type", "text/html").body("<html>app</html>");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(MOCK_TOKEN_PATH)
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", account.code)
				.form_urlencoded_tuple("client_id", "frontend");
			then.status(200).header("content-type", "application/json").body(token);
		})
		.await;
}

/// Confidential-client login for `account` on stage.
pub async fn mount_stage_login(server: &MockServer, account: Account) {
	mount_stage_login_answering(server, account, token_body(account.token)).await;
}

/// Same as [`mount_stage_login`] with a custom token endpoint success body.
pub async fn mount_stage_login_answering(server: &MockServer, account: Account, token: String) {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(MOCK_TOKEN_PATH)
				.form_urlencoded_tuple("grant_type", "client_credentials")
				.form_urlencoded_tuple("client_id", MOCK_CLIENT_ID)
				.form_urlencoded_tuple("client_secret", MOCK_CLIENT_SECRET)
				.form_urlencoded_tuple("username", account.username)
				.form_urlencoded_tuple("password", account.password);
			then.status(200).header("content-type", "application/json").body(token);
		})
		.await;
}

/// Review session collection and item on dev2.
pub async fn mount_review_sessions(server: &MockServer) {
	let collection = "/performance-reviews/v1/review-sessions/";
	let item = format!("{collection}{REVIEW_SESSION_ID}/");

	server
		.mock_async(|when, then| {
			when.method(POST).path(collection).header("authorization", ADMIN.bearer());
			then.status(201).header("content-type", "application/json").body(
				json!({ "id": REVIEW_SESSION_ID, "title": "Q3 Performance Review" }).to_string(),
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(item.as_str()).header("authorization", ADMIN.bearer());
			then.status(200).header("content-type", "application/json").body(
				json!({
					"id": REVIEW_SESSION_ID,
					"participants": [
						{ "user": 101, "title": "Engineering Manager" },
						{ "user": 102, "title": "Backend Engineer" },
					],
				})
				.to_string(),
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(item.as_str()).header("authorization", EMPLOYEE.bearer());
			then.status(200).header("content-type", "application/json").body(
				json!({
					"id": REVIEW_SESSION_ID,
					"participants": [{ "user": 101, "title": "" }, { "user": 102, "title": null }],
				})
				.to_string(),
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(DELETE).path(item.as_str()).header("authorization", ADMIN.bearer());
			then.status(204);
		})
		.await;
}

/// Recognition template collection, listing, and item on stage.
pub async fn mount_recognition_templates(server: &MockServer) {
	let collection = format!("{MOCK_STAGE_API_PATH}/recognition/template/");
	let item = format!("{collection}{RECOGNITION_TEMPLATE_ID}/");
	let template = json!({
		"id": RECOGNITION_TEMPLATE_ID,
		"name": "Team player",
		"description": "Goes the extra mile for the team",
	});

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path(collection.as_str())
				.query_param("page", "1")
				.query_param("page_size", "10")
				.header("authorization", HR.bearer());
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "count": 1, "next": null, "results": [template.clone()] }).to_string());
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path(collection.as_str()).header("authorization", HR.bearer());
			then.status(201).header("content-type", "application/json").body(template.to_string());
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(item.as_str()).header("authorization", HR.bearer());
			then.status(200).header("content-type", "application/json").body(template.to_string());
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(DELETE).path(item.as_str()).header("authorization", HR.bearer());
			then.status(204);
		})
		.await;
}
