//! Transport primitives for token exchanges and API calls.
//!
//! Token requests flow through [`TokenHttpClient`], which hands the `oauth2` crate short-lived
//! handles that record the HTTP status and a body preview into a [`ResponseMetadataSlot`]. The
//! error layer reads the slot after `oauth2` resolves so that a rejected login reports what the
//! identity provider actually said. API calls are captured as [`ApiResponse`] values that the
//! assertion layer inspects.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::{Method, StatusCode, header::HeaderMap, redirect::Policy};
// self
use crate::_prelude::*;

/// Number of characters kept when a body is quoted inside token endpoint diagnostics.
pub const TOKEN_BODY_PREVIEW_LIMIT: usize = 256;

/// Abstraction over HTTP transports capable of executing OAuth token exchanges while
/// publishing response metadata to the error layer.
///
/// Implementations must be `Send + Sync + 'static` so an authenticator can share them, and the
/// handles they return must own whatever state their request futures need.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// Handles call [`ResponseMetadataSlot::take`] before submitting a request and
	/// [`ResponseMetadataSlot::store`] once a response (successful or not) arrives.
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Metadata captured from the most recent token endpoint response.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the token endpoint, if available.
	pub status: Option<u16>,
	/// Leading part of the response body.
	pub body_preview: Option<String>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`] used for token endpoint calls.
///
/// Token endpoints answer directly, so the default client never follows redirects.
#[derive(Clone)]
pub struct ReqwestHttpClient(ReqwestClient);
impl ReqwestHttpClient {
	/// Builds the default token client (no redirects).
	pub fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.build()
			.map_err(crate::error::ConfigError::from)?;

		Ok(Self(client))
	}

	pub(crate) fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}
}
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		self.instrumented(slot)
	}
}

struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`TokenHttpClient`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient { client, slot }))
	}
}
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(Box::new)?.to_vec();

			client.slot.store(ResponseMetadata {
				status: Some(status.as_u16()),
				body_preview: Some(truncate_preview(
					&String::from_utf8_lossy(&body),
					TOKEN_BODY_PREVIEW_LIMIT,
				)),
			});

			let mut response_new = HttpResponse::new(body);

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Response of an API call, fully read and kept for later assertions.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// Method of the request that produced the response.
	pub method: Method,
	/// Final request URL (after redirects).
	pub url: Url,
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body decoded as text.
	pub body: String,
}
impl ApiResponse {
	/// Reads `response` to the end.
	pub async fn read(method: Method, response: reqwest::Response) -> Result<Self> {
		let url = response.url().clone();
		let status = response.status();
		let headers = response.headers().clone();
		let body = response.text().await?;

		Ok(Self { method, url, status, headers, body })
	}

	/// Numeric status code.
	pub fn status_code(&self) -> u16 {
		self.status.as_u16()
	}

	/// Whether the status is 2xx.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// First `limit` characters of the body.
	pub fn body_preview(&self, limit: usize) -> String {
		truncate_preview(&self.body, limit)
	}

	/// Parses the body as JSON.
	pub fn json(&self) -> Result<serde_json::Value> {
		serde_json::from_str(&self.body).map_err(|source| Error::MalformedBody {
			url: self.url.to_string(),
			source,
			body_preview: self.body_preview(TOKEN_BODY_PREVIEW_LIMIT),
		})
	}

	/// Converts a non-2xx response into [`Error::HttpStatus`].
	pub fn error_for_status(&self, preview_limit: usize) -> Result<()> {
		if self.is_success() {
			return Ok(());
		}

		Err(Error::HttpStatus {
			method: self.method.to_string(),
			url: self.url.to_string(),
			status: self.status_code(),
			body_preview: self.body_preview(preview_limit),
		})
	}
}

/// Keeps the first `limit` characters of `body`.
pub fn truncate_preview(body: &str, limit: usize) -> String {
	match body.char_indices().nth(limit) {
		Some((idx, _)) => body[..idx].to_owned(),
		None => body.to_owned(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> ApiResponse {
		ApiResponse {
			method: Method::GET,
			url: Url::parse("https://api.example.com/items/1/").expect("Fixture URL should parse."),
			status: StatusCode::from_u16(status).expect("Fixture status should be valid."),
			headers: HeaderMap::new(),
			body: body.into(),
		}
	}

	#[test]
	fn truncate_preview_counts_characters() {
		assert_eq!(truncate_preview("abcdef", 3), "abc");
		assert_eq!(truncate_preview("ab", 3), "ab");
		assert_eq!(truncate_preview("żółw", 2), "żó");
	}

	#[test]
	fn error_for_status_reports_method_url_and_preview() {
		assert!(response(201, "{}").error_for_status(10).is_ok());

		let err = response(403, "{\"detail\":\"You do not have permission.\"}")
			.error_for_status(12)
			.expect_err("Non-2xx responses should fail.");

		match err {
			Error::HttpStatus { method, url, status, body_preview } => {
				assert_eq!(method, "GET");
				assert_eq!(url, "https://api.example.com/items/1/");
				assert_eq!(status, 403);
				assert_eq!(body_preview, "{\"detail\":\"Y");
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn json_reports_malformed_bodies() {
		assert!(response(200, "{\"results\":[]}").json().is_ok());
		assert!(matches!(response(502, "<html>Bad Gateway</html>").json(), Err(Error::MalformedBody { .. })));
	}

	#[test]
	fn metadata_slot_is_consumed_on_take() {
		let slot = ResponseMetadataSlot::default();

		slot.store(ResponseMetadata { status: Some(401), body_preview: None });

		assert_eq!(slot.take().and_then(|meta| meta.status), Some(401));
		assert!(slot.take().is_none());
	}
}
