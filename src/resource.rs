//! Create/fetch/delete calls against the resource APIs.
//!
//! Every call records its response in the [`ScenarioContext`]. Creation is strict (a non-2xx
//! answer or a body without `id` aborts the scenario) while fetch, delete, and plain GETs keep
//! whatever came back for the assertion steps to judge, so scenarios can assert negative
//! statuses.

// crates.io
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::AuthHeaders,
	config::{ApiSurface, HarnessConfig},
	context::ScenarioContext,
	error::ConfigError,
	http::ApiResponse,
};

/// Field a creation response carries the new resource's identifier under.
pub const IDENTIFIER_FIELD: &str = "id";
/// Characters of the body quoted when a creation call fails.
pub const CREATE_ERROR_PREVIEW_LIMIT: usize = 1000;
/// Path of the paginated recognition template listing.
pub const RECOGNITION_TEMPLATES_PAGE: &str = "/recognition/template/?page=1&page_size=10";

/// Resource families with a create/fetch/delete lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
	/// Performance-review session on dev2.
	ReviewSession,
	/// Recognition template on stage.
	RecognitionTemplate,
}
impl ResourceKind {
	/// Deployment that hosts the collection.
	pub const fn surface(self) -> ApiSurface {
		match self {
			ResourceKind::ReviewSession => ApiSurface::Dev2,
			ResourceKind::RecognitionTemplate => ApiSurface::Stage,
		}
	}

	/// Collection path relative to the surface's API root.
	pub const fn collection_path(self) -> &'static str {
		match self {
			ResourceKind::ReviewSession => "/performance-reviews/v1/review-sessions/",
			ResourceKind::RecognitionTemplate => "/recognition/template/",
		}
	}

	/// Returns a stable label used in diagnostics.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResourceKind::ReviewSession => "review_session",
			ResourceKind::RecognitionTemplate => "recognition_template",
		}
	}

	/// Item path for `id`.
	pub fn item_path(self, id: &ResourceId) -> String {
		format!("{}{id}/", self.collection_path())
	}
}
impl Display for ResourceKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Identifier of a created resource; the API uses strings (UUIDs) or integers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId(String);
impl ResourceId {
	/// Wraps an identifier.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Reads the identifier from a JSON value: non-empty strings and numbers qualify.
	pub fn from_json(value: &Value) -> Option<Self> {
		match value {
			Value::String(id) if !id.trim().is_empty() => Some(Self(id.clone())),
			Value::Number(id) => Some(Self(id.to_string())),
			_ => None,
		}
	}

	/// Borrows the identifier.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for ResourceId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Issues API calls on behalf of scenario steps.
#[derive(Clone, Debug)]
pub struct ApiClient {
	client: ReqwestClient,
	config: Arc<HarnessConfig>,
}
impl ApiClient {
	/// Creates a client with default reqwest settings.
	pub fn new(config: impl Into<Arc<HarnessConfig>>) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Ok(Self::with_client(client, config))
	}

	/// Wraps an existing reqwest client.
	pub fn with_client(client: ReqwestClient, config: impl Into<Arc<HarnessConfig>>) -> Self {
		Self { client, config: config.into() }
	}

	/// POSTs the JSON `payload` to the collection of `kind` and remembers the new identifier.
	pub async fn create(
		&self,
		ctx: &mut ScenarioContext,
		kind: ResourceKind,
		payload: &str,
	) -> Result<ResourceId> {
		let headers = ctx.require_headers()?.clone();
		let body: Value =
			serde_json::from_str(payload).map_err(|source| Error::MalformedPayload { source })?;
		let url = self.url(kind.surface(), kind.collection_path())?;
		let request = self.request(Method::POST, url, &headers).json(&body);
		let response = self.send(Method::POST, request).await?;

		ctx.response = Some(response);

		let response = ctx.require_response()?;

		response.error_for_status(CREATE_ERROR_PREVIEW_LIMIT)?;

		let data = response.json()?;
		let id = data.get(IDENTIFIER_FIELD).and_then(ResourceId::from_json).ok_or_else(|| {
			Error::MissingIdentifier {
				field: IDENTIFIER_FIELD,
				body_preview: response.body_preview(CREATE_ERROR_PREVIEW_LIMIT),
			}
		})?;

		#[cfg(feature = "tracing")]
		tracing::info!(kind = kind.as_str(), id = %id, "resource created");

		ctx.resource_id = Some(id.clone());

		Ok(id)
	}

	/// GETs the last created resource of `kind` as the current user.
	pub async fn fetch(&self, ctx: &mut ScenarioContext, kind: ResourceKind) -> Result<()> {
		let headers = ctx.require_headers()?.clone();
		let id = ctx.require_resource_id(kind.as_str())?;
		let url = self.url(kind.surface(), &kind.item_path(id))?;
		let request = self.request(Method::GET, url, &headers);

		ctx.response = Some(self.send(Method::GET, request).await?);

		Ok(())
	}

	/// DELETEs the last created resource of `kind`, preferring remembered admin headers.
	///
	/// Fails without any HTTP call when nothing was created in this scenario.
	pub async fn delete(&self, ctx: &mut ScenarioContext, kind: ResourceKind) -> Result<()> {
		let id = ctx.require_resource_id(kind.as_str())?;
		let headers = ctx.privileged_headers()?.clone();
		let url = self.url(kind.surface(), &kind.item_path(id))?;
		let request = self.request(Method::DELETE, url, &headers);

		ctx.response = Some(self.send(Method::DELETE, request).await?);

		Ok(())
	}

	/// GETs an arbitrary `path` (query included) under the API root of `surface`.
	pub async fn get(
		&self,
		ctx: &mut ScenarioContext,
		surface: ApiSurface,
		path: &str,
	) -> Result<()> {
		let headers = ctx.require_headers()?.clone();
		let url = self.url(surface, path)?;
		let request = self.request(Method::GET, url, &headers);

		ctx.response = Some(self.send(Method::GET, request).await?);

		Ok(())
	}

	fn url(&self, surface: ApiSurface, path: &str) -> Result<Url> {
		Ok(self.config.surface(surface).api_url(path)?)
	}

	fn request(&self, method: Method, url: Url, headers: &AuthHeaders) -> RequestBuilder {
		self.client.request(method, url).headers(headers.as_map().clone())
	}

	async fn send(&self, method: Method, request: RequestBuilder) -> Result<ApiResponse> {
		let response = ApiResponse::read(method, request.send().await?).await?;

		#[cfg(feature = "tracing")]
		tracing::info!(
			method = %response.method,
			url = %response.url,
			status = response.status_code(),
			"API call completed"
		);

		Ok(response)
	}
}
