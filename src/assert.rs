//! Expectations about the last response.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, error::AssertionError, http::ApiResponse};

/// Characters of the body quoted by a failed status assertion.
pub const STATUS_PREVIEW_LIMIT: usize = 1000;
/// Characters of the JSON dump quoted by a failed key assertion.
pub const JSON_DUMP_LIMIT: usize = 500;

/// The response status must equal `expected`.
pub fn status_is(response: &ApiResponse, expected: u16) -> Result<()> {
	let actual = response.status_code();

	if actual == expected {
		return Ok(());
	}

	Err(AssertionError::Status {
		expected,
		actual,
		url: response.url.to_string(),
		body_preview: response.body_preview(STATUS_PREVIEW_LIMIT),
	}
	.into())
}

/// The JSON body must be an object with a top-level `key`.
pub fn has_key(response: &ApiResponse, key: &str) -> Result<()> {
	let data = response.json()?;

	if data.as_object().is_some_and(|object| object.contains_key(key)) {
		return Ok(());
	}

	Err(AssertionError::MissingKey {
		key: key.to_owned(),
		dump: crate::http::truncate_preview(&data.to_string(), JSON_DUMP_LIMIT),
	}
	.into())
}

/// Some participant's `title` must equal `expected`.
pub fn participant_has_title(response: &ApiResponse, expected: &str) -> Result<()> {
	let data = response.json()?;
	let titles = participant_titles(&data)
		.map(|title| title.and_then(Value::as_str).map(str::to_owned))
		.collect::<Vec<_>>();

	if titles.iter().any(|title| title.as_deref() == Some(expected)) {
		return Ok(());
	}

	Err(AssertionError::ParticipantTitleMissing { expected: expected.to_owned(), titles }.into())
}

/// No participant may expose a non-blank string `title`.
pub fn participant_titles_hidden(response: &ApiResponse) -> Result<()> {
	let data = response.json()?;
	let visible = participant_titles(&data)
		.filter_map(|title| title.and_then(Value::as_str))
		.filter(|title| !title.trim().is_empty())
		.map(str::to_owned)
		.collect::<Vec<_>>();

	if visible.is_empty() {
		return Ok(());
	}

	Err(AssertionError::ParticipantTitlesVisible { visible }.into())
}

/// `title` of every object in the `participants` array (`None` when a participant has none).
/// A missing or non-array `participants` yields nothing.
fn participant_titles(data: &Value) -> impl Iterator<Item = Option<&Value>> {
	data.get("participants")
		.and_then(Value::as_array)
		.into_iter()
		.flatten()
		.filter(|participant| participant.is_object())
		.map(|participant| participant.get("title"))
}
