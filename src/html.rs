//! Login page scraping.

// crates.io
use scraper::Html;
// self
use crate::_prelude::*;

/// Returns the `action` attribute of the first `<form>` in `html`.
///
/// Entities inside the attribute (Keycloak emits `&amp;` between query parameters) are decoded.
/// Fails with [`Error::FormNotFound`] when the document has no form or the first form has no
/// non-empty action.
pub fn extract_form_action(html: &str) -> Result<String> {
	let document = Html::parse_document(html);
	let form = document
		.root_element()
		.descendent_elements()
		.find(|element| element.value().name() == "form")
		.ok_or(Error::FormNotFound { reason: "no form element" })?;
	let action = form
		.value()
		.attr("action")
		.map(str::trim)
		.filter(|action| !action.is_empty())
		.ok_or(Error::FormNotFound { reason: "form has no action attribute" })?;

	Ok(action.to_owned())
}
