//! Step vocabulary of the performance-review and recognition features.

// self
use crate::{
	_prelude::*,
	assert,
	config::ApiSurface,
	context::ScenarioContext,
	error::ConfigError,
	harness::Harness,
	resource::{RECOGNITION_TEMPLATES_PAGE, ResourceKind},
	steps::{StepFuture, StepHandler, StepInput, StepRegistry},
};

/// Every phrase of the default vocabulary with its handler, in registration order.
pub const DEFAULT_STEPS: &[(&str, StepHandler)] = &[
	(r#"I authenticate on dev2 as "(.*?)" with password "(.*?)""#, authenticate_dev2),
	(r#"I authenticate as "(.*?)" with password "(.*?)""#, authenticate_stage),
	("I remember current auth as admin", remember_admin),
	("I create a review session on dev2 with payload:", create_review_session),
	("I fetch the created review session on dev2", fetch_review_session),
	("I delete the created review session on dev2", delete_review_session),
	("I create a recognition template with payload:", create_recognition_template),
	("I fetch the created recognition template", fetch_recognition_template),
	("I delete the created recognition template", delete_recognition_template),
	(r#"I send a GET request to "(.*?)""#, get_endpoint),
	("I send a GET request to recognition templates", get_recognition_templates),
	(r"the response status code should be (\d+)", assert_status),
	(r#"the response should contain key "(.*?)""#, assert_key),
	(r#"one of participants has title exactly "(.*?)""#, assert_participant_title),
	("participants titles should not be visible to the current user", assert_titles_hidden),
];

/// Registers [`DEFAULT_STEPS`].
pub fn register_all(registry: &mut StepRegistry) -> Result<(), ConfigError> {
	for (pattern, handler) in DEFAULT_STEPS {
		registry.register(pattern, *handler)?;
	}

	Ok(())
}

fn authenticate_dev2<'a>(
	harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(async move {
		let user = input.capture(0)?;
		let grant = harness.auth.authorization_code_login(user, input.capture(1)?).await?;

		#[cfg(feature = "tracing")]
		tracing::info!(user, expires_at = ?grant.expires_at, "got frontend token");

		ctx.authenticate(grant)
	})
}

fn authenticate_stage<'a>(
	harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(async move {
		let user = input.capture(0)?;
		let grant = harness.auth.client_credentials_login(user, input.capture(1)?).await?;

		#[cfg(feature = "tracing")]
		tracing::info!(user, expires_at = ?grant.expires_at, "got confidential client token");

		ctx.authenticate(grant)
	})
}

fn remember_admin<'a>(
	_harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	_input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(async move { ctx.remember_admin().map_err(Error::from) })
}

fn create_review_session<'a>(
	harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	input: &'a StepInput,
) -> StepFuture<'a> {
	create(harness, ctx, input, ResourceKind::ReviewSession)
}

fn fetch_review_session<'a>(
	harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	_input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(harness.api.fetch(ctx, ResourceKind::ReviewSession))
}

fn delete_review_session<'a>(
	harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	_input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(harness.api.delete(ctx, ResourceKind::ReviewSession))
}

fn create_recognition_template<'a>(
	harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	input: &'a StepInput,
) -> StepFuture<'a> {
	create(harness, ctx, input, ResourceKind::RecognitionTemplate)
}

fn fetch_recognition_template<'a>(
	harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	_input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(harness.api.fetch(ctx, ResourceKind::RecognitionTemplate))
}

fn delete_recognition_template<'a>(
	harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	_input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(harness.api.delete(ctx, ResourceKind::RecognitionTemplate))
}

fn create<'a>(
	harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	input: &'a StepInput,
	kind: ResourceKind,
) -> StepFuture<'a> {
	Box::pin(async move { harness.api.create(ctx, kind, input.doc_string()?).await.map(|_| ()) })
}

fn get_endpoint<'a>(
	harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(async move { harness.api.get(ctx, ApiSurface::Stage, input.capture(0)?).await })
}

fn get_recognition_templates<'a>(
	harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	_input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(harness.api.get(ctx, ApiSurface::Stage, RECOGNITION_TEMPLATES_PAGE))
}

fn assert_status<'a>(
	_harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(async move { assert::status_is(ctx.require_response()?, input.status_code(0)?) })
}

fn assert_key<'a>(
	_harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(async move { assert::has_key(ctx.require_response()?, input.capture(0)?) })
}

fn assert_participant_title<'a>(
	_harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(async move {
		assert::participant_has_title(ctx.require_response()?, input.capture(0)?)
	})
}

fn assert_titles_hidden<'a>(
	_harness: &'a Harness,
	ctx: &'a mut ScenarioContext,
	_input: &'a StepInput,
) -> StepFuture<'a> {
	Box::pin(async move { assert::participant_titles_hidden(ctx.require_response()?) })
}
