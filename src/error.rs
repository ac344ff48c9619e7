use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use axum_jsonschema::JsonSchemaRejection;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::json;

use crate::store;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error shown to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A machine-readable code, such as `unknown_post`.
	pub content: Cow<'a, str>,
	/// The input field the error is about, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: &str, value: serde_json::Value) -> Self {
		self.details
			.get_or_insert_with(Default::default)
			.to_mut()
			.insert(key.into(), value);
		self
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorBody<'a> {
	pub errors: Vec<Message<'a>>,
}

/// Describes how a route-specific error is presented to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;
	fn errors(&self) -> Vec<Message<'_>>;
}

/// Errors that can happen in any route.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0:?}")]
	Json(JsonSchemaRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error(transparent)]
	Store(#[from] store::Error),
}

impl From<JsonSchemaRejection> for AppError {
	fn from(rejection: JsonSchemaRejection) -> Self {
		Self::Json(rejection)
	}
}

impl AppError {
	pub fn status(&self) -> StatusCode {
		match self {
			// A missing or wrong content type keeps its 415
			Self::Json(JsonSchemaRejection::Json(rejection)) => rejection.status(),
			Self::Validation(..) | Self::Json(..) | Self::Query(..) | Self::Path(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::Store(error) => match error {
				store::Error::UnknownUser(..)
				| store::Error::UnknownPost(..)
				| store::Error::UnknownTag(..)
				| store::Error::UnknownCategory(..) => StatusCode::NOT_FOUND,
				store::Error::UsernameTaken | store::Error::CategoryTaken => StatusCode::CONFLICT,
				store::Error::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
			},
		}
	}

	pub fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors.iter().map(move |error| {
						let mut message = Message::new(error.code.as_ref()).field(field);

						for (key, value) in &error.params {
							// The rejected value is echoed back by the client already
							if key != "value" {
								message = message.detail(key, value.clone());
							}
						}

						message
					})
				})
				.collect(),
			Self::Json(JsonSchemaRejection::Json(rejection)) => {
				vec![Message::new("invalid_json").detail("reason", json!(rejection.body_text()))]
			}
			Self::Json(JsonSchemaRejection::Serde(error)) => vec![Message::new("invalid_body")
				.field(error.path().to_string())
				.detail("reason", json!(error.inner().to_string()))],
			Self::Json(JsonSchemaRejection::Schema(..)) => vec![Message::new("invalid_body")],
			Self::Query(rejection) => {
				vec![Message::new("invalid_query").detail("reason", json!(rejection.body_text()))]
			}
			Self::Path(rejection) => {
				vec![Message::new("invalid_path").detail("reason", json!(rejection.body_text()))]
			}
			Self::Store(error) => match error {
				store::Error::UnknownUser(id) => {
					vec![Message::new("unknown_user").detail("user", json!(id))]
				}
				store::Error::UnknownPost(id) => {
					vec![Message::new("unknown_post").detail("post", json!(id))]
				}
				store::Error::UnknownTag(id) => {
					vec![Message::new("unknown_tag").detail("tag", json!(id))]
				}
				store::Error::UnknownCategory(id) => {
					vec![Message::new("unknown_category").detail("category", json!(id))]
				}
				store::Error::UsernameTaken => {
					vec![Message::new("username_taken").field("username")]
				}
				store::Error::CategoryTaken => vec![Message::new("category_taken").field("name")],
				store::Error::Database(..) => Vec::new(),
			},
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		} else {
			tracing::debug!(error = %self, "request rejected");
		}

		(
			status,
			Json(ErrorBody {
				errors: self.errors(),
			}),
		)
			.into_response()
	}
}

impl OperationOutput for AppError {
	type Inner = ErrorBody<'static>;
}

/// The error returned by a route: either one of its own errors, or one
/// shared by every route.
#[derive(Debug)]
pub enum RouteError<E> {
	Route(E),
	App(AppError),
}

impl<E: ErrorShape> From<E> for RouteError<E> {
	fn from(error: E) -> Self {
		Self::Route(error)
	}
}

impl<E> From<AppError> for RouteError<E> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<E> From<store::Error> for RouteError<E> {
	fn from(error: store::Error) -> Self {
		Self::App(error.into())
	}
}

impl<E: ErrorShape> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::Route(error) => {
				tracing::debug!(error = %error, "request rejected");

				(
					error.status(),
					Json(ErrorBody {
						errors: error.errors(),
					}),
				)
					.into_response()
			}
			Self::App(error) => error.into_response(),
		}
	}
}

impl<E> OperationOutput for RouteError<E> {
	type Inner = ErrorBody<'static>;
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::*;
	use crate::{model::CreateUser, test::*};

	#[test]
	fn test_validation_messages() {
		let input = CreateUser {
			username: "x".into(),
			email: "not-an-email".into(),
			first_name: String::new(),
			last_name: String::new(),
		};
		let error = AppError::from(input.validate().unwrap_err());
		let errors = error.errors();

		assert_eq!(error.status(), StatusCode::BAD_REQUEST);
		assert!(errors
			.iter()
			.any(|m| m.content == "length" && m.field.as_deref() == Some("username")));
		assert!(errors
			.iter()
			.any(|m| m.content == "email" && m.field.as_deref() == Some("email")));
	}

	#[test]
	fn test_store_statuses() {
		assert_eq!(
			AppError::from(store::Error::UnknownPost(3)).status(),
			StatusCode::NOT_FOUND
		);
		assert_eq!(
			AppError::from(store::Error::UnknownCategory(3)).status(),
			StatusCode::NOT_FOUND
		);
		assert_eq!(
			AppError::from(store::Error::CategoryTaken).status(),
			StatusCode::CONFLICT
		);

		let body = serde_json::to_value(ErrorBody {
			errors: AppError::from(store::Error::UsernameTaken).errors(),
		})
		.unwrap();

		assert_eq!(
			body,
			json!({ "errors": [{ "content": "username_taken", "field": "username" }] })
		);
	}

	#[tokio::test]
	async fn test_json_rejections() {
		let app = app();

		// No content type at all
		let response = app.post(&admin("/tags")).bytes(r#"{"label":"math"}"#.into()).await;

		assert_eq!(response.status_code(), 415);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "invalid_json");

		let response = app.post(&admin("/tags")).text(r#"{"label":"math"}"#).await;

		assert_eq!(response.status_code(), 415);

		let response = app
			.post(&admin("/tags"))
			.content_type("application/json")
			.bytes("{".into())
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "invalid_json");
	}
}
