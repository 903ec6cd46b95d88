use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection::{JsonRejection, PathRejection, QueryRejection},
	http::{Response, StatusCode},
	response::{IntoResponse, Redirect},
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::route::url;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message presented to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A machine-readable description of the error.
	pub content: Cow<'a, str>,
	/// The form field the error belongs to, if any.
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
}

/// Describes how a route-specific error is presented to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;
	fn errors(&self) -> Vec<Message<'_>>;
}

/// Error type shared by every route.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] JsonRejection),
	#[error("query error: {0}")]
	Query(#[from] QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] PathRejection),
	#[error("failed to read request body: {0}")]
	Body(#[source] axum::Error),
	#[error("request body exceeds {limit} bytes")]
	PayloadTooLarge { limit: usize },
	#[error("unsupported media type {0:?}")]
	UnsupportedMediaType(Option<String>),
	#[error("login required to access {next}")]
	LoginRequired { next: String },
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

fn validation_messages(errors: &validator::ValidationErrors) -> Vec<Message<'static>> {
	errors
		.field_errors()
		.into_iter()
		.flat_map(|(field, errors)| {
			let field = field.to_string();

			errors.iter().map(move |error| Message {
				content: error
					.message
					.clone()
					.unwrap_or_else(|| error.code.clone()),
				field: Some(Cow::Owned(field.clone())),
				details: (!error.params.is_empty()).then(|| {
					Cow::Owned(
						error
							.params
							.iter()
							.map(|(key, value)| (key.to_string(), value.clone()))
							.collect(),
					)
				}),
			})
		})
		.collect()
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::Validation(ref errors) => {
				(StatusCode::BAD_REQUEST, Json(validation_messages(errors))).into_response()
			}
			Self::Json(rejection) => (
				rejection.status(),
				Json(vec![Message::new(rejection.body_text())]),
			)
				.into_response(),
			Self::Query(rejection) => (
				rejection.status(),
				Json(vec![Message::new(rejection.body_text())]),
			)
				.into_response(),
			Self::Path(rejection) => (
				rejection.status(),
				Json(vec![Message::new(rejection.body_text())]),
			)
				.into_response(),
			Self::Body(..) => (
				StatusCode::BAD_REQUEST,
				Json(vec![Message::new("invalid_body")]),
			)
				.into_response(),
			Self::PayloadTooLarge { limit } => (
				StatusCode::PAYLOAD_TOO_LARGE,
				Json(vec![Message {
					content: "payload_too_large".into(),
					field: None,
					details: Some(Cow::Owned({
						let mut map = Map::new();
						map.insert("limit".into(), limit.into());
						map
					})),
				}]),
			)
				.into_response(),
			Self::UnsupportedMediaType(..) => (
				StatusCode::UNSUPPORTED_MEDIA_TYPE,
				Json(vec![Message::new("unsupported_media_type")]),
			)
				.into_response(),
			Self::LoginRequired { next } => Redirect::to(&url::login(&next)).into_response(),
			Self::Database(..) | Self::Io(..) => {
				tracing::error!(error = %self, "internal error");

				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(Vec::<Message>::new()),
				)
					.into_response()
			}
		}
	}
}

impl OperationOutput for AppError {
	type Inner = Self;
}

/// An error returned from a route, either shared or specific to the route.
#[derive(Debug)]
pub enum RouteError<T> {
	App(AppError),
	Route(T),
}

impl<T: ErrorShape> From<T> for RouteError<T> {
	fn from(error: T) -> Self {
		Self::Route(error)
	}
}

impl<T> From<AppError> for RouteError<T> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<T> From<sqlx::Error> for RouteError<T> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(error.into())
	}
}

impl<T> From<validator::ValidationErrors> for RouteError<T> {
	fn from(error: validator::ValidationErrors) -> Self {
		Self::App(error.into())
	}
}

impl<T> From<std::io::Error> for RouteError<T> {
	fn from(error: std::io::Error) -> Self {
		Self::App(error.into())
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => (error.status(), Json(error.errors())).into_response(),
		}
	}
}

impl<T> OperationOutput for RouteError<T> {
	type Inner = Self;
}
