//! Request extractors. Everything that reaches a handler through [`Json`],
//! [`Query`] or [`Path`] has already passed validation.

mod image;
mod reply;
mod session;

pub use image::Upload;
pub use reply::{Redirect, Reply};
pub use session::{Session, Viewer};

use aide::OperationIo;
use axum::{
	body::Body,
	extract::{FromRequest, FromRequestParts, Request},
	http::{request, Response},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

fn validated<T: Validate>(value: T) -> Result<T, AppError> {
	value.validate()?;
	Ok(value)
}

/// A validated JSON body, also used for JSON responses.
///
/// ```rust
/// async fn route(Json(form): Json<PostForm>) -> Json<PostFormPage> {
///   // form.title is between 1 and 256 characters
/// }
/// ```
#[derive(OperationIo)]
#[aide(
	input_with = "axum_jsonschema::Json<T>",
	output_with = "axum_jsonschema::Json<T>",
	json_schema
)]
pub struct Json<T>(pub T);

impl<T: serde::Serialize> IntoResponse for Json<T> {
	fn into_response(self) -> Response<Body> {
		axum::Json(self.0).into_response()
	}
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
	T: DeserializeOwned + Validate + JsonSchema + 'static,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let Form(value) = Form::<T>::from_request(req, state).await?;

		validated(value).map(Self)
	}
}

/// A JSON body that is only deserialized.
///
/// Edit forms use this so that a submission by someone other than the author
/// is answered the same way whether or not it is valid. Validate after the
/// ownership check:
///
/// ```rust
/// async fn route(session: Session, Form(form): Form<CommentForm>) {
///   // load the comment, compare authors, then
///   form.validate()?;
/// }
/// ```
#[derive(OperationIo)]
#[aide(input_with = "axum_jsonschema::Json<T>", json_schema)]
pub struct Form<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Form<T>
where
	T: DeserializeOwned + JsonSchema + 'static,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;

		Ok(Self(value))
	}
}

/// A validated query string, such as `?page=2`.
#[derive(OperationIo)]
#[aide(
	input_with = "axum::extract::Query<T>",
	output_with = "axum_jsonschema::Json<T>",
	json_schema
)]
pub struct Query<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
	T: DeserializeOwned + Validate,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let axum::extract::Query(value) =
			axum::extract::Query::<T>::from_request_parts(parts, state).await?;

		validated(value).map(Self)
	}
}

/// Validated path parameters, such as the post and comment ids.
#[derive(OperationIo)]
#[aide(
	input_with = "axum::extract::Path<T>",
	output_with = "axum_jsonschema::Json<T>",
	json_schema
)]
pub struct Path<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
	T: DeserializeOwned + Validate + Send,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let axum::extract::Path(value) =
			axum::extract::Path::<T>::from_request_parts(parts, state).await?;

		validated(value).map(Self)
	}
}
