use aide::OperationOutput;
use axum::{
	body::Body,
	http::Response,
	response::IntoResponse,
};

/// A `303 See Other` redirect, answered after a successful form submission.
#[derive(Debug)]
pub struct Redirect(pub String);

impl Redirect {
	pub fn to(uri: impl Into<String>) -> Self {
		Self(uri.into())
	}
}

impl IntoResponse for Redirect {
	fn into_response(self) -> Response<Body> {
		axum::response::Redirect::to(&self.0).into_response()
	}
}

impl OperationOutput for Redirect {
	type Inner = ();
}

/// Either the rendered page context or a redirect elsewhere.
#[derive(Debug)]
pub enum Reply<T> {
	Render(T),
	Redirect(Redirect),
}

impl<T> From<Redirect> for Reply<T> {
	fn from(redirect: Redirect) -> Self {
		Self::Redirect(redirect)
	}
}

impl<T> IntoResponse for Reply<T>
where
	T: serde::Serialize,
{
	fn into_response(self) -> Response<Body> {
		match self {
			Self::Render(page) => axum::extract::Json(page).into_response(),
			Self::Redirect(redirect) => redirect.into_response(),
		}
	}
}

impl<T> OperationOutput for Reply<T> {
	type Inner = T;
}
