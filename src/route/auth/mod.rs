use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid username or password")]
	InvalidUsernameOrPassword,
	#[error("password validation error")]
	Argon(#[from] argon2::Error),
	#[error("username already taken")]
	UsernameTaken,
	#[error("email already taken")]
	EmailTaken,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/login",
			get_with(login_page, login_page_docs).post_with(login, login_docs),
		)
		.api_route("/logout", get_with(logout, logout_docs))
		.api_route("/register", post_with(register, register_docs))
		.api_route(
			"/me",
			get_with(get_me, get_me_docs).delete_with(delete_me, delete_me_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidUsernameOrPassword => StatusCode::UNAUTHORIZED,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UsernameTaken | Self::EmailTaken => StatusCode::CONFLICT,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		vec![error::Message::new(self.to_string())]
	}
}

/// Maps unique constraint violations on the user table to their errors.
pub fn map_unique_violation(error: sqlx::Error) -> RouteError {
	match error {
		sqlx::Error::Database(ref database) => match database.constraint() {
			Some("user_email_key") => Error::EmailTaken.into(),
			Some("user_username_key") => Error::UsernameTaken.into(),
			_ => RouteError::from(error),
		},
		error => RouteError::from(error),
	}
}
