use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts, OriginalUri},
	http::{header, request},
};
use uuid::Uuid;

use crate::{error::AppError, openapi::SECURITY_SCHEME_SESSION, route::auth, session, Database};

/// Extracts the session and related user from the request.
///
/// Requests without a valid session cookie are rejected with
/// [`AppError::LoginRequired`], which redirects to the login page and
/// returns to the requested path afterwards.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: auth::model::User,
}

impl Session {
	/// Looks up the session referenced by the request's cookie, if any.
	async fn resolve(parts: &request::Parts, database: &Database) -> Result<Option<Self>, AppError> {
		let cookies = parts
			.headers
			.get_all(header::COOKIE)
			.into_iter()
			.filter_map(|value| value.to_str().ok());

		let Some(session_id) = cookies
			.flat_map(cookie::Cookie::split_parse)
			.filter_map(Result::ok)
			.find(|cookie| cookie.name() == session::COOKIE_NAME)
			.and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
		else {
			return Ok(None);
		};

		let user = sqlx::query_as::<_, auth::model::User>(
			r#"
				SELECT * FROM "user" WHERE id = (
					SELECT user_id FROM session WHERE id = $1
				)
			"#,
		)
		.bind(session_id)
		.fetch_optional(database)
		.await?;

		Ok(user.map(|user| Self {
			id: session_id,
			user,
		}))
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let database = Database::from_ref(state);

		// Nested routers only see the rest of the path
		let uri = parts
			.extensions
			.get::<OriginalUri>()
			.map_or(&parts.uri, |original| &original.0);

		Self::resolve(parts, &database)
			.await?
			.ok_or_else(|| AppError::LoginRequired {
				next: uri
					.path_and_query()
					.map_or_else(|| uri.path().to_owned(), ToString::to_string),
			})
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a session cookie requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}

/// The user looking at a public page, if they are logged in.
#[derive(Debug)]
pub struct Viewer(pub Option<Session>);

impl Viewer {
	pub fn id(&self) -> Option<Uuid> {
		self.0.as_ref().map(|session| session.user.id)
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Viewer
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let database = Database::from_ref(state);

		Ok(Self(Session::resolve(parts, &database).await?))
	}
}

impl OperationInput for Viewer {}
