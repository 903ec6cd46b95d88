use aide::axum::IntoApiResponse;
use argon2::Argon2;
use axum::{
	extract::State,
	http::{header, StatusCode},
};
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Query, Session},
	openapi::tag,
	session, AppState, Database,
};

use super::{map_unique_violation, model, Error, RouteError};

pub const HASH_LENGTH: usize = 32;

/// Derives the stored password hash. The user id doubles as the salt, which
/// is why ids are generated before the user row is written.
fn hash_password(hasher: &Argon2, password: &str, user_id: Uuid) -> Result<[u8; HASH_LENGTH], Error> {
	let mut hash = [0; HASH_LENGTH];

	hasher.hash_password_into(password.as_bytes(), user_id.as_bytes(), &mut hash)?;
	Ok(hash)
}

async fn insert_session<'e>(
	executor: impl sqlx::PgExecutor<'e>,
	user_id: Uuid,
) -> Result<model::Session, sqlx::Error> {
	sqlx::query_as::<_, model::Session>("INSERT INTO session (user_id) VALUES ($1) RETURNING *")
		.bind(user_id)
		.fetch_one(executor)
		.await
}

/// Answers with the session, setting its cookie.
fn session_response(session: model::Session) -> impl IntoApiResponse {
	let cookie = session::create_cookie(session.id);

	([(header::SET_COOKIE, cookie.to_string())], Json(session))
}

/// Answers with an expired session cookie.
fn cleared_session_response() -> impl IntoApiResponse {
	(
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		StatusCode::NO_CONTENT,
	)
}

/// Login page
/// Describes the login form. Anonymous users are sent here when they open a page that needs an account.
#[route(tag = tag::AUTH)]
pub async fn login_page(Query(query): Query<model::LoginQuery>) -> Json<model::LoginPage> {
	Json(model::LoginPage { next: query.next })
}

/// Log in
/// Logs in to an account, returning an associated session cookie.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<model::Session>"))]
pub async fn login(
	State(state): State<AppState>,
	Json(auth): Json<model::LoginInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE email = $1"#)
		.bind(&auth.email)
		.fetch_optional(&state.database)
		.await?
		.ok_or(Error::InvalidUsernameOrPassword)?;

	if user.password != hash_password(&state.hasher, &auth.password, user.id)? {
		tracing::info!(username = %user.username, "rejected login");
		return Err(Error::InvalidUsernameOrPassword.into());
	}

	let session = insert_session(&state.database, user.id).await?;

	tracing::info!(username = %user.username, "logged in");

	Ok(session_response(session))
}

/// Log out
/// Logs out of the authenticated account.
#[route(tag = tag::AUTH, response(status = 204, description = "Logged out successfully."))]
pub async fn logout(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	sqlx::query("DELETE FROM session WHERE id = $1")
		.bind(session.id)
		.execute(&database)
		.await?;

	Ok(cleared_session_response())
}

/// Register account
/// Registers a new account, returning an associated session cookie.
#[route(tag = tag::AUTH, response(status = 200, description = "Registered successfully.", shape = "Json<model::Session>"))]
pub async fn register(
	State(state): State<AppState>,
	Json(auth): Json<model::RegisterInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &auth.password, user_id)?;

	let mut tx = state.database.begin().await?;

	sqlx::query(
		r#"
			INSERT INTO "user" (id, email, username, first_name, last_name, password)
			VALUES ($1, $2, $3, $4, $5, $6)
		"#,
	)
	.bind(user_id)
	.bind(&auth.email)
	.bind(&auth.username)
	.bind(&auth.first_name)
	.bind(&auth.last_name)
	.bind(&hashed[..])
	.execute(&mut *tx)
	.await
	.map_err(map_unique_violation)?;

	let session = insert_session(&mut *tx, user_id).await?;

	tx.commit().await?;

	tracing::info!(username = %auth.username, "registered account");

	Ok(session_response(session))
}

/// Get user
/// Returns the authenticated user.
#[route(tag = tag::AUTH)]
pub async fn get_me(session: Session) -> Json<model::User> {
	Json(session.user)
}

/// Delete user
/// Deletes the authenticated user and their posts and comments. This action is irreversible.
#[route(tag = tag::AUTH, response(status = 204, description = "Account deleted."))]
pub async fn delete_me(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
		.bind(session.user.id)
		.execute(&database)
		.await?;

	tracing::info!(username = %session.user.username, "deleted account");

	Ok(cleared_session_response())
}
