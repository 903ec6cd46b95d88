use axum::extract::State;
use chrono::Utc;
use macros::route;

use crate::{
	extract::{Json, Path, Query, Redirect, Session, Viewer},
	openapi::tag,
	query::PostFilter,
	route::{auth, url},
	Database,
};

use super::{model, Error, RouteError};

/// Get profile
/// Returns a user's profile with their posts, newest first.
#[route(tag = tag::PROFILE)]
pub async fn get_profile(
	State(database): State<Database>,
	viewer: Viewer,
	Path(path): Path<model::ProfilePath>,
	Query(query): Query<model::PageQuery>,
) -> Result<Json<model::ProfilePage>, RouteError> {
	let profile = sqlx::query_as::<_, model::Profile>(
		r#"SELECT id, username, first_name, last_name, created_at FROM "user" WHERE username = $1"#,
	)
	.bind(&path.username)
	.fetch_optional(&database)
	.await?
	.ok_or_else(|| Error::UnknownUser(path.username.clone()))?;

	let mut filter = PostFilter::public(Utc::now()).by_author(profile.id);

	if viewer.id() == Some(profile.id) {
		filter = filter.including_hidden();
	}

	let page = filter.page(&database, query.number()).await?;

	Ok(Json(model::ProfilePage { profile, page }))
}

/// Edit profile form
/// Returns the profile form of the current user.
#[route(tag = tag::PROFILE)]
pub async fn edit_profile_page(session: Session) -> Json<auth::model::UserForm> {
	Json(auth::model::UserForm::from(&session.user))
}

/// Edit profile
/// Updates the current user's names, username and email, then redirects to the profile.
#[route(tag = tag::PROFILE, redirect = "Redirect to the profile.")]
pub async fn edit_profile(
	State(database): State<Database>,
	session: Session,
	Json(form): Json<auth::model::UserForm>,
) -> Result<Redirect, auth::RouteError> {
	sqlx::query(
		r#"
			UPDATE "user"
			SET email = $1, username = $2, first_name = $3, last_name = $4
			WHERE id = $5
		"#,
	)
	.bind(&form.email)
	.bind(&form.username)
	.bind(&form.first_name)
	.bind(&form.last_name)
	.bind(session.user.id)
	.execute(&database)
	.await
	.map_err(auth::map_unique_violation)?;

	tracing::info!(user_id = %session.user.id, username = %form.username, "updated profile");

	Ok(Redirect::to(url::profile(&form.username)))
}
