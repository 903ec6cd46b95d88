use axum::extract::State;
use chrono::Utc;
use macros::route;
use uuid::Uuid;
use validator::Validate;

use crate::{
	extract::{Form, Json, Path, Redirect, Session},
	openapi::tag,
	permission::Authored,
	route::{post::model::PostView, url},
	Database,
};

use super::{model, Error, RouteError};

/// Makes sure the post exists and `user` may see it.
async fn ensure_visible_post(database: &Database, post_id: i64, user: Uuid) -> Result<(), RouteError> {
	PostView::find(database, post_id)
		.await?
		.filter(|post| post.is_visible_to(Some(user), Utc::now()))
		.ok_or(Error::UnknownPost(post_id))?;

	Ok(())
}

/// Loads a comment of the post that `user` wrote. Comments of other users
/// are reported as unknown.
async fn find_own_comment(
	database: &Database,
	path: &model::CommentPath,
	user: Uuid,
) -> Result<model::Comment, RouteError> {
	let comment = model::Comment::find(database, path.post_id, path.comment_id)
		.await?
		.filter(|comment| comment.is_authored_by(user))
		.ok_or(Error::UnknownComment(path.comment_id))?;

	Ok(comment)
}

/// New comment form
/// Returns an empty comment form for the post.
#[route(tag = tag::COMMENT)]
pub async fn new_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::PostPath>,
) -> Result<Json<model::CommentFormPage>, RouteError> {
	ensure_visible_post(&database, path.post_id, session.user.id).await?;

	Ok(Json(model::CommentFormPage {
		post_id: path.post_id,
		form: model::CommentForm {
			text: String::new(),
		},
	}))
}

/// Add comment
/// Adds a comment by the current user to the post, then redirects to the post.
#[route(tag = tag::COMMENT, redirect = "Redirect to the post.")]
pub async fn add_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::PostPath>,
	Json(form): Json<model::CommentForm>,
) -> Result<Redirect, RouteError> {
	ensure_visible_post(&database, path.post_id, session.user.id).await?;

	let comment_id = sqlx::query_scalar::<_, i64>(
		"INSERT INTO comment (post_id, author_id, text) VALUES ($1, $2, $3) RETURNING id",
	)
	.bind(path.post_id)
	.bind(session.user.id)
	.bind(&form.text)
	.fetch_one(&database)
	.await?;

	tracing::info!(post_id = path.post_id, comment_id, "added comment");

	Ok(Redirect::to(url::post_detail(path.post_id)))
}

/// Edit comment form
/// Returns the comment form prefilled with the current text.
#[route(tag = tag::COMMENT)]
pub async fn edit_comment_page(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::CommentPath>,
) -> Result<Json<model::CommentFormPage>, RouteError> {
	let comment = find_own_comment(&database, &path, session.user.id).await?;

	Ok(Json(model::CommentFormPage {
		post_id: comment.post_id,
		form: model::CommentForm::from(&comment),
	}))
}

/// Edit comment
/// Replaces the text of the comment, then redirects to the post.
#[route(tag = tag::COMMENT, redirect = "Redirect to the post.")]
pub async fn edit_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::CommentPath>,
	Form(form): Form<model::CommentForm>,
) -> Result<Redirect, RouteError> {
	let comment = find_own_comment(&database, &path, session.user.id).await?;

	form.validate()?;

	sqlx::query("UPDATE comment SET text = $1 WHERE id = $2")
		.bind(&form.text)
		.bind(comment.id)
		.execute(&database)
		.await?;

	tracing::info!(comment_id = comment.id, "updated comment");

	Ok(Redirect::to(url::post_detail(comment.post_id)))
}

/// Delete comment confirmation
/// Returns the comment that is about to be deleted.
#[route(tag = tag::COMMENT)]
pub async fn delete_comment_page(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::CommentPath>,
) -> Result<Json<model::Comment>, RouteError> {
	let comment = find_own_comment(&database, &path, session.user.id).await?;

	Ok(Json(comment))
}

/// Delete comment
/// Deletes the comment, then redirects to the post.
#[route(tag = tag::COMMENT, redirect = "Redirect to the post.")]
pub async fn delete_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::CommentPath>,
) -> Result<Redirect, RouteError> {
	let comment = find_own_comment(&database, &path, session.user.id).await?;

	sqlx::query("DELETE FROM comment WHERE id = $1")
		.bind(comment.id)
		.execute(&database)
		.await?;

	tracing::info!(comment_id = comment.id, "deleted comment");

	Ok(Redirect::to(url::post_detail(comment.post_id)))
}
