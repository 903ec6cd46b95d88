use axum::extract::State;
use chrono::Utc;
use macros::route;
use validator::Validate;

use crate::{
	extract::{Form, Json, Path, Query, Redirect, Reply, Session, Upload, Viewer},
	media::MediaStore,
	openapi::tag,
	permission::Authored,
	query::PostFilter,
	route::{comment::model::Comment, url},
	Database,
};

use super::{model, Error, RouteError};

/// Loads the bare post row, used for ownership checks before any write.
async fn find_post(database: &Database, post_id: i64) -> Result<model::Post, RouteError> {
	let post = sqlx::query_as::<_, model::Post>("SELECT * FROM post WHERE id = $1")
		.bind(post_id)
		.fetch_optional(database)
		.await?;

	Ok(post.ok_or(Error::UnknownPost(post_id))?)
}

/// Get index
/// Returns the public posts, newest first.
#[route(tag = tag::POST)]
pub async fn index(
	State(database): State<Database>,
	Query(query): Query<model::PageQuery>,
) -> Result<Json<model::IndexPage>, RouteError> {
	let page = PostFilter::public(Utc::now())
		.page(&database, query.number())
		.await?;

	Ok(Json(model::IndexPage { page }))
}

/// Get single post
/// Returns a post with its comments. Posts that are not public yet can only be seen by their author.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(database): State<Database>,
	viewer: Viewer,
	Path(path): Path<model::PostPath>,
) -> Result<Json<model::PostPage>, RouteError> {
	let post = model::PostView::find(&database, path.post_id)
		.await?
		.filter(|post| post.is_visible_to(viewer.id(), Utc::now()))
		.ok_or(Error::UnknownPost(path.post_id))?;

	let comments = Comment::for_post(&database, post.post.id).await?;
	let is_author = viewer.id().is_some_and(|id| post.is_authored_by(id));

	Ok(Json(model::PostPage {
		post,
		comments,
		is_author,
	}))
}

/// New post form
/// Returns an empty post form with the categories and locations to choose from.
#[route(tag = tag::POST)]
pub async fn new_post(
	State(database): State<Database>,
	_session: Session,
) -> Result<Json<model::PostFormPage>, RouteError> {
	let page = model::PostFormPage::load(&database, model::PostForm::blank(Utc::now())).await?;

	Ok(Json(page))
}

/// Create post
/// Creates a new post written by the current user, then redirects to their profile.
#[route(tag = tag::POST, redirect = "Redirect to the author's profile.")]
pub async fn create_post(
	State(database): State<Database>,
	session: Session,
	Json(form): Json<model::PostForm>,
) -> Result<Redirect, RouteError> {
	form.validate_choices(&database).await?;

	let post_id = sqlx::query_scalar::<_, i64>(
		r#"
			INSERT INTO post (title, text, pub_date, author_id, location_id, category_id, is_published)
			VALUES ($1, $2, $3, $4, $5, $6, $7)
			RETURNING id
		"#,
	)
	.bind(&form.title)
	.bind(&form.text)
	.bind(form.pub_date)
	.bind(session.user.id)
	.bind(form.location_id)
	.bind(form.category_id)
	.bind(form.is_published)
	.fetch_one(&database)
	.await?;

	tracing::info!(post_id, author = %session.user.username, "created post");

	Ok(Redirect::to(url::profile(&session.user.username)))
}

/// Edit post form
/// Returns the post form prefilled with the current values. Only the author may edit a post.
#[route(tag = tag::POST)]
pub async fn edit_post_page(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::PostPath>,
) -> Result<Reply<model::PostFormPage>, RouteError> {
	let post = find_post(&database, path.post_id).await?;

	if !post.is_authored_by(session.user.id) {
		return Ok(Redirect::to(url::post_detail(post.id)).into());
	}

	let page = model::PostFormPage::load(&database, model::PostForm::from(&post)).await?;

	Ok(Reply::Render(page))
}

/// Edit post
/// Replaces every editable field of the post, then redirects to it.
#[route(tag = tag::POST, redirect = "Redirect to the post.")]
pub async fn edit_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::PostPath>,
	Form(form): Form<model::PostForm>,
) -> Result<Redirect, RouteError> {
	let post = find_post(&database, path.post_id).await?;

	if !post.is_authored_by(session.user.id) {
		return Ok(Redirect::to(url::post_detail(post.id)));
	}

	form.validate()?;
	form.validate_choices(&database).await?;

	sqlx::query(
		r#"
			UPDATE post
			SET title = $1, text = $2, pub_date = $3, location_id = $4, category_id = $5, is_published = $6
			WHERE id = $7
		"#,
	)
	.bind(&form.title)
	.bind(&form.text)
	.bind(form.pub_date)
	.bind(form.location_id)
	.bind(form.category_id)
	.bind(form.is_published)
	.bind(post.id)
	.execute(&database)
	.await?;

	tracing::info!(post_id = post.id, "updated post");

	Ok(Redirect::to(url::post_detail(post.id)))
}

/// Delete post confirmation
/// Returns the post that is about to be deleted.
#[route(tag = tag::POST)]
pub async fn delete_post_page(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::PostPath>,
) -> Result<Reply<model::PostView>, RouteError> {
	let post = model::PostView::find(&database, path.post_id)
		.await?
		.ok_or(Error::UnknownPost(path.post_id))?;

	if !post.is_authored_by(session.user.id) {
		return Ok(Redirect::to(url::post_detail(post.post.id)).into());
	}

	Ok(Reply::Render(post))
}

/// Delete post
/// Deletes the post with its comments and image, then redirects to the author's profile.
#[route(tag = tag::POST, redirect = "Redirect to the author's profile.")]
pub async fn delete_post(
	State(database): State<Database>,
	State(media): State<MediaStore>,
	session: Session,
	Path(path): Path<model::PostPath>,
) -> Result<Redirect, RouteError> {
	let post = find_post(&database, path.post_id).await?;

	if !post.is_authored_by(session.user.id) {
		return Ok(Redirect::to(url::post_detail(post.id)));
	}

	sqlx::query("DELETE FROM post WHERE id = $1")
		.bind(post.id)
		.execute(&database)
		.await?;

	media.discard(post.image.as_deref()).await;

	tracing::info!(post_id = post.id, "deleted post");

	Ok(Redirect::to(url::profile(&session.user.username)))
}

/// Upload post image
/// Stores the request body as the post's image, replacing the previous one.
#[route(tag = tag::POST, redirect = "Redirect to the post.")]
pub async fn upload_image(
	State(database): State<Database>,
	State(media): State<MediaStore>,
	session: Session,
	Path(path): Path<model::PostPath>,
	upload: Upload,
) -> Result<Redirect, RouteError> {
	let post = find_post(&database, path.post_id).await?;

	if !post.is_authored_by(session.user.id) {
		return Ok(Redirect::to(url::post_detail(post.id)));
	}

	let image = upload.read(media.max_bytes()).await?;
	let stored = media.save_post_image(&image.bytes, image.extension).await?;

	// Concurrent uploads wait on the row lock, so each discards the image it replaced
	let replaced = sqlx::query_scalar::<_, Option<String>>(
		r#"
			UPDATE post SET image = $1
			FROM (SELECT id, image FROM post WHERE id = $2 FOR UPDATE) AS previous
			WHERE post.id = previous.id
			RETURNING previous.image
		"#,
	)
	.bind(&stored)
	.bind(post.id)
	.fetch_optional(&database)
	.await;

	let replaced = match replaced {
		Ok(Some(replaced)) => replaced,
		Ok(None) => {
			media.discard(Some(&stored)).await;
			return Err(Error::UnknownPost(post.id).into());
		}
		Err(error) => {
			media.discard(Some(&stored)).await;
			return Err(error.into());
		}
	};

	media.discard(replaced.as_deref()).await;

	tracing::info!(post_id = post.id, image = %stored, "stored post image");

	Ok(Redirect::to(url::post_detail(post.id)))
}
