use std::borrow::Cow;

use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use serde_json::json;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(i64),
	#[error("unknown comment {0}")]
	UnknownComment(i64),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/posts/:post_id/comment",
			get_with(new_comment, new_comment_docs).post_with(add_comment, add_comment_docs),
		)
		.api_route(
			"/posts/:post_id/edit_comment/:comment_id",
			get_with(edit_comment_page, edit_comment_page_docs)
				.post_with(edit_comment, edit_comment_docs),
		)
		.api_route(
			"/posts/:post_id/delete_comment/:comment_id",
			get_with(delete_comment_page, delete_comment_page_docs)
				.post_with(delete_comment, delete_comment_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownComment(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let (content, key, id) = match self {
			Self::UnknownPost(id) => ("unknown_post", "post", id),
			Self::UnknownComment(id) => ("unknown_comment", "comment", id),
		};

		vec![error::Message {
			content: content.into(),
			field: None,
			details: Some(Cow::Owned({
				let mut map = error::Map::new();
				map.insert(key.into(), json!(id));
				map
			})),
		}]
	}
}

#[cfg(test)]
mod test {
	use chrono::{Duration, Utc};

	use crate::test::*;

	#[sqlx::test]
	async fn test_add_comment(pool: Database) {
		let app = app(pool.clone());
		register(&app, "john").await;

		let post = insert_post(&pool, user_id(&pool, "john").await, PostFixture::default()).await;

		let response = app
			.post(&format!("/posts/{post}/comment"))
			.json(&json!({
				"text": "Nice post",
				"post_id": 999,
				"author_id": "00000000-0000-0000-0000-000000000000",
			}))
			.await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), format!("/posts/{post}/"));

		let (post_id, author) = sqlx::query_as::<_, (i64, String)>(
			r#"SELECT c.post_id, u.username FROM comment c JOIN "user" u ON u.id = c.author_id"#,
		)
		.fetch_one(&pool)
		.await
		.unwrap();

		assert_eq!(post_id, post);
		assert_eq!(author, "john");
	}

	#[sqlx::test]
	async fn test_add_comment_to_hidden_post(pool: Database) {
		let author = app(pool.clone());
		register(&author, "alice").await;
		let other = app(pool.clone());
		register(&other, "bob").await;

		let post = insert_post(
			&pool,
			user_id(&pool, "alice").await,
			PostFixture {
				pub_date: Utc::now() + Duration::days(1),
				..PostFixture::default()
			},
		)
		.await;

		let path = format!("/posts/{post}/comment");

		let response = other.post(&path).json(&json!({ "text": "Too early" })).await;
		assert_eq!(response.status_code(), 404);

		let response = author.post(&path).json(&json!({ "text": "Note to self" })).await;
		assert_eq!(response.status_code(), 303);
	}

	#[sqlx::test]
	async fn test_comment_requires_login(pool: Database) {
		let author = app(pool.clone());
		register(&author, "john").await;
		let post = insert_post(&pool, user_id(&pool, "john").await, PostFixture::default()).await;

		let response = app(pool)
			.post(&format!("/posts/{post}/comment"))
			.json(&json!({ "text": "Anonymous" }))
			.await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(
			response.header("location"),
			format!("/auth/login?next=%2Fposts%2F{post}%2Fcomment")
		);
	}

	#[sqlx::test]
	async fn test_edit_comment(pool: Database) {
		let app = app(pool.clone());
		register(&app, "john").await;

		let author = user_id(&pool, "john").await;
		let post = insert_post(&pool, author, PostFixture::default()).await;
		let comment = insert_comment(&pool, post, author, "Frist").await;
		let path = format!("/posts/{post}/edit_comment/{comment}");

		let response = app.get(&path).await;
		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<serde_json::Value>()["form"]["text"], "Frist");

		let response = app.post(&path).json(&json!({ "text": "First" })).await;
		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), format!("/posts/{post}/"));

		let text = sqlx::query_scalar::<_, String>("SELECT text FROM comment WHERE id = $1")
			.bind(comment)
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(text, "First");
	}

	#[sqlx::test]
	async fn test_comment_must_belong_to_post(pool: Database) {
		let app = app(pool.clone());
		register(&app, "john").await;

		let author = user_id(&pool, "john").await;
		let post = insert_post(&pool, author, PostFixture::default()).await;
		let other_post = insert_post(&pool, author, PostFixture::default()).await;
		let comment = insert_comment(&pool, post, author, "Hello").await;

		let response = app
			.get(&format!("/posts/{other_post}/edit_comment/{comment}"))
			.await;

		assert_eq!(response.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_delete_comment_by_other_user(pool: Database) {
		let author = app(pool.clone());
		register(&author, "alice").await;
		let other = app(pool.clone());
		register(&other, "bob").await;

		let alice = user_id(&pool, "alice").await;
		let post = insert_post(&pool, alice, PostFixture::default()).await;
		let comment = insert_comment(&pool, post, alice, "Mine").await;
		let path = format!("/posts/{post}/delete_comment/{comment}");

		assert_eq!(other.get(&path).await.status_code(), 404);
		assert_eq!(other.post(&path).await.status_code(), 404);

		let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comment")
			.fetch_one(&pool)
			.await
			.unwrap();
		assert_eq!(count, 1);

		let response = author.post(&path).await;
		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), format!("/posts/{post}/"));

		let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comment")
			.fetch_one(&pool)
			.await
			.unwrap();
		assert_eq!(count, 0);
	}
}
