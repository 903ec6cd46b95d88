use std::borrow::Cow;

use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use serde_json::json;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0:?}")]
	UnknownUser(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/profile/:username", get_with(get_profile, get_profile_docs))
		.api_route(
			"/profile-edit",
			get_with(edit_profile_page, edit_profile_page_docs)
				.post_with(edit_profile, edit_profile_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownUser(username) => vec![error::Message {
				content: "unknown_user".into(),
				field: None,
				details: Some(Cow::Owned({
					let mut map = error::Map::new();
					map.insert("username".into(), json!(username));
					map
				})),
			}],
		}
	}
}

#[cfg(test)]
mod test {
	use chrono::{Duration, Utc};

	use crate::test::*;

	#[sqlx::test]
	async fn test_owner_sees_hidden_posts(pool: Database) {
		let owner = app(pool.clone());
		register(&owner, "john").await;
		let other = app(pool.clone());
		register(&other, "jane").await;

		let author = user_id(&pool, "john").await;
		insert_post(&pool, author, PostFixture::default()).await;
		insert_post(
			&pool,
			author,
			PostFixture {
				is_published: false,
				..PostFixture::default()
			},
		)
		.await;
		insert_post(
			&pool,
			author,
			PostFixture {
				pub_date: Utc::now() + Duration::days(3),
				..PostFixture::default()
			},
		)
		.await;

		let body = owner.get("/profile/john").await.json::<serde_json::Value>();
		assert_eq!(body["profile"]["username"], "john");
		assert_eq!(body["page"]["count"], 3);

		let body = other.get("/profile/john").await.json::<serde_json::Value>();
		assert_eq!(body["page"]["count"], 1);

		let body = app(pool).get("/profile/john").await.json::<serde_json::Value>();
		assert_eq!(body["page"]["count"], 1);
	}

	#[sqlx::test]
	async fn test_unknown_profile(pool: Database) {
		let response = app(pool).get("/profile/nobody").await;

		assert_eq!(response.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_edit_profile_requires_login(pool: Database) {
		let response = app(pool).get("/profile-edit").await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), "/auth/login?next=%2Fprofile-edit");
	}

	#[sqlx::test]
	async fn test_edit_profile(pool: Database) {
		let app = app(pool);
		register(&app, "john").await;

		let mut form = app.get("/profile-edit").await.json::<serde_json::Value>();
		assert_eq!(form["username"], "john");
		assert_eq!(form["email"], "john@example.com");

		form["username"] = json!("johnny");
		form["first_name"] = json!("John");

		let response = app.post("/profile-edit/").json(&form).await;
		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), "/profile/johnny/");

		let location = response.header("location");
		let response = app.get(location.to_str().unwrap()).await;
		assert_eq!(response.status_code(), 200);

		let body = response.json::<serde_json::Value>();
		assert_eq!(body["profile"]["first_name"], "John");
	}

	#[sqlx::test]
	async fn test_profile_paths_with_trailing_slash(pool: Database) {
		let app = app(pool);
		register(&app, "john").await;

		let response = app.get("/profile/john/").await;
		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<serde_json::Value>()["profile"]["username"], "john");

		let response = app.get("/profile-edit/").await;
		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<serde_json::Value>()["username"], "john");
	}

	#[sqlx::test]
	async fn test_edit_profile_username_taken(pool: Database) {
		let john = app(pool.clone());
		register(&john, "john").await;
		register(&app(pool), "jane").await;

		let response = john
			.post("/profile-edit")
			.json(&json!({
				"email": "john@example.com",
				"username": "jane",
				"first_name": "",
				"last_name": "",
			}))
			.await;

		assert_eq!(response.status_code(), 409);
	}
}
