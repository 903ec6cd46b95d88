//! Helpers shared by the HTTP tests.

use argon2::Argon2;
pub use axum_test::TestServer;
use axum_test::TestServerConfig;
use chrono::{DateTime, Duration, Utc};
pub use serde_json::json;
use uuid::Uuid;

use crate::media::MediaStore;
pub use crate::Database;

/// Upload limit used by test servers.
pub const MAX_IMAGE_BYTES: usize = 1024;

/// Creates a test server that keeps cookies between requests, like a browser.
///
/// Every server is its own client, so two servers on the same pool act as two users.
pub fn app(database: Database) -> TestServer {
	let media_root = std::env::temp_dir().join(format!("blog-media-{}", Uuid::new_v4()));

	let state = crate::State {
		database,
		hasher: Argon2::default(),
		media: MediaStore::new(media_root, MAX_IMAGE_BYTES),
	};

	let config = TestServerConfig {
		save_cookies: true,
		..TestServerConfig::default()
	};

	TestServer::new_with_config(crate::app(state), config).unwrap()
}

/// Registers `username` with the email `<username>@example.com` and logs in.
pub async fn register(app: &TestServer, username: &str) {
	let response = app
		.post("/auth/register")
		.json(&json!({
			"email": format!("{username}@example.com"),
			"username": username,
			"password": "hunter2hunter",
		}))
		.await;

	assert_eq!(response.status_code(), 200);
}

pub async fn user_id(database: &Database, username: &str) -> Uuid {
	sqlx::query_scalar::<_, Uuid>(r#"SELECT id FROM "user" WHERE username = $1"#)
		.bind(username)
		.fetch_one(database)
		.await
		.unwrap()
}

#[derive(Debug, Clone)]
pub struct PostFixture {
	pub title: String,
	pub pub_date: DateTime<Utc>,
	pub is_published: bool,
	pub category_id: Option<i64>,
	pub location_id: Option<i64>,
}

impl Default for PostFixture {
	fn default() -> Self {
		Self {
			title: "A day at the sea".into(),
			pub_date: Utc::now() - Duration::hours(1),
			is_published: true,
			category_id: None,
			location_id: None,
		}
	}
}

pub async fn insert_post(database: &Database, author: Uuid, post: PostFixture) -> i64 {
	sqlx::query_scalar::<_, i64>(
		r#"
			INSERT INTO post (title, text, pub_date, author_id, location_id, category_id, is_published)
			VALUES ($1, 'Some text', $2, $3, $4, $5, $6)
			RETURNING id
		"#,
	)
	.bind(post.title)
	.bind(post.pub_date)
	.bind(author)
	.bind(post.location_id)
	.bind(post.category_id)
	.bind(post.is_published)
	.fetch_one(database)
	.await
	.unwrap()
}

pub async fn insert_comment(database: &Database, post: i64, author: Uuid, text: &str) -> i64 {
	sqlx::query_scalar::<_, i64>(
		"INSERT INTO comment (post_id, author_id, text) VALUES ($1, $2, $3) RETURNING id",
	)
	.bind(post)
	.bind(author)
	.bind(text)
	.fetch_one(database)
	.await
	.unwrap()
}

pub async fn insert_category(database: &Database, slug: &str, is_published: bool) -> i64 {
	sqlx::query_scalar::<_, i64>(
		r#"
			INSERT INTO category (title, description, slug, is_published)
			VALUES ($1, '', $1, $2)
			RETURNING id
		"#,
	)
	.bind(slug)
	.bind(is_published)
	.fetch_one(database)
	.await
	.unwrap()
}

pub async fn insert_location(database: &Database, name: &str, is_published: bool) -> i64 {
	sqlx::query_scalar::<_, i64>(
		"INSERT INTO location (name, is_published) VALUES ($1, $2) RETURNING id",
	)
	.bind(name)
	.bind(is_published)
	.fetch_one(database)
	.await
	.unwrap()
}
