use schemars::JsonSchema;
use serde::Serialize;

/// A category that posts can be filed under.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Category {
	pub id: i64,
	pub title: String,
	pub description: String,
	/// The unique identifier used in category URLs.
	pub slug: String,
	/// Posts in an unpublished category are hidden from the public.
	pub is_published: bool,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A place a post can be attributed to.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Location {
	pub id: i64,
	pub name: String,
	pub is_published: bool,
	pub created_at: chrono::DateTime<chrono::Utc>,
}
