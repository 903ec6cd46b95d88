use chrono::{DateTime, Utc};
use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{permission::Authored, Database};

pub use crate::route::model::{CommentPath, PostPath};

const SELECT_COMMENTS: &str = r#"
	SELECT cm.*, u.username AS author_username
	FROM comment cm
	JOIN "user" u ON u.id = cm.author_id
"#;

/// A comment left on a post.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Comment {
	/// The unique identifier of the comment.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The post the comment belongs to.
	#[serde(skip_deserializing)]
	pub post_id: i64,
	#[serde(skip_deserializing)]
	pub author_id: Uuid,
	#[serde(skip_deserializing)]
	pub author_username: String,
	#[validate(length(min = 1))]
	pub text: String,
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
}

impl Authored for Comment {
	fn author_id(&self) -> Uuid {
		self.author_id
	}
}

impl Comment {
	/// All comments on a post, oldest first.
	pub async fn for_post(database: &Database, post_id: i64) -> Result<Vec<Self>, sqlx::Error> {
		sqlx::query_as::<_, Self>(&format!(
			"{SELECT_COMMENTS} WHERE cm.post_id = $1 ORDER BY cm.created_at, cm.id"
		))
		.bind(post_id)
		.fetch_all(database)
		.await
	}

	/// A single comment, provided it belongs to `post_id`.
	pub async fn find(
		database: &Database,
		post_id: i64,
		comment_id: i64,
	) -> Result<Option<Self>, sqlx::Error> {
		sqlx::query_as::<_, Self>(&format!(
			"{SELECT_COMMENTS} WHERE cm.id = $1 AND cm.post_id = $2"
		))
		.bind(comment_id)
		.bind(post_id)
		.fetch_optional(database)
		.await
	}
}

/// The comment form for a post.
#[derive(Debug, Serialize, JsonSchema)]
pub struct CommentFormPage {
	pub post_id: i64,
	pub form: CommentForm,
}
