use chrono::{DateTime, Utc};
use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
	model::{Category, Location},
	paginate::Page,
	permission::Authored,
	route::comment::model::Comment,
	Database,
};

pub use crate::route::model::{PageQuery, PostPath};

#[inline]
fn yes() -> bool {
	true
}

/// A single post, written by a user.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: i64,
	#[validate(length(min = 1, max = 256))]
	pub title: String,
	#[validate(length(min = 1))]
	pub text: String,
	/// The publication time. Posts dated in the future stay hidden until then.
	pub pub_date: DateTime<Utc>,
	/// The user that wrote the post.
	#[serde(skip_deserializing)]
	pub author_id: Uuid,
	pub location_id: Option<i64>,
	pub category_id: Option<i64>,
	/// Path of the attached image, relative to the media root.
	#[serde(skip_deserializing)]
	pub image: Option<String>,
	/// Unpublished posts are only visible to their author.
	#[serde(default = "yes")]
	pub is_published: bool,
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
}

impl Authored for Post {
	fn author_id(&self) -> Uuid {
		self.author_id
	}
}

impl PostForm {
	/// An empty form, publishing immediately.
	pub fn blank(now: DateTime<Utc>) -> Self {
		Self {
			title: String::new(),
			text: String::new(),
			pub_date: now,
			location_id: None,
			category_id: None,
			is_published: true,
		}
	}

	/// Checks that the selected category and location exist.
	pub async fn validate_choices(&self, database: &Database) -> Result<(), crate::error::AppError> {
		let mut errors = ValidationErrors::new();

		if let Some(category_id) = self.category_id {
			let exists = sqlx::query_scalar::<_, bool>(
				"SELECT EXISTS (SELECT 1 FROM category WHERE id = $1)",
			)
			.bind(category_id)
			.fetch_one(database)
			.await?;

			if !exists {
				errors.add("category_id", ValidationError::new("unknown_category"));
			}
		}

		if let Some(location_id) = self.location_id {
			let exists = sqlx::query_scalar::<_, bool>(
				"SELECT EXISTS (SELECT 1 FROM location WHERE id = $1)",
			)
			.bind(location_id)
			.fetch_one(database)
			.await?;

			if !exists {
				errors.add("location_id", ValidationError::new("unknown_location"));
			}
		}

		if errors.errors().is_empty() {
			Ok(())
		} else {
			Err(errors.into())
		}
	}
}

/// A post together with its author, category, location and comment count.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct PostView {
	#[serde(flatten)]
	#[sqlx(flatten)]
	pub post: Post,
	pub author_username: String,
	pub category_title: Option<String>,
	pub category_slug: Option<String>,
	#[serde(skip)]
	pub category_is_published: Option<bool>,
	/// Only present when the location is published.
	pub location_name: Option<String>,
	pub comment_count: i64,
}

impl Authored for PostView {
	fn author_id(&self) -> Uuid {
		self.post.author_id
	}
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct IndexPage {
	pub page: Page<PostView>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PostPage {
	pub post: PostView,
	/// Comments in the order they were written.
	pub comments: Vec<Comment>,
	/// Whether the viewer wrote the post and may edit it.
	pub is_author: bool,
}

/// The post form together with the categories and locations to choose from.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostFormPage {
	pub form: PostForm,
	pub categories: Vec<Category>,
	pub locations: Vec<Location>,
}

impl PostFormPage {
	pub async fn load(database: &Database, form: PostForm) -> Result<Self, sqlx::Error> {
		let categories = sqlx::query_as::<_, Category>("SELECT * FROM category ORDER BY title")
			.fetch_all(database)
			.await?;
		let locations = sqlx::query_as::<_, Location>("SELECT * FROM location ORDER BY name")
			.fetch_all(database)
			.await?;

		Ok(Self {
			form,
			categories,
			locations,
		})
	}
}
