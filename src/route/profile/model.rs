use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{paginate::Page, route::post::model::PostView};

pub use crate::route::model::PageQuery;

/// The public part of a user.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Profile {
	#[serde(skip)]
	pub id: Uuid,
	pub username: String,
	pub first_name: String,
	pub last_name: String,
	/// When the user registered.
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ProfilePath {
	pub username: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ProfilePage {
	pub profile: Profile,
	/// The posts of the user. Owners also see their unpublished and scheduled posts.
	pub page: Page<PostView>,
}
