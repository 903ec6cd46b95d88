use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{model::Category, paginate::Page, route::post::model::PostView};

pub use crate::route::model::PageQuery;

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CategoryPath {
	pub slug: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CategoryPage {
	pub category: Category,
	/// The public posts of the category, newest first.
	pub page: Page<PostView>,
}
