use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use crate::paginate::PageNumber;

/// Query string of paginated listings.
#[derive(Debug, Default, Deserialize, Validate, JsonSchema)]
pub struct PageQuery {
	/// The page number to return (1-indexed). Invalid values return the first
	/// page, out-of-range values the last one.
	pub page: Option<String>,
}

impl PageQuery {
	pub fn number(&self) -> PageNumber {
		PageNumber::parse(self.page.as_deref())
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PostPath {
	pub post_id: i64,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CommentPath {
	pub post_id: i64,
	pub comment_id: i64,
}
