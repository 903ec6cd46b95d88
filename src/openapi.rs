use std::borrow::Cow;

use aide::{
	openapi::{ApiKeyLocation, SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{error, extract::Json, session};

pub const SECURITY_SCHEME_SESSION: &str = "Session";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const POST: &str = "Post";
	pub const COMMENT: &str = "Comment";
	pub const CATEGORY: &str = "Category";
	pub const PROFILE: &str = "Profile";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Blog Open API")
		.summary("A blog with categories, locations, scheduled posts and comments")
		.description(
			"Pages answer with the JSON context they render. Successful form submissions \
			answer with `303 See Other` pointing at the next page.",
		)
		.tag(Tag {
			name: tag::AUTH.into(),
			description: Some("User authentication".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Posts, listings and images".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::COMMENT.into(),
			description: Some("Comments on posts".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::CATEGORY.into(),
			description: Some("Category pages".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::PROFILE.into(),
			description: Some("User profiles".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_SESSION,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Cookie,
				name: session::COOKIE_NAME.into(),
				description: Some("A user session cookie".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<Vec<error::Message<'static>>>, _>(|res| {
			res.example(vec![error::Message {
				content: "error message".into(),
				field: Some("optional field".into()),
				details: Some(Cow::Owned({
					let mut map = error::Map::new();
					map.insert("key".into(), serde_json::json!("value"));
					map
				})),
			}])
		})
}
