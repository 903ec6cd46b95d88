use std::borrow::Cow;

use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;
use serde_json::json;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(i64),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(index, index_docs))
		.api_route(
			"/posts/create",
			get_with(new_post, new_post_docs).post_with(create_post, create_post_docs),
		)
		.api_route("/posts/:post_id", get_with(get_post, get_post_docs))
		.api_route(
			"/posts/:post_id/edit",
			get_with(edit_post_page, edit_post_page_docs).post_with(edit_post, edit_post_docs),
		)
		.api_route(
			"/posts/:post_id/delete",
			get_with(delete_post_page, delete_post_page_docs)
				.post_with(delete_post, delete_post_docs),
		)
		.api_route(
			"/posts/:post_id/image",
			post_with(upload_image, upload_image_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownPost(post) => vec![error::Message {
				content: "unknown_post".into(),
				field: None,
				details: Some(Cow::Owned({
					let mut map = error::Map::new();
					map.insert("post".into(), json!(post));
					map
				})),
			}],
		}
	}
}
