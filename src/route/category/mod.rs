use std::borrow::Cow;

use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use serde_json::json;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown category {0:?}")]
	UnknownCategory(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/category/:slug", get_with(get_category, get_category_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownCategory(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownCategory(slug) => vec![error::Message {
				content: "unknown_category".into(),
				field: None,
				details: Some(Cow::Owned({
					let mut map = error::Map::new();
					map.insert("slug".into(), json!(slug));
					map
				})),
			}],
		}
	}
}
