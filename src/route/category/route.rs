use axum::extract::State;
use chrono::Utc;
use macros::route;

use crate::{
	extract::{Json, Path, Query},
	model::Category,
	openapi::tag,
	query::PostFilter,
	Database,
};

use super::{model, Error, RouteError};

/// Get category
/// Returns a published category with its public posts, newest first.
#[route(tag = tag::CATEGORY)]
pub async fn get_category(
	State(database): State<Database>,
	Path(path): Path<model::CategoryPath>,
	Query(query): Query<model::PageQuery>,
) -> Result<Json<model::CategoryPage>, RouteError> {
	let category = sqlx::query_as::<_, Category>(
		"SELECT * FROM category WHERE slug = $1 AND is_published",
	)
	.bind(&path.slug)
	.fetch_optional(&database)
	.await?
	.ok_or_else(|| Error::UnknownCategory(path.slug.clone()))?;

	let page = PostFilter::public(Utc::now())
		.in_category(category.id)
		.page(&database, query.number())
		.await?;

	Ok(Json(model::CategoryPage { category, page }))
}
