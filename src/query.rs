//! Post listings and the public visibility rule.
//!
//! A [`PostFilter`] only describes a listing; nothing touches the database
//! until [`PostFilter::count`], [`PostFilter::fetch`] or [`PostFilter::page`]
//! is called.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
	paginate::{Page, PageNumber, Paginator, PAGE_SIZE},
	route::post::model::PostView,
	Database,
};

/// Selects posts with their author, category, location and comment count
/// resolved in a single query.
const SELECT_POSTS: &str = r#"
	SELECT
		p.*,
		u.username AS author_username,
		c.title AS category_title,
		c.slug AS category_slug,
		c.is_published AS category_is_published,
		CASE WHEN l.is_published THEN l.name END AS location_name,
		(SELECT COUNT(*) FROM comment cm WHERE cm.post_id = p.id) AS comment_count
	FROM post p
	JOIN "user" u ON u.id = p.author_id
	LEFT JOIN category c ON c.id = p.category_id
	LEFT JOIN location l ON l.id = p.location_id
"#;

const COUNT_POSTS: &str = r#"
	SELECT COUNT(*)
	FROM post p
	LEFT JOIN category c ON c.id = p.category_id
"#;

/// Describes which posts a listing contains.
#[derive(Debug, Clone)]
pub struct PostFilter {
	now: DateTime<Utc>,
	include_hidden: bool,
	category_id: Option<i64>,
	author_id: Option<Uuid>,
}

impl PostFilter {
	/// Posts visible to everyone at `now`: published, in a published category
	/// (if any) and with a publication date that has passed.
	pub fn public(now: DateTime<Utc>) -> Self {
		Self {
			now,
			include_hidden: false,
			category_id: None,
			author_id: None,
		}
	}

	pub fn in_category(mut self, category_id: i64) -> Self {
		self.category_id = Some(category_id);
		self
	}

	pub fn by_author(mut self, author_id: Uuid) -> Self {
		self.author_id = Some(author_id);
		self
	}

	/// Drops the visibility rule, used when authors look at their own posts.
	pub fn including_hidden(mut self) -> Self {
		self.include_hidden = true;
		self
	}

	fn push_conditions(&self, query: &mut QueryBuilder<'static, Postgres>) {
		query.push(" WHERE TRUE");

		if !self.include_hidden {
			query
				.push(" AND p.is_published AND (c.id IS NULL OR c.is_published) AND p.pub_date <= ")
				.push_bind(self.now);
		}

		if let Some(category_id) = self.category_id {
			query.push(" AND p.category_id = ").push_bind(category_id);
		}

		if let Some(author_id) = self.author_id {
			query.push(" AND p.author_id = ").push_bind(author_id);
		}
	}

	fn select(&self, limit: i64, offset: i64) -> QueryBuilder<'static, Postgres> {
		let mut query = QueryBuilder::new(SELECT_POSTS);

		self.push_conditions(&mut query);
		query
			.push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
			.push_bind(limit)
			.push(" OFFSET ")
			.push_bind(offset);

		query
	}

	fn select_count(&self) -> QueryBuilder<'static, Postgres> {
		let mut query = QueryBuilder::new(COUNT_POSTS);

		self.push_conditions(&mut query);
		query
	}

	pub async fn count(&self, database: &Database) -> Result<i64, sqlx::Error> {
		self.select_count()
			.build_query_scalar::<i64>()
			.fetch_one(database)
			.await
	}

	/// Fetches posts newest first.
	pub async fn fetch(
		&self,
		database: &Database,
		limit: i64,
		offset: i64,
	) -> Result<Vec<PostView>, sqlx::Error> {
		self.select(limit, offset)
			.build_query_as::<PostView>()
			.fetch_all(database)
			.await
	}

	/// Fetches a single page of the listing, clamping `number` to a valid page.
	pub async fn page(
		&self,
		database: &Database,
		number: PageNumber,
	) -> Result<Page<PostView>, sqlx::Error> {
		let paginator = Paginator::new(self.count(database).await?, PAGE_SIZE);
		let number = paginator.clamp(number);
		let posts = self
			.fetch(database, paginator.limit(), paginator.offset(number))
			.await?;

		Ok(paginator.page(number, posts))
	}
}

impl PostView {
	/// Loads a single post regardless of its visibility.
	pub async fn find(database: &Database, id: i64) -> Result<Option<Self>, sqlx::Error> {
		let mut query = QueryBuilder::<Postgres>::new(SELECT_POSTS);
		query.push(" WHERE p.id = ").push_bind(id);

		query.build_query_as::<Self>().fetch_optional(database).await
	}

	/// Whether anyone may see the post at `now`.
	pub fn is_public(&self, now: DateTime<Utc>) -> bool {
		self.post.is_published && self.category_is_published != Some(false) && self.post.pub_date <= now
	}

	/// Authors always see their own posts, everyone else only public ones.
	pub fn is_visible_to(&self, viewer: Option<Uuid>, now: DateTime<Utc>) -> bool {
		viewer == Some(self.post.author_id) || self.is_public(now)
	}
}

#[cfg(test)]
mod test {
	use chrono::{Duration, Utc};
	use uuid::Uuid;

	use super::PostFilter;
	use crate::route::post::model::{Post, PostView};

	fn view(author_id: Uuid) -> PostView {
		let now = Utc::now();

		PostView {
			post: Post {
				id: 1,
				title: "Title".into(),
				text: "Text".into(),
				pub_date: now - Duration::hours(1),
				author_id,
				location_id: None,
				category_id: Some(1),
				image: None,
				is_published: true,
				created_at: now,
			},
			author_username: "author".into(),
			category_title: Some("Travel".into()),
			category_slug: Some("travel".into()),
			category_is_published: Some(true),
			location_name: None,
			comment_count: 0,
		}
	}

	#[test]
	fn test_public_filter_sql() {
		let filter = PostFilter::public(Utc::now());
		let query = filter.select(10, 0);
		let sql = query.sql();

		assert!(sql.contains("p.is_published"));
		assert!(sql.contains("(c.id IS NULL OR c.is_published)"));
		assert!(sql.contains("p.pub_date <= $1"));
		assert!(sql.contains("ORDER BY p.pub_date DESC"));
		assert!(sql.contains("LIMIT $2 OFFSET $3"));
	}

	#[test]
	fn test_filter_composition_sql() {
		let filter = PostFilter::public(Utc::now())
			.in_category(4)
			.by_author(Uuid::new_v4());
		let query = filter.select_count();
		let sql = query.sql();

		assert!(sql.contains("p.category_id = $2"));
		assert!(sql.contains("p.author_id = $3"));
	}

	#[test]
	fn test_including_hidden_drops_visibility() {
		let filter = PostFilter::public(Utc::now())
			.by_author(Uuid::new_v4())
			.including_hidden();
		let query = filter.select_count();
		let sql = query.sql();

		assert!(!sql.contains("pub_date"));
		assert!(sql.contains("p.author_id = $1"));
	}

	#[test]
	fn test_future_post_is_hidden_from_others() {
		let author = Uuid::new_v4();
		let mut post = view(author);
		post.post.pub_date = Utc::now() + Duration::days(1);

		assert!(!post.is_public(Utc::now()));
		assert!(!post.is_visible_to(None, Utc::now()));
		assert!(!post.is_visible_to(Some(Uuid::new_v4()), Utc::now()));
		assert!(post.is_visible_to(Some(author), Utc::now()));
	}

	#[test]
	fn test_unpublished_category_hides_post() {
		let author = Uuid::new_v4();
		let mut post = view(author);
		post.category_is_published = Some(false);

		assert!(!post.is_public(Utc::now()));
		assert!(post.is_visible_to(Some(author), Utc::now()));

		post.category_is_published = None;
		assert!(post.is_public(Utc::now()));
	}

	#[test]
	fn test_unpublished_post_is_hidden() {
		let mut post = view(Uuid::new_v4());
		post.post.is_published = false;

		assert!(!post.is_public(Utc::now()));
	}
}
