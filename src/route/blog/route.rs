use aide::transform::TransformOperation;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::{
	extract::{Auth, Json, MaybeAuth, Query},
	openapi::tag,
	route::model::{Paginate, Pagination},
	Database,
};

use super::{model, policy, Error, RouteError};

/// Base SELECT for blogs joined with their author and like metadata.
/// `viewer` drives the `liked` flag; `NULL` never matches a like row.
fn select_blogs<'a>(viewer: Option<Uuid>) -> sqlx::QueryBuilder<'a, sqlx::Postgres> {
	let mut query = sqlx::QueryBuilder::new(
		r#"
			SELECT b.id, b.title, b.content, b.summary, b.images, b.is_public, b.tags,
				b.read_time, b.views, b.created_at, b.updated_at,
				u.id AS author_id, u.username AS author_username, u.avatar AS author_avatar,
				(SELECT COUNT(*) FROM blog_like l WHERE l.blog_id = b.id) AS like_count,
				EXISTS(
					SELECT 1 FROM blog_like l WHERE l.blog_id = b.id AND l.user_id =
		"#,
	);

	query.push_bind(viewer);
	query.push(r#") AS liked FROM blog b JOIN "user" u ON u.id = b.author_id"#);
	query
}

async fn fetch_blog(
	database: &Database,
	id: Uuid,
	viewer: Option<Uuid>,
) -> Result<Option<model::BlogRow>, sqlx::Error> {
	let mut query = select_blogs(viewer);
	query.push(" WHERE b.id = ");
	query.push_bind(id);

	query
		.build_query_as::<model::BlogRow>()
		.fetch_optional(database)
		.await
}

pub fn list_blogs_docs(op: TransformOperation) -> TransformOperation {
	op.summary("List public blogs")
		.description(
			"Returns a page of public blogs, newest first, optionally filtered \
			by a text search, a tag or an author.",
		)
		.tag(tag::BLOG)
}

/// Returns a page of public blogs, newest first.
///
/// Identity is optional and only affects the `liked` flag; visibility
/// is enforced by the `is_public` filter, matching the single-item
/// policy in [`super::policy`].
pub async fn list_blogs(
	State(database): State<Database>,
	auth: MaybeAuth,
	Query(input): Query<model::ListBlogsInput>,
) -> Result<Json<model::BlogsResponse>, RouteError> {
	let mut query = select_blogs(auth.user_id());
	query.push(" WHERE b.is_public");

	let mut count = sqlx::QueryBuilder::new("SELECT COUNT(*) FROM blog b WHERE b.is_public");

	// Filters are pushed to both builders so the count always matches
	// the page.
	if let Some(search) = input
		.search
		.as_deref()
		.map(str::trim)
		.filter(|search| !search.is_empty())
	{
		for builder in [&mut query, &mut count] {
			builder.push(
				" AND to_tsvector('english', b.title || ' ' || b.content) \
				@@ websearch_to_tsquery('english', ",
			);
			builder.push_bind(search.to_owned());
			builder.push(")");
		}
	}

	if let Some(tag) = input
		.tag
		.as_deref()
		.map(|tag| tag.trim().to_lowercase())
		.filter(|tag| !tag.is_empty())
	{
		for builder in [&mut query, &mut count] {
			builder.push(" AND ");
			builder.push_bind(tag.clone());
			builder.push(" = ANY(b.tags)");
		}
	}

	if let Some(author) = input.author {
		for builder in [&mut query, &mut count] {
			builder.push(" AND b.author_id = ");
			builder.push_bind(author);
		}
	}

	query.push(" ORDER BY b.created_at DESC LIMIT ");
	query.push_bind(input.limit);
	query.push(" OFFSET ");
	query.push_bind(input.offset());

	let blogs = query
		.build_query_as::<model::BlogRow>()
		.fetch_all(&database)
		.await?;

	let total = count
		.build_query_scalar::<i64>()
		.fetch_one(&database)
		.await?;

	Ok(Json(model::BlogsResponse {
		blogs: blogs.into_iter().map(Into::into).collect(),
		pagination: Pagination::new(input.page, total, input.limit),
	}))
}

pub fn my_blogs_docs(op: TransformOperation) -> TransformOperation {
	op.summary("List own blogs")
		.description("Returns a page of the authenticated user's blogs, public and private.")
		.tag(tag::BLOG)
}

/// Returns a page of the caller's blogs, newest first.
pub async fn my_blogs(
	State(database): State<Database>,
	auth: Auth,
	Query(paginate): Query<Paginate>,
) -> Result<Json<model::BlogsResponse>, RouteError> {
	let mut query = select_blogs(Some(auth.user.id));
	query.push(" WHERE b.author_id = ");
	query.push_bind(auth.user.id);
	query.push(" ORDER BY b.created_at DESC LIMIT ");
	query.push_bind(paginate.limit);
	query.push(" OFFSET ");
	query.push_bind(paginate.offset());

	let blogs = query
		.build_query_as::<model::BlogRow>()
		.fetch_all(&database)
		.await?;

	let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blog WHERE author_id = $1")
		.bind(auth.user.id)
		.fetch_one(&database)
		.await?;

	Ok(Json(model::BlogsResponse {
		blogs: blogs.into_iter().map(Into::into).collect(),
		pagination: Pagination::new(paginate.page, total, paginate.limit),
	}))
}

pub fn get_blog_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get single blog")
		.description(
			"Returns a single blog by its unique id. Private blogs are only \
			visible to their author; reads by anyone else increment the view \
			counter.",
		)
		.tag(tag::BLOG)
}

/// Returns a single blog by its unique id, applying the visibility
/// policy and counting non-author views.
pub async fn get_blog(
	State(database): State<Database>,
	auth: MaybeAuth,
	Path(blog_id): Path<Uuid>,
) -> Result<Json<model::Blog>, RouteError> {
	let viewer = auth.user_id();

	let mut blog = fetch_blog(&database, blog_id, viewer)
		.await?
		.ok_or(Error::UnknownBlog(blog_id))?;

	if !policy::can_read(blog.is_public, blog.author_id, viewer) {
		return Err(if viewer.is_none() {
			Error::LoginRequired
		} else {
			Error::Private
		}
		.into());
	}

	if policy::counts_view(blog.author_id, viewer) {
		blog.views =
			sqlx::query_scalar::<_, i64>("UPDATE blog SET views = views + 1 WHERE id = $1 RETURNING views")
				.bind(blog_id)
				.fetch_one(&database)
				.await?;
	}

	Ok(Json(blog.into()))
}

pub fn create_blog_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Create blog")
		.description("Creates a new blog owned by the authenticated user.")
		.tag(tag::BLOG)
}

/// Creates a new blog owned by the caller.
pub async fn create_blog(
	State(database): State<Database>,
	auth: Auth,
	Json(input): Json<model::CreateBlogInput>,
) -> Result<Json<model::Blog>, RouteError> {
	let tags = model::normalize_tags(input.tags);
	let read_time = model::read_time(&input.content);

	let id = sqlx::query_scalar::<_, Uuid>(
		r#"
			INSERT INTO blog (author_id, title, content, summary, images, is_public, tags, read_time)
			VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
			RETURNING id
		"#,
	)
	.bind(auth.user.id)
	.bind(&input.title)
	.bind(&input.content)
	.bind(&input.summary)
	.bind(&input.images)
	.bind(input.is_public)
	.bind(&tags)
	.bind(read_time)
	.fetch_one(&database)
	.await?;

	let blog = fetch_blog(&database, id, Some(auth.user.id))
		.await?
		.ok_or(Error::UnknownBlog(id))?;

	Ok(Json(blog.into()))
}

pub fn update_blog_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Update blog")
		.description(
			"Updates an existing blog by its unique id. Only the author may \
			update a blog; absent fields keep their current values.",
		)
		.tag(tag::BLOG)
}

/// Updates an existing blog. Absent fields keep their current values;
/// the read-time estimate follows the final content.
pub async fn update_blog(
	State(database): State<Database>,
	auth: Auth,
	Path(blog_id): Path<Uuid>,
	Json(input): Json<model::UpdateBlogInput>,
) -> Result<Json<model::Blog>, RouteError> {
	let current = fetch_blog(&database, blog_id, Some(auth.user.id))
		.await?
		.ok_or(Error::UnknownBlog(blog_id))?;

	if !policy::can_write(current.author_id, Some(auth.user.id)) {
		return Err(Error::NotOwner.into());
	}

	let title = input.title.unwrap_or(current.title);
	let content = input.content.unwrap_or(current.content);
	let summary = input.summary.or(current.summary);
	let images = input.images.unwrap_or(current.images);
	let is_public = input.is_public.unwrap_or(current.is_public);
	let tags = model::normalize_tags(input.tags.unwrap_or(current.tags));
	let read_time = model::read_time(&content);

	sqlx::query(
		r#"
			UPDATE blog
			SET title = $1, content = $2, summary = $3, images = $4, is_public = $5,
				tags = $6, read_time = $7, updated_at = now()
			WHERE id = $8
		"#,
	)
	.bind(&title)
	.bind(&content)
	.bind(&summary)
	.bind(&images)
	.bind(is_public)
	.bind(&tags)
	.bind(read_time)
	.bind(blog_id)
	.execute(&database)
	.await?;

	let blog = fetch_blog(&database, blog_id, Some(auth.user.id))
		.await?
		.ok_or(Error::UnknownBlog(blog_id))?;

	Ok(Json(blog.into()))
}

pub fn delete_blog_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Delete blog")
		.description("Deletes an existing blog by its unique id. Only the author may delete a blog.")
		.tag(tag::BLOG)
}

/// Deletes an existing blog. Hosted images are not cleaned up.
pub async fn delete_blog(
	State(database): State<Database>,
	auth: Auth,
	Path(blog_id): Path<Uuid>,
) -> Result<(), RouteError> {
	let author = sqlx::query_scalar::<_, Uuid>("SELECT author_id FROM blog WHERE id = $1")
		.bind(blog_id)
		.fetch_optional(&database)
		.await?
		.ok_or(Error::UnknownBlog(blog_id))?;

	if !policy::can_write(author, Some(auth.user.id)) {
		return Err(Error::NotOwner.into());
	}

	sqlx::query("DELETE FROM blog WHERE id = $1")
		.bind(blog_id)
		.execute(&database)
		.await?;

	Ok(())
}

pub fn toggle_like_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Toggle like")
		.description(
			"Adds the authenticated user to the blog's likes if absent, \
			removes them otherwise. Returns the new count and membership.",
		)
		.tag(tag::BLOG)
}

/// Toggles the caller's like on a blog.
pub async fn toggle_like(
	State(database): State<Database>,
	auth: Auth,
	Path(blog_id): Path<Uuid>,
) -> Result<Json<model::LikeResponse>, RouteError> {
	sqlx::query_scalar::<_, Uuid>("SELECT id FROM blog WHERE id = $1")
		.bind(blog_id)
		.fetch_optional(&database)
		.await?
		.ok_or(Error::UnknownBlog(blog_id))?;

	let mut tx = database.begin().await?;

	let removed = sqlx::query("DELETE FROM blog_like WHERE blog_id = $1 AND user_id = $2")
		.bind(blog_id)
		.bind(auth.user.id)
		.execute(&mut *tx)
		.await?
		.rows_affected();

	if removed == 0 {
		// The primary key keeps concurrent toggles down to one row.
		sqlx::query(
			"INSERT INTO blog_like (blog_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
		)
		.bind(blog_id)
		.bind(auth.user.id)
		.execute(&mut *tx)
		.await?;
	}

	let likes = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blog_like WHERE blog_id = $1")
		.bind(blog_id)
		.fetch_one(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(Json(model::LikeResponse {
		likes,
		liked: removed == 0,
	}))
}
