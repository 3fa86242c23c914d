use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::route::model::{nine, one, Pagination};

/// Average reading speed used for the estimate, in words per minute.
const WORDS_PER_MINUTE: usize = 200;

const MAX_TAG_LENGTH: usize = 30;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Estimated minutes needed to read `content`, always at least one.
pub fn read_time(content: &str) -> i32 {
	let words = content.split_whitespace().count();

	i32::try_from(words.div_ceil(WORDS_PER_MINUTE).max(1)).unwrap_or(i32::MAX)
}

/// Trims, lowercases and deduplicates tags, dropping empties.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
	let mut normalized = Vec::with_capacity(tags.len());

	for tag in tags {
		let tag = tag.trim().to_lowercase();

		if !tag.is_empty() && !normalized.contains(&tag) {
			normalized.push(tag);
		}
	}

	normalized
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
	if tags.iter().any(|tag| tag.trim().len() > MAX_TAG_LENGTH) {
		return Err(ValidationError::new("tag_too_long"));
	}

	Ok(())
}

fn validate_images(images: &[String]) -> Result<(), ValidationError> {
	for url in images {
		let url = url.to_lowercase();

		let scheme = url.starts_with("http://") || url.starts_with("https://");
		let extension = IMAGE_EXTENSIONS
			.iter()
			.any(|ext| url.ends_with(&format!(".{ext}")));

		if !scheme || !extension {
			return Err(ValidationError::new("invalid_image_url"));
		}
	}

	Ok(())
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreateBlogInput {
	/// The title of the blog.
	#[validate(length(min = 1, max = 200))]
	pub title: String,
	/// The content of the blog in Markdown format.
	#[validate(length(min = 10))]
	pub content: String,
	/// A short teaser shown in listings.
	#[validate(length(max = 300))]
	pub summary: Option<String>,
	/// URLs previously returned by the image upload endpoints.
	#[validate(custom(function = "validate_images"))]
	#[serde(default)]
	pub images: Vec<String>,
	/// Whether the blog is visible to other users.
	#[serde(default)]
	pub is_public: bool,
	#[validate(custom(function = "validate_tags"))]
	#[serde(default)]
	pub tags: Vec<String>,
}

/// Partial update; absent fields keep their current values.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdateBlogInput {
	#[validate(length(min = 1, max = 200))]
	pub title: Option<String>,
	#[validate(length(min = 10))]
	pub content: Option<String>,
	#[validate(length(max = 300))]
	pub summary: Option<String>,
	#[validate(custom(function = "validate_images"))]
	pub images: Option<Vec<String>>,
	pub is_public: Option<bool>,
	#[validate(custom(function = "validate_tags"))]
	pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ListBlogsInput {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1))]
	#[serde(default = "one")]
	pub page: i64,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "nine")]
	pub limit: i64,
	/// Free-text search across title and content.
	pub search: Option<String>,
	/// Exact tag match, case-insensitive.
	pub tag: Option<String>,
	/// Restrict to one author.
	pub author: Option<Uuid>,
}

impl ListBlogsInput {
	pub fn offset(&self) -> i64 {
		(self.page - 1) * self.limit
	}
}

/// A blog row joined with its author and like metadata.
#[derive(Debug, FromRow)]
pub struct BlogRow {
	pub id: Uuid,
	pub title: String,
	pub content: String,
	pub summary: Option<String>,
	pub images: Vec<String>,
	pub is_public: bool,
	pub tags: Vec<String>,
	pub read_time: i32,
	pub views: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub author_id: Uuid,
	pub author_username: String,
	pub author_avatar: Option<String>,
	pub like_count: i64,
	pub liked: bool,
}

/// Public author details embedded in blog responses.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Author {
	pub id: Uuid,
	pub username: String,
	pub avatar: Option<String>,
}

/// A single blog as returned to clients.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Blog {
	pub id: Uuid,
	pub title: String,
	pub content: String,
	pub summary: Option<String>,
	pub images: Vec<String>,
	pub is_public: bool,
	pub tags: Vec<String>,
	/// Estimated minutes to read the content.
	pub read_time: i32,
	/// Number of reads by users other than the author.
	pub views: i64,
	pub author: Author,
	pub like_count: i64,
	/// Whether the requesting user has liked this blog.
	pub liked: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<BlogRow> for Blog {
	fn from(row: BlogRow) -> Self {
		Self {
			id: row.id,
			title: row.title,
			content: row.content,
			summary: row.summary,
			images: row.images,
			is_public: row.is_public,
			tags: row.tags,
			read_time: row.read_time,
			views: row.views,
			author: Author {
				id: row.author_id,
				username: row.author_username,
				avatar: row.author_avatar,
			},
			like_count: row.like_count,
			liked: row.liked,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BlogsResponse {
	pub blogs: Vec<Blog>,
	pub pagination: Pagination,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct LikeResponse {
	/// The new like count.
	pub likes: i64,
	/// Whether the caller is now in the likes set.
	pub liked: bool,
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::{normalize_tags, read_time, CreateBlogInput};

	fn input(title: &str, content: &str) -> CreateBlogInput {
		CreateBlogInput {
			title: title.into(),
			content: content.into(),
			summary: None,
			images: Vec::new(),
			is_public: false,
			tags: Vec::new(),
		}
	}

	#[test]
	fn test_read_time_minimum_is_one() {
		assert_eq!(read_time("this is long enough"), 1);
		assert_eq!(read_time(""), 1);
	}

	#[test]
	fn test_read_time_rounds_up() {
		let two_hundred = vec!["word"; 200].join(" ");

		assert_eq!(read_time(&two_hundred), 1);

		let two_hundred_one = vec!["word"; 201].join(" ");

		assert_eq!(read_time(&two_hundred_one), 2);

		let four_hundred = vec!["word"; 400].join(" ");

		assert_eq!(read_time(&four_hundred), 2);
	}

	#[test]
	fn test_normalize_tags() {
		let tags = normalize_tags(vec![
			" Rust ".into(),
			"rust".into(),
			"WEB".into(),
			"  ".into(),
		]);

		assert_eq!(tags, ["rust", "web"]);
	}

	#[test]
	fn test_short_content_fails_validation() {
		assert!(input("Hello", "short").validate().is_err());
		assert!(input("Hello", "this is long enough").validate().is_ok());
	}

	#[test]
	fn test_title_length_limit() {
		assert!(input(&"t".repeat(200), "this is long enough")
			.validate()
			.is_ok());
		assert!(input(&"t".repeat(201), "this is long enough")
			.validate()
			.is_err());
	}

	#[test]
	fn test_image_urls_must_point_at_images() {
		let mut blog = input("Hello", "this is long enough");

		blog.images = vec!["https://cdn.example.com/a.png".into()];
		assert!(blog.validate().is_ok());

		blog.images = vec!["https://cdn.example.com/a.exe".into()];
		assert!(blog.validate().is_err());

		blog.images = vec!["ftp://cdn.example.com/a.png".into()];
		assert!(blog.validate().is_err());
	}

	#[test]
	fn test_tag_length_limit() {
		let mut blog = input("Hello", "this is long enough");

		blog.tags = vec!["t".repeat(31)];
		assert!(blog.validate().is_err());
	}
}
