use std::borrow::Cow;

use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod policy;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown blog {0}")]
	UnknownBlog(Uuid),
	#[error("authentication required")]
	LoginRequired,
	#[error("this blog is private")]
	Private,
	#[error("only the author can modify this blog")]
	NotOwner,
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(list_blogs, list_blogs_docs).post_with(create_blog, create_blog_docs),
		)
		.api_route("/my", get_with(my_blogs, my_blogs_docs))
		.api_route(
			"/:id",
			get_with(get_blog, get_blog_docs)
				.put_with(update_blog, update_blog_docs)
				.delete_with(delete_blog, delete_blog_docs),
		)
		.api_route("/:id/like", post_with(toggle_like, toggle_like_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownBlog(..) => StatusCode::NOT_FOUND,
			Self::LoginRequired => StatusCode::UNAUTHORIZED,
			Self::Private | Self::NotOwner => StatusCode::FORBIDDEN,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownBlog(blog) => vec![error::Message {
				content: "unknown_blog".into(),
				field: None,
				details: Some(Cow::Owned({
					let mut map = error::Map::new();
					map.insert("blog".into(), json!(blog));
					map
				})),
			}],
			_ => vec![error::Message {
				content: self.to_string().into(),
				field: None,
				details: None,
			}],
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_my_blogs_require_auth() {
		let app = app(database());

		let response = app.get("/api/blogs/my").await;

		assert_eq!(response.status_code(), 401);
	}

	#[tokio::test]
	async fn test_create_requires_auth() {
		let app = app(database());

		let response = app
			.post("/api/blogs")
			.json(&json!({
				"title": "Hello",
				"content": "this is long enough",
			}))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[tokio::test]
	async fn test_like_requires_auth() {
		let app = app(database());

		let response = app
			.post("/api/blogs/7b62c9a9-5f85-4c13-8a0a-2b3edd1b4f8d/like")
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[tokio::test]
	async fn test_list_rejects_zero_page() {
		let app = app(database());

		let response = app.get("/api/blogs").add_query_param("page", 0).await;

		assert_eq!(response.status_code(), 400);

		let body = response.json::<serde_json::Value>();

		assert_eq!(body["success"], false);
		assert_eq!(body["errors"][0]["field"], "page");
	}

	#[tokio::test]
	async fn test_list_rejects_oversized_limit() {
		let app = app(database());

		let response = app.get("/api/blogs").add_query_param("limit", 1000).await;

		assert_eq!(response.status_code(), 400);
	}
}
