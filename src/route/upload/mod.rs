use aide::axum::{
	routing::{delete_with, post_with},
	ApiRouter,
};
use axum::{extract::DefaultBodyLimit, http::StatusCode};

use crate::{error, images, AppState};

pub mod route;

/// Per-file size cap, matching the image service's practical limits.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
/// Maximum number of files accepted by the batch endpoint.
pub const MAX_FILES: usize = 5;
/// Request body cap: a full batch plus multipart framing.
const MAX_BODY_BYTES: usize = (MAX_FILES + 1) * MAX_FILE_BYTES;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("no image file provided")]
	NoFile,
	#[error("only image files are allowed")]
	NotAnImage,
	#[error("image exceeds the {} MiB limit", MAX_FILE_BYTES / 1024 / 1024)]
	TooLarge,
	#[error("at most {MAX_FILES} images per request")]
	TooMany,
	#[error("malformed multipart body: {0}")]
	Multipart(#[from] axum::extract::multipart::MultipartError),
	#[error(transparent)]
	Service(#[from] images::Error),
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
		.api_route("/image", post_with(upload_image, upload_image_docs))
		.api_route("/images", post_with(upload_images, upload_images_docs))
		.api_route("/image/:id", delete_with(delete_image, delete_image_docs))
		.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::NoFile | Self::NotAnImage | Self::TooLarge | Self::TooMany
			| Self::Multipart(..) => StatusCode::BAD_REQUEST,
			Self::Service(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			// Upstream detail is logged, never serialized.
			Self::Service(..) => Vec::new(),
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
	async fn test_upload_requires_auth() {
		let app = app(database());

		let response = app.post("/api/upload/image").await;

		assert_eq!(response.status_code(), 401);
	}

	#[tokio::test]
	async fn test_delete_requires_auth() {
		let app = app(database());

		let response = app.delete("/api/upload/image/blog-app%2Fsome-id").await;

		assert_eq!(response.status_code(), 401);
	}
}
