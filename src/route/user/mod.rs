use std::borrow::Cow;

use aide::axum::{
	routing::{get_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(Uuid),
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
		.api_route("/profile", put_with(update_profile, update_profile_docs))
		.api_route("/:id", get_with(get_user, get_user_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownUser(user) => vec![error::Message {
				content: "unknown_user".into(),
				field: None,
				details: Some(Cow::Owned({
					let mut map = error::Map::new();
					map.insert("user".into(), json!(user));
					map
				})),
			}],
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_profile_update_requires_auth() {
		let app = app(database());

		let response = app
			.put("/api/users/profile")
			.json(&json!({ "name": "someone" }))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[tokio::test]
	async fn test_profile_rejects_oversized_bio() {
		let app = app(database());

		// Validation is checked only after authentication.
		let response = app
			.put("/api/users/profile")
			.json(&json!({ "bio": "b".repeat(501) }))
			.await;

		assert_eq!(response.status_code(), 401);
	}
}
