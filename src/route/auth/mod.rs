use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod google;
pub mod model;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("authentication required")]
	MissingToken,
	#[error("invalid authentication token")]
	InvalidToken,
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
		.api_route("/google", get_with(sign_in, sign_in_docs))
		.api_route(
			"/google/callback",
			get_with(sign_in_callback, sign_in_callback_docs),
		)
		.api_route("/me", get_with(get_me, get_me_docs))
		.api_route("/logout", post_with(logout, logout_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::MissingToken | Self::InvalidToken => StatusCode::UNAUTHORIZED,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		vec![error::Message {
			content: self.to_string().into(),
			field: None,
			details: None,
		}]
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_me_requires_token() {
		let app = app(database());

		let response = app.get("/auth/me").await;

		assert_eq!(response.status_code(), 401);
		assert_eq!(
			response.json::<serde_json::Value>()["errors"][0]["content"],
			"authentication required"
		);
	}

	#[tokio::test]
	async fn test_me_rejects_garbage_token() {
		let app = app(database());

		let response = app
			.get("/auth/me")
			.add_header(
				axum::http::header::AUTHORIZATION,
				axum::http::HeaderValue::from_static("Bearer not-a-token"),
			)
			.await;

		assert_eq!(response.status_code(), 401);
		assert_eq!(
			response.json::<serde_json::Value>()["errors"][0]["content"],
			"invalid authentication token"
		);
	}

	#[tokio::test]
	async fn test_google_redirects_to_provider() {
		let app = app(database());

		let response = app.get("/auth/google").await;

		assert_eq!(response.status_code(), 303);

		let location = response.header("location");
		let location = location.to_str().unwrap();

		assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth"));
		assert!(location.contains("client_id=test-client"));
	}

	#[tokio::test]
	async fn test_callback_without_code_redirects_to_login() {
		let app = app(database());

		let response = app.get("/auth/google/callback").await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(
			response.header("location").to_str().unwrap(),
			"http://localhost:3000/login?error=auth_failed"
		);
	}

	#[tokio::test]
	async fn test_logout() {
		let app = app(database());

		let response = app.post("/auth/logout").await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(
			response.json::<serde_json::Value>()["message"],
			"Logged out successfully"
		);
	}
}
