use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::Serialize;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single client-facing error message.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'e> {
	pub content: Cow<'e, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'e, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'e, Map>>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse<'e> {
	pub success: bool,
	pub errors: Vec<Message<'e>>,
}

/// The client-facing shape of an error.
///
/// Implementors choose a status code and the list of messages sent to
/// the client; anything sensitive stays out of [`ErrorShape::errors`].
pub trait ErrorShape {
	fn status(&self) -> StatusCode;
	fn errors(&self) -> Vec<Message<'_>>;

	fn response(&self) -> Response<Body> {
		(
			self.status(),
			axum::Json(ErrorResponse {
				success: false,
				errors: self.errors(),
			}),
		)
			.into_response()
	}
}

/// An error that can occur in any route, raised by the extractors.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("rate limit exceeded")]
	RateLimit(tower_governor::GovernorError),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Query(..) => StatusCode::BAD_REQUEST,
			Self::RateLimit(..) => StatusCode::TOO_MANY_REQUESTS,
			Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors.iter().map(move |error| Message {
						content: error.to_string().into(),
						field: Some(field.to_string().into()),
						details: None,
					})
				})
				.collect(),
			Self::Json(error) => vec![Message {
				content: error.to_string().into(),
				field: None,
				details: None,
			}],
			Self::Query(error) => vec![Message {
				content: error.to_string().into(),
				field: None,
				details: None,
			}],
			Self::RateLimit(..) => vec![Message {
				content: "rate limit exceeded".into(),
				field: None,
				details: None,
			}],
			// Internal detail is logged, never serialized.
			Self::Database(..) => Vec::new(),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		if let Self::Database(ref error) = self {
			tracing::error!(%error, "database error");
		}

		self.response()
	}
}

/// An error local to one route module, alongside the shared [`AppError`].
///
/// Route handlers return `Result<_, RouteError<Error>>` so that `?`
/// works on both their own error enum and anything the storage layer
/// raises.
#[derive(Debug)]
pub enum RouteError<E> {
	App(AppError),
	Route(E),
}

impl<E> From<AppError> for RouteError<E> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<E> From<sqlx::Error> for RouteError<E> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<E: ErrorShape> ErrorShape for RouteError<E> {
	fn status(&self) -> StatusCode {
		match self {
			Self::App(error) => error.status(),
			Self::Route(error) => error.status(),
		}
	}

	fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::App(error) => error.errors(),
			Self::Route(error) => error.errors(),
		}
	}
}

impl<E: ErrorShape + std::fmt::Debug> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => error.response(),
		}
	}
}

impl<E> aide::OperationOutput for RouteError<E> {
	type Inner = ();
}

#[cfg(test)]
mod test {
	use axum::http::StatusCode;

	use super::{AppError, ErrorShape};

	#[test]
	fn test_validation_errors_include_fields() {
		use validator::Validate;

		#[derive(Validate)]
		struct Input {
			#[validate(length(min = 10))]
			content: String,
		}

		let errors = Input {
			content: "short".into(),
		}
		.validate()
		.unwrap_err();

		let error = AppError::Validation(errors);

		assert_eq!(error.status(), StatusCode::BAD_REQUEST);

		let messages = error.errors();

		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].field.as_deref(), Some("content"));
	}

	#[test]
	fn test_database_detail_is_suppressed() {
		let error = AppError::Database(sqlx::Error::PoolClosed);

		assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert!(error.errors().is_empty());
	}
}
