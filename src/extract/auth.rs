use std::sync::Arc;

use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use uuid::Uuid;

use crate::{
	config::Config,
	openapi::SECURITY_SCHEME_BEARER,
	route::auth::{self, model::User},
	token, Database,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// Extracts the authenticated user from a bearer token.
///
/// The token's signature and expiry are checked before the subject is
/// resolved against the user table. A missing header, a token that
/// fails verification and an unknown subject all reject with
/// [`auth::Error`].
///
/// ```rust
/// async fn route(auth: Auth) {
///   println!("{:?}", auth.user);
/// }
/// ```
#[derive(Debug)]
pub struct Auth {
	pub user: User,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Auth
where
	Database: FromRef<S>,
	Arc<Config>: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = auth::RouteError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let header = parts
			.headers
			.get(header::AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.ok_or(auth::Error::MissingToken)?;

		let token = header
			.strip_prefix(AUTHORIZATION_PREFIX)
			.ok_or(auth::Error::MissingToken)?;

		let config = Arc::<Config>::from_ref(state);
		let claims =
			token::verify(&config.jwt_secret, token).map_err(|_| auth::Error::InvalidToken)?;

		let database = Database::from_ref(state);
		let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE id = $1"#)
			.bind(claims.sub)
			.fetch_optional(&database)
			.await?;

		Ok(Self {
			user: user.ok_or(auth::Error::InvalidToken)?,
		})
	}
}

impl OperationInput for Auth {
	/// Adds the bearer-token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}

/// Like [`Auth`], but a missing or invalid credential silently yields
/// an anonymous request instead of rejecting it.
#[derive(Debug)]
pub struct MaybeAuth(pub Option<User>);

impl MaybeAuth {
	pub fn user_id(&self) -> Option<Uuid> {
		self.0.as_ref().map(|user| user.id)
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeAuth
where
	Database: FromRef<S>,
	Arc<Config>: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = std::convert::Infallible;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		Ok(Self(
			Auth::from_request_parts(parts, state)
				.await
				.ok()
				.map(|auth| auth.user),
		))
	}
}

impl OperationInput for MaybeAuth {}
