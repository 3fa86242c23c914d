use std::sync::Arc;

use aide::{axum::IntoApiResponse, transform::TransformOperation};
use axum::{
	extract::State,
	response::{IntoResponse, Redirect},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::{
	config::Config,
	extract::{Auth, Json},
	openapi::tag,
	token, AppState, Database,
};

use super::{google, model};

pub fn sign_in_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Sign in with Google")
		.description("Redirects to the identity provider's consent screen.")
		.tag(tag::AUTH)
}

/// Redirects to the identity provider's consent screen.
pub async fn sign_in(State(config): State<Arc<Config>>) -> impl IntoApiResponse {
	Redirect::to(&google::authorize_url(&config.google)).into_response()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CallbackQuery {
	pub code: Option<String>,
}

pub fn sign_in_callback_docs(op: TransformOperation) -> TransformOperation {
	op.summary("OAuth callback")
		.description(
			"Exchanges the provider's authorization code for a profile, issues \
			a bearer token and redirects back into the client.",
		)
		.tag(tag::AUTH)
}

/// Handles the provider callback: exchanges the code for a profile,
/// resolves it to a user record, issues a bearer token and redirects
/// back into the client.
pub async fn sign_in_callback(
	State(state): State<AppState>,
	axum::extract::Query(query): axum::extract::Query<CallbackQuery>,
) -> impl IntoApiResponse {
	let frontend = &state.config.frontend_url;

	let Some(code) = query.code else {
		return Redirect::to(&format!("{frontend}/login?error=auth_failed")).into_response();
	};

	let profile = match google::fetch_profile(&state.http, &state.config.google, &code).await {
		Ok(profile) => profile,
		Err(error) => {
			tracing::warn!(%error, "code exchange failed");
			return Redirect::to(&format!("{frontend}/login?error=auth_failed")).into_response();
		}
	};

	let user = match resolve_user(&state.database, &profile).await {
		Ok(user) => user,
		Err(error) => {
			tracing::error!(%error, "failed to resolve user record");
			return Redirect::to(frontend).into_response();
		}
	};

	match token::issue(&state.config.jwt_secret, user.id) {
		Ok(token) => Redirect::to(&format!("{frontend}/auth/callback?token={token}")).into_response(),
		Err(error) => {
			tracing::error!(%error, "failed to issue token");
			Redirect::to(frontend).into_response()
		}
	}
}

/// Finds the user record for a verified external profile.
///
/// Prefers the provider id, then links an existing account with the
/// same email (backfilling a missing avatar), then creates a new user.
async fn resolve_user(
	database: &Database,
	profile: &google::Profile,
) -> Result<model::User, sqlx::Error> {
	if let Some(user) =
		sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE google_id = $1"#)
			.bind(&profile.id)
			.fetch_optional(database)
			.await?
	{
		return Ok(user);
	}

	if let Some(user) = sqlx::query_as::<_, model::User>(
		r#"
			UPDATE "user"
			SET google_id = $1, avatar = COALESCE(avatar, $2), updated_at = now()
			WHERE email = $3
			RETURNING *
		"#,
	)
	.bind(&profile.id)
	.bind(&profile.picture)
	.bind(&profile.email)
	.fetch_optional(database)
	.await?
	{
		return Ok(user);
	}

	sqlx::query_as::<_, model::User>(
		r#"
			INSERT INTO "user" (google_id, email, username, avatar)
			VALUES ($1, $2, $3, $4)
			RETURNING *
		"#,
	)
	.bind(&profile.id)
	.bind(&profile.email)
	.bind(&profile.name)
	.bind(&profile.picture)
	.fetch_one(database)
	.await
}

pub fn get_me_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Current user")
		.description("Returns the authenticated user.")
		.tag(tag::AUTH)
}

/// Returns the authenticated user.
pub async fn get_me(auth: Auth) -> Json<model::MeResponse> {
	Json(model::MeResponse { user: auth.user })
}

pub fn logout_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Log out")
		.description("Bearer tokens are stateless; the client discards its copy.")
		.tag(tag::AUTH)
}

/// Acknowledges a sign-out. There is no server-side session to clear.
pub async fn logout() -> Json<serde_json::Value> {
	Json(json!({ "message": "Logged out successfully" }))
}
