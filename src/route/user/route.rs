use aide::transform::TransformOperation;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::{
	extract::{Auth, Json},
	openapi::tag,
	route::auth::model::User,
	Database,
};

use super::{model, Error, RouteError};

pub fn get_user_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get user profile")
		.description("Returns a user's public profile by their unique id.")
		.tag(tag::USER)
}

/// Returns a user's public profile.
pub async fn get_user(
	State(database): State<Database>,
	Path(user_id): Path<Uuid>,
) -> Result<Json<User>, RouteError> {
	let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE id = $1"#)
		.bind(user_id)
		.fetch_optional(&database)
		.await?;

	Ok(Json(user.ok_or(Error::UnknownUser(user_id))?))
}

pub fn update_profile_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Update profile")
		.description("Updates the authenticated user's display name, bio or avatar.")
		.tag(tag::USER)
}

/// Updates the caller's profile. Absent fields keep their current
/// values.
pub async fn update_profile(
	State(database): State<Database>,
	auth: Auth,
	Json(input): Json<model::UpdateProfileInput>,
) -> Result<Json<User>, RouteError> {
	let user = sqlx::query_as::<_, User>(
		r#"
			UPDATE "user"
			SET username = COALESCE($1, username),
				bio = COALESCE($2, bio),
				avatar = COALESCE($3, avatar),
				updated_at = now()
			WHERE id = $4
			RETURNING *
		"#,
	)
	.bind(&input.name)
	.bind(&input.bio)
	.bind(&input.avatar)
	.bind(auth.user.id)
	.fetch_one(&database)
	.await?;

	Ok(Json(user))
}
