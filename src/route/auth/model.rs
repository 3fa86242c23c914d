use schemars::JsonSchema;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A single user.
#[derive(Debug, Clone, Serialize, JsonSchema, FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The id assigned by the external identity provider. Never
	/// serialized to clients.
	#[serde(skip_serializing)]
	pub google_id: Option<String>,
	/// The user's primary email address.
	pub email: String,
	/// The display name shown on blogs and profiles.
	pub username: String,
	/// Avatar URL, usually seeded from the identity provider.
	pub avatar: Option<String>,
	pub bio: Option<String>,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MeResponse {
	pub user: User,
}
