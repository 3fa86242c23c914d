use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

/// Partial profile update; absent fields keep their current values.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdateProfileInput {
	/// The display name shown on blogs and profiles.
	#[validate(length(min = 1, max = 100))]
	pub name: Option<String>,
	#[validate(length(max = 500))]
	pub bio: Option<String>,
	pub avatar: Option<String>,
}
