use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username
		.chars()
		.any(|c| !(c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')))
	{
		return Err(ValidationError::new("username_characters"));
	}

	Ok(())
}

/// A single author.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The name displayed next to the user's posts.
	#[validate(length(min = 3, max = 150), custom(function = "validate_username"))]
	pub username: String,
	/// The user's contact address.
	#[validate(email)]
	pub email: String,
	#[validate(length(max = 150))]
	#[model(default)]
	pub first_name: String,
	#[validate(length(max = 150))]
	#[model(default)]
	pub last_name: String,
	/// The creation time of the user.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
}
