use chrono::{DateTime, Utc};
use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A section of the blog that posts are filed under.
///
/// Names are unique. A post belongs to at most one category.
#[model]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Category {
	/// The unique identifier of the category.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The name of the category.
	#[validate(length(min = 1, max = 100))]
	pub name: String,
	#[validate(length(max = 500))]
	#[model(default)]
	pub description: String,
	/// The creation time of the category.
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
	/// The last time the category was written.
	#[serde(skip_deserializing)]
	pub updated_at: DateTime<Utc>,
}
