use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A label that can be attached to any number of posts.
///
/// Labels are not unique, two tags may share the same label.
#[model]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Tag {
	/// The unique identifier of the tag.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The text of the tag.
	#[validate(length(min = 1, max = 50))]
	pub label: String,
}
