use chrono::{DateTime, Utc};
use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Width and length of an image when none is given.
pub const DEFAULT_DIMENSION: f64 = 300.0;

fn default_dimension() -> f64 {
	DEFAULT_DIMENSION
}

/// An image attached to a post.
///
/// Only a reference to the file is stored; serving the file is left to the
/// storage backend.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Image {
	/// The unique identifier of the image.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The post the image belongs to. Deleting the post deletes its images.
	#[model(immutable)]
	pub post_id: i64,
	/// A short description of the image.
	#[validate(length(min = 1, max = 200))]
	pub label: String,
	/// The location of the file in the storage backend, such as `images/cover.png`.
	#[validate(length(min = 1, max = 100))]
	pub file: String,
	/// Whether this is the image shown when the post is previewed.
	#[serde(rename = "default")]
	#[model(default)]
	pub is_default: bool,
	#[validate(range(min = 0.0))]
	#[model(default = "default_dimension")]
	pub width: f64,
	#[validate(range(min = 0.0))]
	#[model(default = "default_dimension")]
	pub length: f64,
	/// The creation time of the image.
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
	/// The last time the image was written.
	#[serde(skip_deserializing)]
	pub updated_at: DateTime<Utc>,
}
