use std::borrow::Cow;

use schemars::JsonSchema;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::model::{PostFilter, PostStatus};

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
pub(crate) fn one() -> i64 {
	1
}

#[inline]
pub(crate) fn ten() -> i64 {
	10
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1))]
	#[serde(default = "one")]
	pub page: i64,
	/// The number of items to return per page, at most 100. Some listings
	/// allow less.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "ten")]
	pub size: i64,
}

impl Paginate {
	/// Narrows the page size for listings that return fewer items, rejecting
	/// `size` the same way the range check does.
	pub fn at_most(self, max: i64) -> Result<Self, ValidationErrors> {
		if self.size <= max {
			return Ok(self);
		}

		let mut error = ValidationError::new("range");
		error.add_param(Cow::from("min"), &1);
		error.add_param(Cow::from("max"), &max);

		let mut errors = ValidationErrors::new();
		errors.add("size", error);

		Err(errors)
	}

	pub fn offset(&self) -> i64 {
		(self.page - 1).saturating_mul(self.size)
	}

	pub fn limit(&self) -> i64 {
		self.size
	}
}

/// Optional filters shared by the post listings.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct PostFilterInput {
	/// Only return posts with this status.
	pub status: Option<PostStatus>,
	/// Only return posts written by this user.
	pub author: Option<i64>,
	/// Only return posts filed under this category.
	pub category: Option<i64>,
	/// Only return posts carrying this tag.
	pub tag: Option<i64>,
}

impl From<PostFilterInput> for PostFilter {
	fn from(input: PostFilterInput) -> Self {
		Self {
			status: input.status,
			author_id: input.author,
			category_id: input.category,
			tag_id: input.tag,
		}
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	/// The unique identifier of the entity.
	#[validate(range(min = 1))]
	pub id: i64,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct UsernameInput {
	/// The username of the user.
	#[validate(length(min = 1, max = 150))]
	pub username: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct NameInput {
	/// The name (or label) to look up.
	#[validate(length(min = 1, max = 100))]
	pub name: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct PostTagInput {
	/// The unique identifier of the post.
	#[validate(range(min = 1))]
	pub id: i64,
	/// The unique identifier of the tag.
	#[validate(range(min = 1))]
	pub tag_id: i64,
}
