use std::fmt;

use chrono::{DateTime, Utc};
use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Image, Tag};

/// The publication lifecycle of a post.
///
/// A post starts out initialized, becomes visible once published and is
/// eventually archived. Any status can be reached from any other, so a
/// published post can be taken back to initialized and an archived one
/// published again. The stored representation is a short code.
#[derive(
	Debug,
	Clone,
	Copy,
	Default,
	PartialEq,
	Eq,
	Hash,
	Deserialize,
	Serialize,
	JsonSchema,
	sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "post_status")]
pub enum PostStatus {
	#[default]
	#[sqlx(rename = "init")]
	Initialized,
	#[sqlx(rename = "pub")]
	Published,
	#[sqlx(rename = "arch")]
	Archived,
}

impl PostStatus {
	pub fn label(self) -> &'static str {
		match self {
			Self::Initialized => "initialized",
			Self::Published => "published",
			Self::Archived => "archived",
		}
	}
}

impl fmt::Display for PostStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// A single post, written by a user.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The user that wrote the post. Deleting the user deletes their posts.
	pub author_id: i64,
	/// The category the post is filed under. Deleting the category keeps the post.
	#[model(default)]
	pub category_id: Option<i64>,
	/// The title of the post.
	#[validate(length(min = 1, max = 200))]
	pub title: String,
	/// A short summary shown in listings.
	#[validate(length(max = 500))]
	pub description: String,
	/// The body of the post.
	pub text: String,
	/// The publication status of the post.
	#[model(default)]
	pub status: PostStatus,
	/// The first time the post was published.
	#[serde(skip_deserializing)]
	pub published_at: Option<DateTime<Utc>>,
	/// The creation time of the post.
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
	/// The last time the post was written.
	#[serde(skip_deserializing)]
	pub updated_at: DateTime<Utc>,
}

impl Post {
	/// Moves the post to `next`, stamping `published_at` on first publication.
	///
	/// `published_at` is never cleared, so a post that is unpublished and
	/// published again keeps its original publication time.
	pub fn set_status(&mut self, next: PostStatus, now: DateTime<Utc>) {
		self.status = next;

		if next == PostStatus::Published && self.published_at.is_none() {
			self.published_at = Some(now);
		}
	}
}

impl UpdatePost {
	/// An update that only moves the post to another status.
	pub fn status_change(status: PostStatus) -> Self {
		Self {
			author_id: None,
			category_id: None,
			title: None,
			description: None,
			text: None,
			status: Some(status),
		}
	}
}

/// A post along with its tags and images.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostDetail {
	#[serde(flatten)]
	pub post: Post,
	pub tags: Vec<Tag>,
	pub images: Vec<Image>,
}

/// Narrows a post listing. Every filter is optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
	pub status: Option<PostStatus>,
	pub author_id: Option<i64>,
	pub category_id: Option<i64>,
	pub tag_id: Option<i64>,
}

impl PostFilter {
	pub fn matches(&self, post: &Post, has_tag: impl Fn(i64) -> bool) -> bool {
		self.status.map_or(true, |status| post.status == status)
			&& self.author_id.map_or(true, |author| post.author_id == author)
			&& self
				.category_id
				.map_or(true, |category| post.category_id == Some(category))
			&& self.tag_id.map_or(true, has_tag)
	}
}
