//! Persistence for the blog entities.
//!
//! Handlers only see the [`Store`] trait. [`PgStore`] is used when a database
//! is configured, [`MemoryStore`] otherwise (and in tests).

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::model::{
	Category, CreateCategory, CreateImage, CreatePost, CreateTag, CreateUser, Image, Post,
	PostFilter, Tag, UpdateCategory, UpdateImage, UpdatePost, UpdateTag, UpdateUser, User,
};

/// An error returned by a [`Store`].
///
/// Missing references are reported with the id that could not be found so
/// the caller can point the client at it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("unknown user {0}")]
	UnknownUser(i64),
	#[error("unknown post {0}")]
	UnknownPost(i64),
	#[error("unknown tag {0}")]
	UnknownTag(i64),
	#[error("unknown category {0}")]
	UnknownCategory(i64),
	#[error("username already taken")]
	UsernameTaken,
	#[error("category name already taken")]
	CategoryTaken,
}

/// Storage for users, posts, categories, tags and images.
///
/// Methods returning `Option` or `bool` report a missing target through the
/// return value rather than an error. Every write to a post, category or
/// image refreshes its `updated_at`.
#[axum::async_trait]
pub trait Store: Send + Sync {
	async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>, Error>;
	async fn get_user(&self, id: i64) -> Result<Option<User>, Error>;
	async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, Error>;
	async fn create_user(&self, input: CreateUser) -> Result<User, Error>;
	async fn update_user(&self, id: i64, input: UpdateUser) -> Result<Option<User>, Error>;
	/// Deletes the user along with their posts.
	async fn delete_user(&self, id: i64) -> Result<bool, Error>;

	/// Lists posts matching the filter, newest first.
	async fn list_posts(
		&self,
		filter: PostFilter,
		limit: i64,
		offset: i64,
	) -> Result<Vec<Post>, Error>;
	async fn get_post(&self, id: i64) -> Result<Option<Post>, Error>;
	async fn create_post(&self, input: CreatePost) -> Result<Post, Error>;
	/// Applies the changes present in `input`.
	///
	/// Nothing is written when a referenced user or category does not exist.
	async fn update_post(&self, id: i64, input: UpdatePost) -> Result<Option<Post>, Error>;
	/// Deletes the post along with its images and tag links.
	async fn delete_post(&self, id: i64) -> Result<bool, Error>;

	async fn list_categories(&self, limit: i64, offset: i64) -> Result<Vec<Category>, Error>;
	async fn get_category(&self, id: i64) -> Result<Option<Category>, Error>;
	async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, Error>;
	async fn create_category(&self, input: CreateCategory) -> Result<Category, Error>;
	async fn update_category(
		&self,
		id: i64,
		input: UpdateCategory,
	) -> Result<Option<Category>, Error>;
	/// Deletes the category. Its posts are kept and lose their category.
	async fn delete_category(&self, id: i64) -> Result<bool, Error>;

	async fn list_tags(&self, limit: i64, offset: i64) -> Result<Vec<Tag>, Error>;
	async fn get_tag(&self, id: i64) -> Result<Option<Tag>, Error>;
	/// Returns every tag with this exact label, oldest first.
	async fn find_tags(&self, label: &str) -> Result<Vec<Tag>, Error>;
	async fn create_tag(&self, input: CreateTag) -> Result<Tag, Error>;
	async fn update_tag(&self, id: i64, input: UpdateTag) -> Result<Option<Tag>, Error>;
	async fn delete_tag(&self, id: i64) -> Result<bool, Error>;

	async fn post_tags(&self, post_id: i64) -> Result<Vec<Tag>, Error>;
	/// Attaches a tag to a post. Attaching the same tag twice is a no-op.
	async fn add_post_tag(&self, post_id: i64, tag_id: i64) -> Result<(), Error>;
	async fn remove_post_tag(&self, post_id: i64, tag_id: i64) -> Result<bool, Error>;

	async fn list_images(&self, limit: i64, offset: i64) -> Result<Vec<Image>, Error>;
	async fn post_images(&self, post_id: i64) -> Result<Vec<Image>, Error>;
	async fn create_image(&self, input: CreateImage) -> Result<Image, Error>;
	async fn update_image(&self, id: i64, input: UpdateImage) -> Result<Option<Image>, Error>;
	/// Deletes the image. The post it belongs to is left untouched.
	async fn delete_image(&self, id: i64) -> Result<bool, Error>;
}
