use schemars::JsonSchema;
use serde::Serialize;

pub use crate::{
	model::{
		Category, CreateCategory, CreateImage, CreatePost, CreateTag, CreateUser, Image, Post,
		PostStatus, Tag, UpdateCategory, UpdateImage, UpdatePost, UpdateTag, UpdateUser, User,
	},
	route::model::{IdInput, NameInput, Paginate, PostFilterInput, PostTagInput, UsernameInput},
};

/// The landing page of the administration interface.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Index {
	/// The title of the administration site.
	pub title: String,
	/// The models that can be managed, and where.
	pub models: Vec<ModelLink>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ModelLink {
	pub name: String,
	pub path: String,
}
