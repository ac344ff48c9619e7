use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query},
	openapi::tag,
	Database, Site,
};

use super::{model, Error, RouteError};

/// Models listed on the index, with their path below the admin root.
const MODELS: [(&str, &str); 5] = [
	("Users", "/users"),
	("Posts", "/posts"),
	("Categories", "/categories"),
	("Tags", "/tags"),
	("Images", "/images"),
];

/// Admin index
/// Returns the site title and the models that can be managed.
#[route(tag = tag::ADMIN)]
pub async fn index(State(site): State<Site>) -> Json<model::Index> {
	let prefix = site.path.prefix();

	Json(model::Index {
		title: site.title.clone(),
		models: MODELS
			.into_iter()
			.map(|(name, path)| model::ModelLink {
				name: name.into(),
				path: format!("{prefix}{path}"),
			})
			.collect(),
	})
}

/// List users
/// Returns a paginated list of users, oldest first.
#[route(tag = tag::ADMIN)]
pub async fn list_users(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::User>>, RouteError> {
	let users = database
		.list_users(paginate.limit(), paginate.offset())
		.await?;

	Ok(Json(users))
}

/// Get user
/// Returns a single user by its unique id.
#[route(tag = tag::ADMIN)]
pub async fn get_user(
	State(database): State<Database>,
	Path(user): Path<model::IdInput>,
) -> Result<Json<model::User>, RouteError> {
	let user = database
		.get_user(user.id)
		.await?
		.ok_or(Error::UnknownUser(user.id))?;

	Ok(Json(user))
}

/// Find user
/// Returns a single user by its username.
#[route(tag = tag::ADMIN)]
pub async fn get_user_by_username(
	State(database): State<Database>,
	Path(input): Path<model::UsernameInput>,
) -> Result<Json<model::User>, RouteError> {
	match database.get_user_by_username(&input.username).await? {
		Some(user) => Ok(Json(user)),
		None => Err(Error::UnknownUsername(input.username).into()),
	}
}

/// Create user
/// Creates a new user. Usernames are unique.
#[route(tag = tag::ADMIN)]
pub async fn create_user(
	State(database): State<Database>,
	Json(input): Json<model::CreateUser>,
) -> Result<Json<model::User>, RouteError> {
	Ok(Json(database.create_user(input).await?))
}

/// Update user
/// Updates an existing user by its unique id.
#[route(tag = tag::ADMIN)]
pub async fn update_user(
	State(database): State<Database>,
	Path(user): Path<model::IdInput>,
	Json(input): Json<model::UpdateUser>,
) -> Result<Json<model::User>, RouteError> {
	let user = database
		.update_user(user.id, input)
		.await?
		.ok_or(Error::UnknownUser(user.id))?;

	Ok(Json(user))
}

/// Delete user
/// Deletes an existing user along with their posts. This action is irreversible.
#[route(tag = tag::ADMIN)]
pub async fn delete_user(
	State(database): State<Database>,
	Path(user): Path<model::IdInput>,
) -> Result<(), RouteError> {
	if !database.delete_user(user.id).await? {
		return Err(Error::UnknownUser(user.id).into());
	}

	Ok(())
}

/// List posts
/// Returns a paginated list of posts in every status, newest first.
#[route(tag = tag::ADMIN)]
pub async fn list_posts(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
	Query(filter): Query<model::PostFilterInput>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	let posts = database
		.list_posts(filter.into(), paginate.limit(), paginate.offset())
		.await?;

	Ok(Json(posts))
}

/// Get post
/// Returns a single post by its unique id.
#[route(tag = tag::ADMIN)]
pub async fn get_post(
	State(database): State<Database>,
	Path(post): Path<model::IdInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post = database
		.get_post(post.id)
		.await?
		.ok_or(Error::UnknownPost(post.id))?;

	Ok(Json(post))
}

/// Create post
/// Creates a new post. Posts start out initialized unless a status is given.
#[route(tag = tag::ADMIN)]
pub async fn create_post(
	State(database): State<Database>,
	Json(input): Json<model::CreatePost>,
) -> Result<Json<model::Post>, RouteError> {
	Ok(Json(database.create_post(input).await?))
}

/// Update post
/// Updates an existing post by its unique id.
///
/// The status can be set to any value. `published_at` is stamped the first
/// time the post is published and kept afterwards.
#[route(tag = tag::ADMIN)]
pub async fn update_post(
	State(database): State<Database>,
	Path(post): Path<model::IdInput>,
	Json(input): Json<model::UpdatePost>,
) -> Result<Json<model::Post>, RouteError> {
	let post = database
		.update_post(post.id, input)
		.await?
		.ok_or(Error::UnknownPost(post.id))?;

	Ok(Json(post))
}

async fn change_status(
	database: &Database,
	id: i64,
	status: model::PostStatus,
) -> Result<model::Post, RouteError> {
	let post = database
		.update_post(id, model::UpdatePost::status_change(status))
		.await?
		.ok_or(Error::UnknownPost(id))?;

	tracing::info!(post = id, %status, "post status changed");

	Ok(post)
}

/// Publish post
/// Moves a post to published.
#[route(tag = tag::ADMIN)]
pub async fn publish_post(
	State(database): State<Database>,
	Path(post): Path<model::IdInput>,
) -> Result<Json<model::Post>, RouteError> {
	Ok(Json(
		change_status(&database, post.id, model::PostStatus::Published).await?,
	))
}

/// Unpublish post
/// Takes a post back to initialized. Its first publication time is kept.
#[route(tag = tag::ADMIN)]
pub async fn unpublish_post(
	State(database): State<Database>,
	Path(post): Path<model::IdInput>,
) -> Result<Json<model::Post>, RouteError> {
	Ok(Json(
		change_status(&database, post.id, model::PostStatus::Initialized).await?,
	))
}

/// Archive post
/// Moves a post to archived. It can be published again later.
#[route(tag = tag::ADMIN)]
pub async fn archive_post(
	State(database): State<Database>,
	Path(post): Path<model::IdInput>,
) -> Result<Json<model::Post>, RouteError> {
	Ok(Json(
		change_status(&database, post.id, model::PostStatus::Archived).await?,
	))
}

/// Delete post
/// Deletes an existing post along with its images. This action is irreversible.
#[route(tag = tag::ADMIN)]
pub async fn delete_post(
	State(database): State<Database>,
	Path(post): Path<model::IdInput>,
) -> Result<(), RouteError> {
	if !database.delete_post(post.id).await? {
		return Err(Error::UnknownPost(post.id).into());
	}

	Ok(())
}

/// List post tags
/// Returns the tags attached to a post.
#[route(tag = tag::ADMIN)]
pub async fn list_post_tags(
	State(database): State<Database>,
	Path(post): Path<model::IdInput>,
) -> Result<Json<Vec<model::Tag>>, RouteError> {
	if database.get_post(post.id).await?.is_none() {
		return Err(Error::UnknownPost(post.id).into());
	}

	Ok(Json(database.post_tags(post.id).await?))
}

/// Attach tag
/// Attaches a tag to a post, returning the post's tags. Attaching a tag twice has no effect.
#[route(tag = tag::ADMIN)]
pub async fn add_post_tag(
	State(database): State<Database>,
	Path(input): Path<model::PostTagInput>,
) -> Result<Json<Vec<model::Tag>>, RouteError> {
	database.add_post_tag(input.id, input.tag_id).await?;

	Ok(Json(database.post_tags(input.id).await?))
}

/// Detach tag
/// Removes a tag from a post. The tag itself is kept.
#[route(tag = tag::ADMIN)]
pub async fn remove_post_tag(
	State(database): State<Database>,
	Path(input): Path<model::PostTagInput>,
) -> Result<(), RouteError> {
	if !database.remove_post_tag(input.id, input.tag_id).await? {
		return Err(Error::TagNotAttached {
			post: input.id,
			tag: input.tag_id,
		}
		.into());
	}

	Ok(())
}

/// List post images
/// Returns the images of a post, the default image first.
#[route(tag = tag::ADMIN)]
pub async fn list_post_images(
	State(database): State<Database>,
	Path(post): Path<model::IdInput>,
) -> Result<Json<Vec<model::Image>>, RouteError> {
	if database.get_post(post.id).await?.is_none() {
		return Err(Error::UnknownPost(post.id).into());
	}

	Ok(Json(database.post_images(post.id).await?))
}

/// List categories
/// Returns a paginated list of categories, ordered by name.
#[route(tag = tag::ADMIN)]
pub async fn list_categories(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::Category>>, RouteError> {
	let categories = database
		.list_categories(paginate.limit(), paginate.offset())
		.await?;

	Ok(Json(categories))
}

/// Get category
/// Returns a single category by its unique id.
#[route(tag = tag::ADMIN)]
pub async fn get_category(
	State(database): State<Database>,
	Path(category): Path<model::IdInput>,
) -> Result<Json<model::Category>, RouteError> {
	let category = database
		.get_category(category.id)
		.await?
		.ok_or(Error::UnknownCategory(category.id))?;

	Ok(Json(category))
}

/// Find category
/// Returns a single category by its name.
#[route(tag = tag::ADMIN)]
pub async fn get_category_by_name(
	State(database): State<Database>,
	Path(input): Path<model::NameInput>,
) -> Result<Json<model::Category>, RouteError> {
	match database.get_category_by_name(&input.name).await? {
		Some(category) => Ok(Json(category)),
		None => Err(Error::UnknownCategoryName(input.name).into()),
	}
}

/// Create category
/// Creates a new category. Names are unique.
#[route(tag = tag::ADMIN)]
pub async fn create_category(
	State(database): State<Database>,
	Json(input): Json<model::CreateCategory>,
) -> Result<Json<model::Category>, RouteError> {
	Ok(Json(database.create_category(input).await?))
}

/// Update category
/// Updates an existing category by its unique id.
#[route(tag = tag::ADMIN)]
pub async fn update_category(
	State(database): State<Database>,
	Path(category): Path<model::IdInput>,
	Json(input): Json<model::UpdateCategory>,
) -> Result<Json<model::Category>, RouteError> {
	let category = database
		.update_category(category.id, input)
		.await?
		.ok_or(Error::UnknownCategory(category.id))?;

	Ok(Json(category))
}

/// Delete category
/// Deletes an existing category. Its posts are kept without a category.
#[route(tag = tag::ADMIN)]
pub async fn delete_category(
	State(database): State<Database>,
	Path(category): Path<model::IdInput>,
) -> Result<(), RouteError> {
	if !database.delete_category(category.id).await? {
		return Err(Error::UnknownCategory(category.id).into());
	}

	tracing::info!(category = category.id, "category deleted");

	Ok(())
}

/// List tags
/// Returns a paginated list of tags, ordered by label.
#[route(tag = tag::ADMIN)]
pub async fn list_tags(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::Tag>>, RouteError> {
	let tags = database
		.list_tags(paginate.limit(), paginate.offset())
		.await?;

	Ok(Json(tags))
}

/// Get tag
/// Returns a single tag by its unique id.
#[route(tag = tag::ADMIN)]
pub async fn get_tag(
	State(database): State<Database>,
	Path(tag): Path<model::IdInput>,
) -> Result<Json<model::Tag>, RouteError> {
	let tag = database
		.get_tag(tag.id)
		.await?
		.ok_or(Error::UnknownTag(tag.id))?;

	Ok(Json(tag))
}

/// Find tags
/// Returns every tag with this exact label, oldest first. Labels are not
/// unique, so there can be several.
#[route(tag = tag::ADMIN)]
pub async fn find_tags(
	State(database): State<Database>,
	Path(input): Path<model::NameInput>,
) -> Result<Json<Vec<model::Tag>>, RouteError> {
	Ok(Json(database.find_tags(&input.name).await?))
}

/// Create tag
/// Creates a new tag. Labels do not need to be unique.
#[route(tag = tag::ADMIN)]
pub async fn create_tag(
	State(database): State<Database>,
	Json(input): Json<model::CreateTag>,
) -> Result<Json<model::Tag>, RouteError> {
	Ok(Json(database.create_tag(input).await?))
}

/// Update tag
/// Updates an existing tag by its unique id.
#[route(tag = tag::ADMIN)]
pub async fn update_tag(
	State(database): State<Database>,
	Path(tag): Path<model::IdInput>,
	Json(input): Json<model::UpdateTag>,
) -> Result<Json<model::Tag>, RouteError> {
	let tag = database
		.update_tag(tag.id, input)
		.await?
		.ok_or(Error::UnknownTag(tag.id))?;

	Ok(Json(tag))
}

/// Delete tag
/// Deletes an existing tag and detaches it from every post.
#[route(tag = tag::ADMIN)]
pub async fn delete_tag(
	State(database): State<Database>,
	Path(tag): Path<model::IdInput>,
) -> Result<(), RouteError> {
	if !database.delete_tag(tag.id).await? {
		return Err(Error::UnknownTag(tag.id).into());
	}

	Ok(())
}

/// List images
/// Returns a paginated list of images across every post, oldest first.
#[route(tag = tag::ADMIN)]
pub async fn list_images(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::Image>>, RouteError> {
	let images = database
		.list_images(paginate.limit(), paginate.offset())
		.await?;

	Ok(Json(images))
}

/// Create image
/// Attaches a new image to a post. Only the file reference is stored.
#[route(tag = tag::ADMIN)]
pub async fn create_image(
	State(database): State<Database>,
	Json(input): Json<model::CreateImage>,
) -> Result<Json<model::Image>, RouteError> {
	Ok(Json(database.create_image(input).await?))
}

/// Update image
/// Updates an existing image by its unique id. An image cannot move to another post.
#[route(tag = tag::ADMIN)]
pub async fn update_image(
	State(database): State<Database>,
	Path(image): Path<model::IdInput>,
	Json(input): Json<model::UpdateImage>,
) -> Result<Json<model::Image>, RouteError> {
	let image = database
		.update_image(image.id, input)
		.await?
		.ok_or(Error::UnknownImage(image.id))?;

	Ok(Json(image))
}

/// Delete image
/// Deletes an existing image. The post it belongs to is kept.
#[route(tag = tag::ADMIN)]
pub async fn delete_image(
	State(database): State<Database>,
	Path(image): Path<model::IdInput>,
) -> Result<(), RouteError> {
	if !database.delete_image(image.id).await? {
		return Err(Error::UnknownImage(image.id).into());
	}

	Ok(())
}
