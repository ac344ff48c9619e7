use axum::extract::State;
use macros::route;

use crate::{
	error::AppError,
	extract::{Json, Path, Query},
	model::{Post, PostDetail},
	openapi::tag,
	Database,
};

use super::{model, Error, RouteError};

/// List posts
/// Returns the most recent posts, newest first, at most 10 per page.
#[route(tag = tag::POST)]
pub async fn list_posts(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
	Query(filter): Query<model::PostFilterInput>,
) -> Result<Json<Vec<Post>>, RouteError> {
	let paginate = paginate
		.at_most(model::PAGE_SIZE)
		.map_err(AppError::from)?;
	let posts = database
		.list_posts(filter.into(), paginate.limit(), paginate.offset())
		.await?;

	Ok(Json(posts))
}

/// Get single post
/// Returns a single post by its unique id, along with its tags and images.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(database): State<Database>,
	Path(input): Path<model::IdInput>,
) -> Result<Json<PostDetail>, RouteError> {
	let post = database
		.get_post(input.id)
		.await?
		.ok_or(Error::UnknownPost(input.id))?;

	let (tags, images) =
		tokio::try_join!(database.post_tags(post.id), database.post_images(post.id))?;

	Ok(Json(PostDetail { post, tags, images }))
}
